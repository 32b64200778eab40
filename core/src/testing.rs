//! In-memory transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Replays scripted results in order and records every request it sees.
pub(crate) struct ScriptedTransport {
    script: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<HttpResponse, TransportError>>,
    {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// A transport that fails the test if anything is sent through it.
    pub(crate) fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.borrow_mut().push(request.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request: {} {}", request.method.as_str(), request.url))
    }
}
