//! The seam that performs one HTTP round-trip.
//!
//! # Design
//! `BugClient` never touches the network; a `Transport` executes the
//! `HttpRequest` it builds and hands back an `HttpResponse`. Non-2xx statuses
//! are data, not errors: only failures where no response arrived surface as
//! `TransportError`. `UreqTransport` enforces each request's timeout inside
//! ureq, which closes the socket when it fires, so an abandoned request never
//! leaves a connection behind.

use std::io;
use std::time::{Duration, Instant};

use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a single request.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a ureq agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    /// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
    /// responses come back as data and `BugClient` interprets them.
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    fn send(&self, request: &HttpRequest) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let url = request.url.as_str();
        let timeout = request.timeout;

        macro_rules! prepare {
            ($builder:expr) => {{
                let mut builder = $builder.config().timeout_global(timeout).build();
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder
            }};
        }

        match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => prepare!(self.agent.get(url)).call(),
            (HttpMethod::Delete, _) => prepare!(self.agent.delete(url)).call(),
            (HttpMethod::Post, Some(body)) => prepare!(self.agent.post(url)).send(body.as_bytes()),
            (HttpMethod::Post, None) => prepare!(self.agent.post(url)).send_empty(),
            (HttpMethod::Put, Some(body)) => prepare!(self.agent.put(url)).send(body.as_bytes()),
            (HttpMethod::Put, None) => prepare!(self.agent.put(url)).send_empty(),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        log::debug!("{} {}", request.method.as_str(), request.url);
        let started = Instant::now();

        let mut response = self
            .send(request)
            .map_err(|e| map_ureq_error(e, started.elapsed()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| map_ureq_error(e, started.elapsed()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sort a ureq failure into the three transport outcomes the classifier
/// distinguishes.
fn map_ureq_error(err: ureq::Error, elapsed: Duration) -> TransportError {
    let elapsed_ms = elapsed.as_millis() as u64;
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout { elapsed_ms },
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => {
            TransportError::Timeout { elapsed_ms }
        }
        ureq::Error::Io(e) => TransportError::Connect {
            message: e.to_string(),
        },
        e @ (ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed
        | ureq::Error::ConnectProxyFailed(_)) => TransportError::Connect {
            message: e.to_string(),
        },
        other => TransportError::Other {
            message: other.to_string(),
        },
    }
}
