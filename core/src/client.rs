//! Stateless HTTP request builder and response parser for the bug API.
//!
//! # Design
//! `BugClient` holds only a resolved `EndpointConfig` and carries no mutable
//! state between calls. Each CRUD operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `BugService` resolves a fresh endpoint per call, creates a
//! `BugClient` for it, and drives the transport in between.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::endpoint::EndpointConfig;
use crate::envelope;
use crate::error::{ApiError, ClassifiedError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Bug, BugFilters, CreateBug, UpdateBug};

/// Synchronous, stateless client for the bug API.
#[derive(Debug, Clone)]
pub struct BugClient {
    endpoint: EndpointConfig,
    timeout: Option<Duration>,
}

impl BugClient {
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self {
            endpoint,
            timeout: None,
        }
    }

    /// Attach `timeout` to every request this client builds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn build_list_bugs(&self, filters: &BugFilters) -> HttpRequest {
        self.request(HttpMethod::Get, self.endpoint.bugs_url(filters))
    }

    pub fn build_get_bug(&self, id: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Get, self.bug_url(id)?))
    }

    pub fn build_create_bug(&self, input: &CreateBug) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self
            .request(HttpMethod::Post, self.endpoint.bugs_url(&BugFilters::default()))
            .with_body(body))
    }

    pub fn build_update_bug(&self, id: &str, input: &UpdateBug) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self
            .request(HttpMethod::Put, self.bug_url(id)?)
            .with_body(body))
    }

    pub fn build_delete_bug(&self, id: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Delete, self.bug_url(id)?))
    }

    pub fn parse_list_bugs(&self, response: HttpResponse) -> Result<Vec<Bug>, ApiError> {
        self.check_status(&response)?;
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(body) = serde_json::from_str::<serde_json::Value>(&response.body) {
                log::debug!(
                    "fetched {} bugs from {}",
                    envelope::item_count(&body).unwrap_or(0),
                    self.endpoint.api_url()
                );
            }
        }
        self.decode(&response)
    }

    pub fn parse_get_bug(&self, response: HttpResponse) -> Result<Bug, ApiError> {
        self.check_status(&response)?;
        self.decode(&response)
    }

    pub fn parse_create_bug(&self, response: HttpResponse) -> Result<Bug, ApiError> {
        self.check_status(&response)?;
        self.decode(&response)
    }

    pub fn parse_update_bug(&self, response: HttpResponse) -> Result<Bug, ApiError> {
        self.check_status(&response)?;
        self.decode(&response)
    }

    /// Any 2xx counts as deleted, whatever the body holds.
    pub fn parse_delete_bug(&self, response: HttpResponse) -> Result<bool, ApiError> {
        self.check_status(&response)?;
        Ok(true)
    }

    /// A blank id would address the collection route instead of an item.
    fn bug_url(&self, id: &str) -> Result<String, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::BlankId);
        }
        Ok(self.endpoint.bug_url(id))
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        let request = HttpRequest::new(method, url);
        match self.timeout {
            Some(timeout) => request.with_timeout(timeout),
            None => request,
        }
    }

    /// Map non-2xx responses to `ClassifiedError::Http`, reading the message
    /// from a JSON `error` body or falling back to the status line.
    fn check_status(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if response.is_success() {
            return Ok(());
        }
        let message =
            envelope::error_message(&response.body).unwrap_or_else(|| response.status_line());
        log::warn!(
            "{} responded {}: {message}",
            self.endpoint.api_url(),
            response.status
        );
        Err(ClassifiedError::Http {
            status: response.status,
            message,
            base_url: self.endpoint.api_url().to_string(),
        }
        .into())
    }

    fn decode<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, ApiError> {
        envelope::decode(&response.body).map_err(|e| ApiError::Deserialization {
            base_url: self.endpoint.api_url().to_string(),
            message: e.to_string(),
        })
    }
}

fn to_json<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}
