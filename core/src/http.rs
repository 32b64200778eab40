//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. `BugClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! `Transport` performs the round-trip in between. Each request carries its
//! own timeout so cancellation is scoped to the single call that owns it.

use std::time::Duration;

/// Header every request carries, including bodiless GET and DELETE.
pub const JSON_CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// True for methods that change server-side state.
    pub fn is_mutation(self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Upper bound for the whole round-trip. The transport aborts the
    /// connection once it elapses.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// A request with the JSON content-type header and no body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: vec![(
                JSON_CONTENT_TYPE.0.to_string(),
                JSON_CONTENT_TYPE.1.to_string(),
            )],
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status line used when the body carries no readable error, e.g.
    /// `"404 Not Found"`.
    pub fn status_line(&self) -> String {
        match ureq::http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
        {
            Some(reason) => format!("{} {reason}", self.status),
            None => self.status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_carries_json_content_type() {
        let req = HttpRequest::get("http://localhost:5000/api/bugs");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert!(req.body.is_none());
        assert!(req.timeout.is_none());
    }

    #[test]
    fn status_line_uses_canonical_reason() {
        assert_eq!(HttpResponse::new(404, "").status_line(), "404 Not Found");
        assert_eq!(HttpResponse::new(599, "").status_line(), "599");
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
    }
}
