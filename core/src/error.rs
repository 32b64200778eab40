//! Error types for the bug tracker client.
//!
//! # Design
//! `ClassifiedError` is the structured failure a request produces once it has
//! left the process: the server rejected it, the server could not be reached,
//! the bounded wait ran out, or something unanticipated happened. Every
//! variant names the resolved base URL because a misconfigured URL is the most
//! common failure in practice. `ConfigError` is raised before any request is
//! attempted. `ApiError` is what `BugService` callers see.

use thiserror::Error;

/// Endpoint resolution could not proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "API_BASE_URL is not set and strict endpoint resolution is enabled. \
         For development: API_BASE_URL=http://localhost:5000. \
         For production: API_BASE_URL=<your backend URL>"
    )]
    MissingOverride,

    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// A raw failure from the transport, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The per-request timeout fired and the connection was aborted.
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// DNS failure, refused or reset connection, or another socket error.
    #[error("connection failed: {message}")]
    Connect { message: String },

    #[error("{message}")]
    Other { message: String },
}

/// A request failure, classified for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifiedError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {base_url}: {message}")]
    Http {
        status: u16,
        message: String,
        base_url: String,
    },

    /// The transport failed. `backend_reachable` records whether the follow-up
    /// health probe got through anyway.
    #[error("{diagnostic}")]
    NetworkUnreachable {
        base_url: String,
        diagnostic: String,
        backend_reachable: bool,
    },

    #[error("request to {base_url} timed out after {elapsed_ms}ms; try again")]
    Timeout { base_url: String, elapsed_ms: u64 },

    #[error("request to {base_url} failed: {source}")]
    Unknown {
        base_url: String,
        #[source]
        source: TransportError,
    },
}

impl ClassifiedError {
    pub fn base_url(&self) -> &str {
        match self {
            ClassifiedError::Http { base_url, .. }
            | ClassifiedError::NetworkUnreachable { base_url, .. }
            | ClassifiedError::Timeout { base_url, .. }
            | ClassifiedError::Unknown { base_url, .. } => base_url,
        }
    }
}

/// Errors returned by `BugClient` parse methods and `BugService` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] ClassifiedError),

    /// An item operation was given an empty or whitespace-only id.
    #[error("bug id must not be blank")]
    BlankId,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body did not match the expected shape.
    #[error("unexpected response from {base_url}: {message}")]
    Deserialization { base_url: String, message: String },
}

impl ApiError {
    /// HTTP status when the server rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request(ClassifiedError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            ApiError::Request(err) => Some(err),
            _ => None,
        }
    }
}
