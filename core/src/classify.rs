//! Failure classification.
//!
//! # Design
//! When the transport fails outright, the raw error rarely tells a user what
//! to do. `classify` turns it into a `ClassifiedError`: timeouts are reported
//! as such, connection failures trigger exactly one health probe to tell
//! "the backend is down" from "this request could not get through", and
//! anything else is passed on unchanged as `Unknown`. Non-2xx responses never
//! reach this module; `BugClient` already maps them to `ClassifiedError::Http`.

use std::time::Duration;

use crate::endpoint::EndpointConfig;
use crate::error::{ClassifiedError, TransportError};
use crate::health;
use crate::transport::Transport;

/// Classify a transport failure for a request sent to `endpoint`. May issue
/// one health probe, bounded by `health_timeout`.
pub fn classify<T: Transport + ?Sized>(
    error: TransportError,
    endpoint: &EndpointConfig,
    transport: &T,
    health_timeout: Duration,
) -> ClassifiedError {
    let base_url = endpoint.api_url().to_string();
    match error {
        TransportError::Timeout { elapsed_ms } => {
            log::warn!("request to {base_url} timed out after {elapsed_ms}ms");
            ClassifiedError::Timeout {
                base_url,
                elapsed_ms,
            }
        }
        TransportError::Connect { message } => {
            log::warn!("could not connect to {base_url}: {message}; probing backend health");
            let report = health::probe(transport, endpoint, health_timeout);
            if report.reachable {
                ClassifiedError::NetworkUnreachable {
                    diagnostic: degraded_message(endpoint),
                    base_url,
                    backend_reachable: true,
                }
            } else {
                ClassifiedError::NetworkUnreachable {
                    diagnostic: connection_diagnostic(endpoint),
                    base_url,
                    backend_reachable: false,
                }
            }
        }
        source @ TransportError::Other { .. } => ClassifiedError::Unknown { base_url, source },
    }
}

/// Checklist shown when the backend itself cannot be reached.
pub fn connection_diagnostic(endpoint: &EndpointConfig) -> String {
    format!(
        "Unable to connect to the backend server at {origin}. Please ensure:\n\
         1. The backend server is running\n\
         2. The database is running and accessible\n\
         3. No firewall is blocking the connection\n\
         4. The backend logs show no startup errors\n\
         5. The configured API URL is correct: {api}",
        origin = endpoint.origin(),
        api = endpoint.api_url(),
    )
}

/// Shown when the health probe got through but the request did not.
pub fn degraded_message(endpoint: &EndpointConfig) -> String {
    format!(
        "Network error: unable to reach the server at {}. The backend answered a \
         health check, so please check your connection and try again.",
        endpoint.api_url()
    )
}
