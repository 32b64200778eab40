//! Backend liveness probe.
//!
//! `probe` issues one bounded GET to `<origin>/api/health` and folds every
//! outcome into a `HealthReport`. It never returns an error: callers use it to
//! explain other failures, so it must not become one.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::EndpointConfig;
use crate::error::TransportError;
use crate::http::HttpRequest;
use crate::transport::Transport;

pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_millis(5000);

/// Outcome of a single health probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl HealthReport {
    fn unreachable(status_code: Option<u16>, elapsed_ms: u64, reason: String) -> Self {
        Self {
            reachable: false,
            status_code,
            payload: None,
            elapsed_ms,
            failure_reason: Some(reason),
        }
    }

    pub fn timed_out(&self) -> bool {
        self.failure_reason.as_deref() == Some("timeout")
    }

    /// Typed view of the payload. Absent fields stay `None`.
    pub fn details(&self) -> Option<HealthPayload> {
        self.payload
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
    }
}

/// Body returned by the backend's health route.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealthPayload {
    pub success: Option<bool>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    pub environment: Option<String>,
    /// Seconds since the backend started.
    pub uptime: Option<f64>,
    pub memory: Option<MemoryUsage>,
}

/// Memory figures in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
}

/// Probe `endpoint`'s health route, giving up after `timeout`.
pub fn probe<T: Transport + ?Sized>(
    transport: &T,
    endpoint: &EndpointConfig,
    timeout: Duration,
) -> HealthReport {
    let url = endpoint.health_url();
    let request = HttpRequest::get(url.as_str()).with_timeout(timeout);
    let started = Instant::now();
    let result = transport.execute(&request);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let report = match result {
        Ok(response) if response.is_success() => {
            match serde_json::from_str::<Value>(&response.body) {
                Ok(payload) => HealthReport {
                    reachable: true,
                    status_code: Some(response.status),
                    payload: Some(payload),
                    elapsed_ms,
                    failure_reason: None,
                },
                Err(_) => HealthReport::unreachable(
                    Some(response.status),
                    elapsed_ms,
                    "invalid JSON in health response".to_string(),
                ),
            }
        }
        Ok(response) => HealthReport::unreachable(
            Some(response.status),
            elapsed_ms,
            format!("backend returned status {}", response.status),
        ),
        Err(TransportError::Timeout { .. }) => {
            HealthReport::unreachable(None, elapsed_ms, "timeout".to_string())
        }
        Err(err) => HealthReport::unreachable(None, elapsed_ms, err.to_string()),
    };

    if report.reachable {
        log::debug!("health check {url} ok in {}ms", report.elapsed_ms);
    } else {
        log::warn!(
            "health check {url} failed: {}",
            report.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
    report
}
