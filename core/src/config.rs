//! Client configuration.

use std::time::Duration;

use crate::endpoint::ResolveMode;
use crate::health::DEFAULT_HEALTH_TIMEOUT;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeouts and resolution policy shared by every call a `BugService` makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bound on each CRUD round-trip.
    pub request_timeout: Duration,
    /// Bound on each health probe, including the one run after a failure.
    pub health_timeout: Duration,
    pub mode: ResolveMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            mode: ResolveMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }
}
