//! Resilient client core for the bug tracker service.
//!
//! # Overview
//! Resolves which backend to talk to, executes bug CRUD requests against it,
//! and turns failures into errors a user can act on: the server rejected the
//! request, the server is down, or the wait timed out.
//!
//! # Design
//! - `resolve` picks the endpoint from an `Environment` snapshot taken per
//!   call; nothing caches a base URL.
//! - `BugClient` is stateless and split into `build_*` / `parse_*`, so the I/O
//!   boundary is explicit; a `Transport` performs the round-trip.
//! - Successful bodies go through one envelope-normalizing step, so bare and
//!   `{data: ...}` responses look the same to callers.
//! - Transport failures are classified, with a single health probe to explain
//!   connection errors. Nothing is retried.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod classify;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod health;
pub mod http;
pub mod service;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::classify;
pub use client::BugClient;
pub use config::ClientConfig;
pub use diagnostics::{CheckResult, ConnectionTestReport, ConnectionTester};
pub use endpoint::{
    resolve, EndpointConfig, EndpointSource, Environment, EnvironmentSource, ProcessEnvironment,
    ResolveMode, Resolver,
};
pub use error::{ApiError, ClassifiedError, ConfigError, TransportError};
pub use health::{probe, HealthPayload, HealthReport};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::BugService;
pub use transport::{Transport, UreqTransport};
pub use types::{Bug, BugFilters, BugStatus, CreateBug, Priority, UpdateBug};
