//! Request execution.
//!
//! # Design
//! `BugService` composes the pieces for one call: resolve the endpoint from a
//! fresh environment snapshot, build the request with `BugClient`, hand it to
//! the `Transport`, then either parse the response or classify the transport
//! failure. It keeps no state between calls and never retries; a failed
//! `create` in particular is left to the caller, since repeating it could
//! create the record twice.

use crate::classify::classify;
use crate::client::BugClient;
use crate::config::ClientConfig;
use crate::diagnostics::{ConnectionTestReport, ConnectionTester};
use crate::endpoint::{EndpointConfig, EnvironmentSource, ProcessEnvironment, Resolver};
use crate::error::ApiError;
use crate::health::{self, HealthReport};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Bug, BugFilters, CreateBug, UpdateBug};

/// Executes bug CRUD operations against the currently resolved backend.
#[derive(Debug, Clone)]
pub struct BugService<T = UreqTransport, S = ProcessEnvironment> {
    transport: T,
    resolver: Resolver<S>,
    config: ClientConfig,
}

impl BugService {
    /// Service over ureq, resolving from process environment variables.
    pub fn from_env(config: ClientConfig) -> Self {
        Self::new(UreqTransport::new(), ProcessEnvironment, config)
    }
}

impl<T: Transport, S: EnvironmentSource> BugService<T, S> {
    pub fn new(transport: T, source: S, config: ClientConfig) -> Self {
        Self {
            transport,
            resolver: Resolver::new(source, config.mode),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the endpoint the next call would use.
    pub fn endpoint(&self) -> Result<EndpointConfig, ApiError> {
        Ok(self.resolver.resolve()?)
    }

    pub fn list(&self, filters: &BugFilters) -> Result<Vec<Bug>, ApiError> {
        let client = self.client()?;
        let response = self.send(&client, &client.build_list_bugs(filters))?;
        client.parse_list_bugs(response)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Bug, ApiError> {
        let client = self.client()?;
        let response = self.send(&client, &client.build_get_bug(id)?)?;
        client.parse_get_bug(response)
    }

    pub fn create(&self, input: &CreateBug) -> Result<Bug, ApiError> {
        let client = self.client()?;
        let response = self.send(&client, &client.build_create_bug(input)?)?;
        client.parse_create_bug(response)
    }

    pub fn update(&self, id: &str, patch: &UpdateBug) -> Result<Bug, ApiError> {
        let client = self.client()?;
        let response = self.send(&client, &client.build_update_bug(id, patch)?)?;
        client.parse_update_bug(response)
    }

    /// Delete a bug. `Ok(true)` on any 2xx.
    pub fn remove(&self, id: &str) -> Result<bool, ApiError> {
        let client = self.client()?;
        let response = self.send(&client, &client.build_delete_bug(id)?)?;
        client.parse_delete_bug(response)
    }

    /// Probe the resolved backend's health route with the configured timeout.
    pub fn probe_health(&self) -> Result<HealthReport, ApiError> {
        let endpoint = self.endpoint()?;
        Ok(health::probe(
            &self.transport,
            &endpoint,
            self.config.health_timeout,
        ))
    }

    /// Run the read-only connection checks against the resolved backend.
    pub fn run_connection_tests(&self) -> Result<ConnectionTestReport, ApiError> {
        let endpoint = self.endpoint()?;
        Ok(ConnectionTester::new(&self.transport, &endpoint, &self.config).run_all())
    }

    fn client(&self) -> Result<BugClient, ApiError> {
        Ok(BugClient::new(self.endpoint()?).with_timeout(self.config.request_timeout))
    }

    fn send(&self, client: &BugClient, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request).map_err(|err| {
            classify(
                err,
                client.endpoint(),
                &self.transport,
                self.config.health_timeout,
            )
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::endpoint::{Environment, ResolveMode};
    use crate::error::{ClassifiedError, ConfigError, TransportError};
    use crate::http::HttpMethod;
    use crate::testing::ScriptedTransport;
    use crate::types::BugStatus;

    const BUG_JSON: &str =
        r#"{"id":"1","title":"x","description":"","status":"open","priority":"low"}"#;

    fn service(
        transport: ScriptedTransport,
        env: Environment,
    ) -> BugService<ScriptedTransport, Environment> {
        BugService::new(transport, env, ClientConfig::default())
    }

    fn example_env() -> Environment {
        Environment::with_override("https://api.example.com")
    }

    #[test]
    fn list_with_status_filter_unwraps_envelope() {
        let body = format!(r#"{{"data":[{BUG_JSON}],"count":1}}"#);
        let svc = service(
            ScriptedTransport::new([Ok(HttpResponse::new(200, body))]),
            example_env(),
        );
        let bugs = svc
            .list(&BugFilters::new().with_status(BugStatus::Open))
            .unwrap();
        assert_eq!(bugs.len(), 1);
        assert_eq!(bugs[0].id, "1");

        let sent = svc.transport().requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "https://api.example.com/api/bugs?status=open");
        assert_eq!(sent[0].timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn http_errors_are_not_probed_or_retried() {
        let svc = service(
            ScriptedTransport::new([Ok(HttpResponse::new(
                400,
                r#"{"success":false,"error":"Title is required"}"#,
            ))]),
            example_env(),
        );
        let err = svc.create(&CreateBug::new("", "")).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Title is required"));
        assert_eq!(svc.transport().requests().len(), 1);
    }

    #[test]
    fn failed_create_is_not_retried() {
        let refused = TransportError::Connect {
            message: "refused".into(),
        };
        let svc = service(
            ScriptedTransport::new([Err(refused.clone()), Err(refused)]),
            example_env(),
        );
        let err = svc.create(&CreateBug::new("t", "d")).unwrap_err();
        assert!(matches!(
            err.classified(),
            Some(ClassifiedError::NetworkUnreachable { .. })
        ));

        let methods: Vec<_> = svc
            .transport()
            .requests()
            .iter()
            .map(|r| r.method)
            .collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Get]);
    }

    #[test]
    fn timeout_is_classified_as_timeout() {
        let svc = service(
            ScriptedTransport::new([Err(TransportError::Timeout { elapsed_ms: 10_000 })]),
            example_env(),
        );
        let err = svc.get_by_id("1").unwrap_err();
        assert!(matches!(
            err.classified(),
            Some(ClassifiedError::Timeout { .. })
        ));
    }

    #[test]
    fn remove_returns_true_without_body() {
        let svc = service(
            ScriptedTransport::new([Ok(HttpResponse::new(204, ""))]),
            example_env(),
        );
        assert!(svc.remove("1").unwrap());
        assert_eq!(svc.transport().requests()[0].method, HttpMethod::Delete);
    }

    #[test]
    fn update_sends_patch_and_unwraps() {
        let body = format!(r#"{{"success":true,"data":{BUG_JSON}}}"#);
        let svc = service(
            ScriptedTransport::new([Ok(HttpResponse::new(200, body))]),
            example_env(),
        );
        let patch = UpdateBug {
            title: Some("x".into()),
            ..UpdateBug::default()
        };
        let bug = svc.update("1", &patch).unwrap();
        assert_eq!(bug.title, "x");
        let sent = svc.transport().requests();
        assert_eq!(sent[0].url, "https://api.example.com/api/bugs/1");
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"title":"x"}"#));
    }

    #[test]
    fn blank_ids_are_rejected_before_any_request() {
        let svc = service(ScriptedTransport::empty(), example_env());
        assert!(matches!(svc.get_by_id(""), Err(ApiError::BlankId)));
        assert!(matches!(
            svc.update("  ", &UpdateBug::default()),
            Err(ApiError::BlankId)
        ));
        assert!(matches!(svc.remove("\t"), Err(ApiError::BlankId)));
        assert!(svc.transport().requests().is_empty());
    }

    #[test]
    fn strict_mode_fails_before_any_request() {
        let svc = BugService::new(
            ScriptedTransport::empty(),
            Environment::default(),
            ClientConfig::default().with_mode(ResolveMode::Strict),
        );
        let err = svc.list(&BugFilters::default()).unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::MissingOverride)));
        assert!(svc.transport().requests().is_empty());
    }
}
