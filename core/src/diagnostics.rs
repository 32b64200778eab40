//! Deployment connection checks.
//!
//! `ConnectionTester::run_all` probes the health route and, only when that
//! succeeds, reads the bug list. It issues GET requests only, so it is safe to
//! point at a production backend.

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoint::EndpointConfig;
use crate::health;
use crate::http::HttpRequest;
use crate::transport::Transport;
use crate::types::BugFilters;

pub const HEALTH_CHECK: &str = "Health Check";
pub const BUGS_ENDPOINT_CHECK: &str = "Bugs Endpoint";

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    /// Route checked, relative to the origin.
    pub endpoint: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Aggregate of one `run_all` pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestReport {
    pub overall: bool,
    pub endpoint_used: String,
    pub checks: Vec<CheckResult>,
}

impl ConnectionTestReport {
    fn new(endpoint_used: String, checks: Vec<CheckResult>) -> Self {
        Self {
            overall: !checks.is_empty() && checks.iter().all(|c| c.success),
            endpoint_used,
            checks,
        }
    }
}

/// Runs read-only checks against one resolved endpoint.
pub struct ConnectionTester<'a, T: ?Sized> {
    transport: &'a T,
    endpoint: &'a EndpointConfig,
    config: &'a ClientConfig,
}

impl<'a, T: Transport + ?Sized> ConnectionTester<'a, T> {
    pub fn new(transport: &'a T, endpoint: &'a EndpointConfig, config: &'a ClientConfig) -> Self {
        Self {
            transport,
            endpoint,
            config,
        }
    }

    pub fn run_all(&self) -> ConnectionTestReport {
        let mut checks = vec![self.check_health()];
        if checks[0].success {
            checks.push(self.check_bugs_endpoint());
        }
        let report = ConnectionTestReport::new(self.endpoint.api_url().to_string(), checks);
        log::debug!(
            "connection tests against {}: {}",
            report.endpoint_used,
            if report.overall { "passed" } else { "failed" }
        );
        report
    }

    fn check_health(&self) -> CheckResult {
        let timeout = self.config.health_timeout;
        let report = health::probe(self.transport, self.endpoint, timeout);
        let message = if report.reachable {
            "Backend is healthy and reachable".to_string()
        } else if report.timed_out() {
            format!("Backend health check timed out after {}ms", timeout.as_millis())
        } else if let Some(status) = report.status_code {
            format!("Backend returned status {status}")
        } else {
            format!(
                "Failed to connect to backend: {}",
                report.failure_reason.as_deref().unwrap_or("unknown error")
            )
        };
        CheckResult {
            name: HEALTH_CHECK.to_string(),
            endpoint: "/api/health".to_string(),
            success: report.reachable,
            message,
            data: report.payload,
        }
    }

    fn check_bugs_endpoint(&self) -> CheckResult {
        let request = HttpRequest::get(self.endpoint.bugs_url(&BugFilters::default()))
            .with_timeout(self.config.request_timeout);
        let (success, message, data) = match self.transport.execute(&request) {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<Value>(&response.body) {
                    Ok(body) => (true, "Endpoint is accessible".to_string(), Some(body)),
                    Err(e) => (false, format!("Endpoint returned invalid JSON: {e}"), None),
                }
            }
            Ok(response) => (
                false,
                format!("Endpoint returned status {}", response.status),
                None,
            ),
            Err(e) => (false, format!("Failed to reach endpoint: {e}"), None),
        };
        CheckResult {
            name: BUGS_ENDPOINT_CHECK.to_string(),
            endpoint: "/api/bugs".to_string(),
            success,
            message,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointSource;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use crate::testing::ScriptedTransport;

    fn endpoint() -> EndpointConfig {
        EndpointConfig::new("http://localhost:5000", EndpointSource::LocalDevelopment).unwrap()
    }

    fn run(transport: &ScriptedTransport) -> ConnectionTestReport {
        let endpoint = endpoint();
        let config = ClientConfig::default();
        ConnectionTester::new(transport, &endpoint, &config).run_all()
    }

    #[test]
    fn healthy_backend_runs_both_checks() {
        let transport = ScriptedTransport::new([
            Ok(HttpResponse::new(200, r#"{"success":true,"status":"ok"}"#)),
            Ok(HttpResponse::new(200, r#"{"success":true,"count":0,"data":[]}"#)),
        ]);
        let report = run(&transport);
        assert!(report.overall);
        assert_eq!(report.endpoint_used, "http://localhost:5000/api");
        let names: Vec<_> = report.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![HEALTH_CHECK, BUGS_ENDPOINT_CHECK]);
        assert_eq!(report.checks[1].endpoint, "/api/bugs");
        assert!(report.checks[0].data.is_some());
    }

    #[test]
    fn unhealthy_backend_skips_bugs_check() {
        let transport = ScriptedTransport::new([Err(TransportError::Connect {
            message: "refused".into(),
        })]);
        let report = run(&transport);
        assert!(!report.overall);
        assert_eq!(report.checks.len(), 1);
        assert!(report.checks[0].message.starts_with("Failed to connect"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn health_timeout_message_names_the_bound() {
        let transport =
            ScriptedTransport::new([Err(TransportError::Timeout { elapsed_ms: 5000 })]);
        let report = run(&transport);
        assert_eq!(
            report.checks[0].message,
            "Backend health check timed out after 5000ms"
        );
    }

    #[test]
    fn failing_bugs_endpoint_fails_overall() {
        let transport = ScriptedTransport::new([
            Ok(HttpResponse::new(200, r#"{"status":"ok"}"#)),
            Ok(HttpResponse::new(500, "boom")),
        ]);
        let report = run(&transport);
        assert!(!report.overall);
        assert!(report.checks[0].success);
        assert_eq!(report.checks[1].message, "Endpoint returned status 500");
    }

    #[test]
    fn never_issues_mutations() {
        let scripts: Vec<Vec<Result<HttpResponse, TransportError>>> = vec![
            vec![
                Ok(HttpResponse::new(200, "{}")),
                Ok(HttpResponse::new(200, "[]")),
            ],
            vec![Ok(HttpResponse::new(503, ""))],
            vec![Err(TransportError::Timeout { elapsed_ms: 1 })],
            vec![
                Ok(HttpResponse::new(200, "{}")),
                Err(TransportError::Other {
                    message: "reset".into(),
                }),
            ],
        ];
        for script in scripts {
            let transport = ScriptedTransport::new(script);
            run(&transport);
            assert!(transport
                .requests()
                .iter()
                .all(|r| !r.method.is_mutation()));
        }
    }

    #[test]
    fn report_serializes_camel_case() {
        let transport = ScriptedTransport::new([Ok(HttpResponse::new(404, ""))]);
        let json = serde_json::to_value(run(&transport)).unwrap();
        assert_eq!(json["overall"], false);
        assert_eq!(json["endpointUsed"], "http://localhost:5000/api");
        assert!(json["checks"][0].get("data").is_none());
    }
}
