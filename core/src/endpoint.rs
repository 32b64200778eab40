//! Endpoint resolution.
//!
//! # Design
//! The base URL is derived from an `Environment` snapshot on every call rather
//! than captured once, because hostname and deployment signals can differ
//! between calls in one process lifetime. `resolve` is pure; `Resolver` pairs
//! it with an `EnvironmentSource` that is re-read each time.

use std::fmt;

use url::{Position, Url};

use crate::error::ConfigError;
use crate::types::BugFilters;

/// Backend used by hosted deployments and unknown environments.
pub const PRODUCTION_BACKEND_URL: &str = "https://bug-tracker-backend-na6z.onrender.com";

/// Backend used on loopback hosts and outside a browser context.
pub const LOCAL_BACKEND_URL: &str = "http://localhost:5000";

/// The single path segment every resolved base URL ends with.
pub const API_SEGMENT: &str = "/api";

const HOSTING_PLATFORM_MARKERS: [&str; 2] = ["vercel.app", "vercel.com"];
const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "[::1]"];

pub const OVERRIDE_VAR: &str = "API_BASE_URL";
pub const HOSTNAME_VAR: &str = "APP_HOSTNAME";
pub const APP_ENV_VAR: &str = "APP_ENV";

/// A snapshot of the signals that decide which backend to talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub override_url: Option<String>,
    /// Host the caller is served from; `None` outside a browser context.
    pub hostname: Option<String>,
    pub production: bool,
}

impl Environment {
    pub fn with_override(url: impl Into<String>) -> Self {
        Self {
            override_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            ..Self::default()
        }
    }

    /// Read the snapshot from process environment variables.
    pub fn from_process() -> Self {
        Self {
            override_url: std::env::var(OVERRIDE_VAR).ok(),
            hostname: std::env::var(HOSTNAME_VAR).ok(),
            production: std::env::var(APP_ENV_VAR)
                .map(|v| is_production(&v))
                .unwrap_or(false),
        }
    }
}

/// True when an `APP_ENV`-style value names a production deployment.
pub fn is_production(app_env: &str) -> bool {
    app_env.trim().eq_ignore_ascii_case("production")
}

/// Supplies a fresh `Environment` snapshot for each resolution.
pub trait EnvironmentSource {
    fn snapshot(&self) -> Environment;
}

impl EnvironmentSource for Environment {
    fn snapshot(&self) -> Environment {
        self.clone()
    }
}

/// Reads process environment variables on every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn snapshot(&self) -> Environment {
        Environment::from_process()
    }
}

/// How strictly a missing override is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveMode {
    /// Fall back through hosting-platform and loopback detection.
    Lenient,
    /// Fail with `ConfigError::MissingOverride` instead of guessing.
    Strict,
    /// Strict in production, lenient elsewhere.
    #[default]
    Auto,
}

impl ResolveMode {
    fn is_strict(self, env: &Environment) -> bool {
        match self {
            ResolveMode::Lenient => false,
            ResolveMode::Strict => true,
            ResolveMode::Auto => env.production,
        }
    }
}

/// Which signal produced an `EndpointConfig`. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    Override,
    HostingPlatform,
    LocalDevelopment,
    Fallback,
}

impl fmt::Display for EndpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndpointSource::Override => "explicit override",
            EndpointSource::HostingPlatform => "hosting platform",
            EndpointSource::LocalDevelopment => "local development",
            EndpointSource::Fallback => "production fallback",
        })
    }
}

/// A resolved backend endpoint. `base_url` always ends in exactly one `/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    base_url: String,
    source: EndpointSource,
}

impl EndpointConfig {
    /// Validate and normalize `raw` into an endpoint.
    pub fn new(raw: &str, source: EndpointSource) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };

        let trimmed = raw.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", parsed.scheme())));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        Ok(Self {
            base_url: normalize_api_url(&parsed),
            source,
        })
    }

    /// The API root, e.g. `https://api.example.com/api`.
    pub fn api_url(&self) -> &str {
        &self.base_url
    }

    pub fn source(&self) -> EndpointSource {
        self.source
    }

    /// The base URL with its trailing `/api` segment removed.
    pub fn origin(&self) -> &str {
        self.base_url
            .strip_suffix(API_SEGMENT)
            .unwrap_or(&self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}{API_SEGMENT}/health", self.origin())
    }

    /// Collection URL with the recognized filters as query parameters.
    pub fn bugs_url(&self, filters: &BugFilters) -> String {
        let url = format!("{}/bugs", self.base_url);
        let pairs = filters.query_pairs();
        if pairs.is_empty() {
            return url;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{url}?{query}")
    }

    /// Item URL; the id is percent-encoded as a single path segment.
    pub fn bug_url(&self, id: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!("{}/bugs/{encoded}", self.base_url)
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base_url, self.source)
    }
}

/// Collapse any run of trailing `/api` segments in the path into exactly one.
fn normalize_api_url(url: &Url) -> String {
    let mut path = url.path().trim_end_matches('/');
    while let Some(rest) = path.strip_suffix(API_SEGMENT) {
        path = rest.trim_end_matches('/');
    }
    format!("{}{path}{API_SEGMENT}", &url[..Position::BeforePath])
}

fn is_hosting_platform(hostname: &str) -> bool {
    HOSTING_PLATFORM_MARKERS
        .iter()
        .any(|marker| hostname.contains(marker))
}

fn is_loopback_or_empty(hostname: &str) -> bool {
    hostname.is_empty() || LOOPBACK_HOSTS.contains(&hostname)
}

/// Pick the backend endpoint for `env`. First match wins: explicit override,
/// hosting platform, loopback or non-browser context, production fallback.
pub fn resolve(env: &Environment, mode: ResolveMode) -> Result<EndpointConfig, ConfigError> {
    if let Some(raw) = env.override_url.as_deref().filter(|v| !v.trim().is_empty()) {
        let endpoint = EndpointConfig::new(raw, EndpointSource::Override)?;
        log::debug!("using API base URL from override: {}", endpoint.api_url());
        return Ok(endpoint);
    }

    if mode.is_strict(env) {
        return Err(ConfigError::MissingOverride);
    }

    let hostname = env.hostname.as_deref().map(str::trim).unwrap_or("");
    let (raw, source) = if is_hosting_platform(hostname) {
        (PRODUCTION_BACKEND_URL, EndpointSource::HostingPlatform)
    } else if is_loopback_or_empty(hostname) {
        (LOCAL_BACKEND_URL, EndpointSource::LocalDevelopment)
    } else {
        log::warn!("{OVERRIDE_VAR} not set on host {hostname:?}; defaulting to production backend");
        (PRODUCTION_BACKEND_URL, EndpointSource::Fallback)
    };

    let endpoint = EndpointConfig::new(raw, source)?;
    log::debug!("resolved API base URL {endpoint}");
    Ok(endpoint)
}

/// Re-resolves the endpoint from a fresh snapshot on every call.
#[derive(Debug, Clone, Default)]
pub struct Resolver<S = ProcessEnvironment> {
    source: S,
    mode: ResolveMode,
}

impl<S: EnvironmentSource> Resolver<S> {
    pub fn new(source: S, mode: ResolveMode) -> Self {
        Self { source, mode }
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn resolve(&self) -> Result<EndpointConfig, ConfigError> {
        resolve(&self.source.snapshot(), self.mode)
    }
}
