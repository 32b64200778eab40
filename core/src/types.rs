//! Domain DTOs for the bug tracker API.
//!
//! # Design
//! These types mirror the backend's schema but are defined independently of
//! the mock-server crate; integration tests catch schema drift. The backend
//! owns `id` and the timestamps, so input payloads never carry them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
}

impl BugStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BugStatus::Open => "open",
            BugStatus::InProgress => "in-progress",
            BugStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BugStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(BugStatus::Open),
            "in-progress" => Ok(BugStatus::InProgress),
            "resolved" => Ok(BugStatus::Resolved),
            other => Err(format!(
                "unknown status {other:?}; expected open, in-progress or resolved"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!(
                "unknown priority {other:?}; expected low, medium or high"
            )),
        }
    }
}

/// A single bug record returned by the API.
///
/// `_id` is accepted as an alias for `id` since document-store backends
/// expose their primary key under that name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: BugStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request payload for creating a new bug. The server fills in defaults for
/// omitted `status` and `priority`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBug {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BugStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
}

impl CreateBug {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
            priority: None,
            reporter: None,
        }
    }
}

/// Request payload for updating an existing bug. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateBug {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BugStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
}

impl UpdateBug {
    pub fn is_empty(&self) -> bool {
        self == &UpdateBug::default()
    }
}

/// Query filters for listing bugs.
///
/// Values are passed through verbatim; the backend validates them. Only the
/// three recognized keys ever reach the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFilters {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub sort: Option<String>,
}

impl BugFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: BugStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority.as_str().to_string());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Build filters from loosely-typed pairs, such as a parsed query string.
    /// Unrecognized keys and empty values are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "status" => filters.status = Some(value),
                "priority" => filters.priority = Some(value),
                "sort" => filters.sort = Some(value),
                _ => {}
            }
        }
        filters
    }

    /// Non-empty `(key, value)` pairs in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("status", self.status.as_deref()),
            ("priority", self.priority.as_deref()),
            ("sort", self.sort.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }
}
