use std::{cmp::Ordering, collections::HashMap, sync::Arc, time::Instant};

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateBug {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub reporter: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBug {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub reporter: Option<String>,
}

/// Query string accepted by `GET /api/bugs`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub sort: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<String, Bug>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub started: Instant,
    pub environment: String,
}

impl AppState {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            db: Arc::new(RwLock::new(HashMap::new())),
            started: Instant::now(),
            environment: environment.into(),
        }
    }
}

/// Error body shape shared by every failing route.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

pub fn app() -> Router {
    app_with_state(AppState::new("development"))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/bugs", get(list_bugs).post(create_bug))
        .route(
            "/api/bugs/{id}",
            get(get_bug).put(update_bug).delete(delete_bug),
        )
        .fallback(not_found)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let mut body = json!({
        "success": true,
        "status": "ok",
        "message": "API is healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.environment,
        "uptime": state.started.elapsed().as_secs_f64(),
    });
    if let Some((used, total)) = memory_usage_mb() {
        body["memory"] = json!({ "used": used, "total": total });
    }
    Json(body)
}

/// Resident and virtual size of this process in MiB, from `/proc/self/status`.
/// `None` where procfs is unavailable.
fn memory_usage_mb() -> Option<(u64, u64)> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_memory_status(&status)
}

fn parse_memory_status(status: &str) -> Option<(u64, u64)> {
    let kib = |field: &str| {
        status
            .lines()
            .find_map(|line| line.strip_prefix(field))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|value| value.parse::<u64>().ok())
    };
    let used = kib("VmRSS:")?;
    let total = kib("VmSize:")?;
    Some(((used + 512) / 1024, (total + 512) / 1024))
}

/// Sort key and direction from a `sort` value such as `-createdAt`.
/// Unknown keys fall back to newest first.
fn sort_bugs(bugs: &mut [Bug], sort: Option<&str>) {
    let (descending, key) = match sort {
        Some(s) if s.starts_with('-') => (true, &s[1..]),
        Some(s) => (false, s),
        None => (true, "createdAt"),
    };
    let compare: fn(&Bug, &Bug) -> Ordering = match key {
        "priority" => |a: &Bug, b: &Bug| a.priority.cmp(&b.priority),
        "title" => |a: &Bug, b: &Bug| a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        "createdAt" => |a: &Bug, b: &Bug| a.created_at.cmp(&b.created_at),
        _ => return sort_bugs(bugs, None),
    };
    bugs.sort_by(|a, b| {
        let ord = compare(a, b).then_with(|| a.created_at.cmp(&b.created_at));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

async fn list_bugs(State(state): State<AppState>, Query(params): Query<ListParams>) -> Json<Value> {
    let db = state.db.read().await;
    let mut bugs: Vec<Bug> = db
        .values()
        .filter(|b| {
            params
                .status
                .as_deref()
                .map_or(true, |s| s.is_empty() || wire_name(&b.status) == s)
        })
        .filter(|b| {
            params
                .priority
                .as_deref()
                .map_or(true, |p| p.is_empty() || wire_name(&b.priority) == p)
        })
        .cloned()
        .collect();
    sort_bugs(&mut bugs, params.sort.as_deref().filter(|s| !s.is_empty()));
    Json(json!({ "success": true, "count": bugs.len(), "data": bugs }))
}

async fn create_bug(State(state): State<AppState>, Json(input): Json<CreateBug>) -> Response {
    let title = input.title.trim();
    if title.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Title is required");
    }
    let now = Utc::now();
    let bug = Bug {
        id: Uuid::new_v4().simple().to_string(),
        title: title.to_string(),
        description: input.description,
        status: input.status.unwrap_or(Status::Open),
        priority: input.priority.unwrap_or(Priority::Medium),
        reporter: input.reporter,
        created_at: now,
        updated_at: now,
    };
    state.db.write().await.insert(bug.id.clone(), bug.clone());
    (StatusCode::CREATED, Json(bug)).into_response()
}

async fn get_bug(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let db = state.db.read().await;
    match db.get(&id) {
        Some(bug) => Json(json!({ "success": true, "data": bug })).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Bug not found"),
    }
}

async fn update_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateBug>,
) -> Response {
    let mut db = state.db.write().await;
    let Some(bug) = db.get_mut(&id) else {
        return error_response(StatusCode::NOT_FOUND, "Bug not found");
    };
    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return error_response(StatusCode::BAD_REQUEST, "Title cannot be empty");
        }
        bug.title = title.trim().to_string();
    }
    if let Some(description) = input.description {
        bug.description = description;
    }
    if let Some(status) = input.status {
        bug.status = status;
    }
    if let Some(priority) = input.priority {
        bug.priority = priority;
    }
    if let Some(reporter) = input.reporter {
        bug.reporter = Some(reporter);
    }
    bug.updated_at = Utc::now();
    Json(json!({ "success": true, "data": bug })).into_response()
}

async fn delete_bug(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut db = state.db.write().await;
    match db.remove(&id) {
        Some(bug) => Json(json!({ "success": true, "data": bug })).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Bug not found"),
    }
}

async fn not_found(uri: Uri) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Route not found - {}", uri.path()),
    )
}
