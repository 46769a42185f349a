//! Liveness, readiness and health probes.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Key that is never written; asking for it exercises the disk round trip.
const STORAGE_PROBE_KEY: &str = "health-check-non-existent-key";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Probe {
    Healthy,
    Failed(String),
    TimedOut,
}

impl Probe {
    async fn run<E: Display>(timeout: Duration, check: impl Future<Output = Result<(), E>>) -> Self {
        match tokio::time::timeout(timeout, check).await {
            Ok(Ok(())) => Probe::Healthy,
            Ok(Err(e)) => Probe::Failed(e.to_string()),
            Err(_) => Probe::TimedOut,
        }
    }

    fn is_healthy(&self) -> bool {
        matches!(self, Probe::Healthy)
    }

    /// `healthy`, `timeout`, or `{label}: {error}`.
    fn describe(&self, failure_label: &str) -> String {
        match self {
            Probe::Healthy => "healthy".to_string(),
            Probe::TimedOut => "timeout".to_string(),
            Probe::Failed(error) => format!("{}: {}", failure_label, error),
        }
    }
}

async fn probe_database(state: &AppState) -> Probe {
    Probe::run(PROBE_TIMEOUT, async {
        sqlx::query("SELECT 1").execute(&state.db.pool).await.map(drop)
    })
    .await
}

#[derive(Serialize)]
pub(super) struct HealthCheckResponse {
    status: &'static str,
    database: String,
    storage: String,
}

pub async fn liveness_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

/// Ready once the database answers.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = probe_database(&state).await;
    let described = database.describe("not_ready");

    if database.is_healthy() {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "database": described })),
        )
    } else {
        tracing::error!(database = %described, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "database": described })),
        )
    }
}

/// Database and disk. A failing disk only degrades the report; the status
/// code follows the database.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = probe_database(&state).await;
    let storage = Probe::run(PROBE_TIMEOUT, async {
        state.media.storage.exists(STORAGE_PROBE_KEY).await.map(drop)
    })
    .await;

    if !storage.is_healthy() {
        tracing::warn!(storage = %storage.describe("degraded"), "Storage probe failed");
    }

    let (code, status) = if database.is_healthy() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        code,
        Json(HealthCheckResponse {
            status,
            database: database.describe("unhealthy"),
            storage: storage.describe("degraded"),
        }),
    )
}
