use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub workflow: String,
    pub scoring_configured: bool,
    pub poll_interval_ms: u64,
    pub max_wait_secs: u64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Health check");

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        started_at: state.started_at,
        workflow: state.config.workflow.resource_name(),
        scoring_configured: state.scoring.is_some(),
        poll_interval_ms: state.config.poll.interval_ms,
        max_wait_secs: state.config.poll.max_wait_secs,
    };

    (StatusCode::OK, Json(response))
}
