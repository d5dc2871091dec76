//! Liveness endpoints.
//!
//! SRP: report that the process is up; never touches the warehouse.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

use super::QueryErrorResponse;

pub async fn root() -> &'static str {
    "Backend API is running"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds().max(0),
    })
}

pub async fn not_found() -> (StatusCode, Json<QueryErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(QueryErrorResponse {
            error: "Not Found".into(),
        }),
    )
}
