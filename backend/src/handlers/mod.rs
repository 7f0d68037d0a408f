use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

pub mod automations;

pub use automations::automation_routes;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    if state.automations.is_healthy().await {
        (
            StatusCode::OK,
            Json(json!({"status": "healthy", "service": "churnlens-api", "database": "up"})),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "degraded", "service": "churnlens-api", "database": "down"})),
        )
    }
}
