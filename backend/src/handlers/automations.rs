use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use churnlens_shared::AutomationLog;
use churnlens_shared::automation::StageSchema;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;
use crate::auth::AccountOwner;
use crate::error::ApiResult;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::services::{AutomationListItem, AutomationView, LogSummaryView, WorkflowSubmission};
use crate::store::AutomationFilter;

#[derive(Debug, Default, Deserialize)]
pub struct AutomationQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub status: Option<String>,
}

pub fn automation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_automations).post(create_automation))
        .route("/schema", get(get_schema))
        .route(
            "/:id",
            get(get_automation)
                .put(update_automation)
                .delete(delete_automation),
        )
        .route("/:id/toggle", post(toggle_automation))
        .route("/:id/logs", get(get_logs))
        .route("/:id/logs/summary", get(get_log_summary))
}

async fn list_automations(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<AutomationQuery>,
) -> ApiResult<Json<PaginatedResponse<AutomationListItem>>> {
    let filter = AutomationFilter {
        search: query.search,
        is_active: query.is_active,
    };
    let page = state.automations.list(owner, &filter, &pagination).await?;
    Ok(Json(page))
}

async fn create_automation(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Json(payload): Json<WorkflowSubmission>,
) -> ApiResult<(StatusCode, Json<AutomationView>)> {
    let view = state.automations.submit(owner, payload, None).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Form schema for the three stages, in workflow order.
async fn get_schema() -> Json<Vec<StageSchema>> {
    Json(StageSchema::all())
}

async fn get_automation(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AutomationView>> {
    let view = state.automations.load_for_edit(owner, id).await?;
    Ok(Json(view))
}

async fn update_automation(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkflowSubmission>,
) -> ApiResult<Json<AutomationView>> {
    let view = state.automations.submit(owner, payload, Some(id)).await?;
    Ok(Json(view))
}

async fn delete_automation(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.automations.delete(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_automation(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AutomationListItem>> {
    let item = state.automations.toggle(owner, id).await?;
    Ok(Json(item))
}

async fn get_logs(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<PaginatedResponse<AutomationLog>>> {
    let logs = state
        .automations
        .logs(owner, id, &query.status, &pagination)
        .await?;
    Ok(Json(logs))
}

async fn get_log_summary(
    State(state): State<Arc<AppState>>,
    AccountOwner(owner): AccountOwner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LogSummaryView>> {
    let summary = state.automations.log_summary(owner, id).await?;
    Ok(Json(summary))
}
