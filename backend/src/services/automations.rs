//! Automation workflows for an owning account
//!
//! Submissions are validated as a whole: the name and all three stages are
//! checked before anything is reported, and nothing is written unless every
//! check passes.

use chrono::{DateTime, Utc};
use churnlens_shared::automation::{
    ActionConfig, ConditionConfig, DecodedStages, FieldErrors, SourceConfig, Stage, StageConfig,
    StageForm, ValidatedStages, validate_workflow,
};
use churnlens_shared::{AUTOMATION_LOG_STATUSES, Automation, AutomationLog, AutomationLogSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::store::{AutomationChanges, AutomationFilter, AutomationStore, NewAutomation};
use crate::validation::{NAME_MAX_LENGTH, Validator, enums};

/// A create or update request as posted by the workflow form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSubmission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub source: StageForm,
    #[serde(default)]
    pub condition: StageForm,
    #[serde(default)]
    pub action: StageForm,
}

/// A submission that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub stages: ValidatedStages,
}

/// Check the name and all three stages, reporting every problem at once.
pub fn validate_submission(submission: &WorkflowSubmission) -> ApiResult<ValidatedSubmission> {
    let stages = validate_workflow(
        &submission.source,
        &submission.condition,
        &submission.action,
    );
    let stage_errors = match &stages {
        Ok(_) => FieldErrors::new(),
        Err(errors) => errors.clone(),
    };

    Validator::new()
        .required_string(&submission.name, "name")
        .max_length(&submission.name, "name", NAME_MAX_LENGTH)
        .field_errors(&stage_errors)
        .finish()?;

    Ok(ValidatedSubmission {
        name: submission.name.as_deref().unwrap_or_default().trim().to_string(),
        description: submission
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        is_active: submission.is_active.unwrap_or(true),
        stages: stages?,
    })
}

/// One stage of a stored workflow: the decoded configuration, or nothing when
/// the stored blob is no longer recognized, plus the form that edits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageView<T> {
    pub config: Option<T>,
    pub form: StageForm,
}

impl<T: StageConfig> StageView<T> {
    fn new(config: Option<T>) -> Self {
        let form = config.as_ref().map(StageForm::prefill).unwrap_or_default();
        Self { config, form }
    }
}

/// A workflow decoded for display and editing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub source: StageView<SourceConfig>,
    pub condition: StageView<ConditionConfig>,
    pub action: StageView<ActionConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AutomationView {
    fn new(automation: Automation) -> Self {
        let stages = decode_logged(&automation);
        Self {
            id: automation.id,
            name: automation.name,
            description: automation.description,
            is_active: automation.is_active,
            source: StageView::new(stages.source),
            condition: StageView::new(stages.condition),
            action: StageView::new(stages.action),
            created_at: automation.created_at,
            updated_at: automation.updated_at,
        }
    }
}

/// Row of the automations list. Stage types are `None` when unrecognized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationListItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub source_type: Option<&'static str>,
    pub condition_type: Option<&'static str>,
    pub action_type: Option<&'static str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AutomationListItem {
    fn new(automation: Automation) -> Self {
        let stages = automation.decode();
        Self {
            id: automation.id,
            name: automation.name,
            description: automation.description,
            is_active: automation.is_active,
            source_type: stages.source.as_ref().map(StageConfig::kind),
            condition_type: stages.condition.as_ref().map(StageConfig::kind),
            action_type: stages.action.as_ref().map(StageConfig::kind),
            created_at: automation.created_at,
            updated_at: automation.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummaryView {
    #[serde(flatten)]
    pub summary: AutomationLogSummary,
    pub success_rate: Option<f64>,
}

fn decode_logged(automation: &Automation) -> DecodedStages {
    let stages = automation.decode();
    if stages.is_complete() {
        return stages;
    }

    let unrecognized = [
        (Stage::Source, stages.source.is_none()),
        (Stage::Condition, stages.condition.is_none()),
        (Stage::Action, stages.action.is_none()),
    ];
    for (stage, _) in unrecognized.into_iter().filter(|(_, missing)| *missing) {
        warn!(
            automation_id = %automation.id,
            stage = %stage,
            "Stored stage configuration is unrecognized, showing it as unselected"
        );
    }
    stages
}

#[derive(Clone)]
pub struct AutomationService {
    store: Arc<dyn AutomationStore>,
}

impl AutomationService {
    pub fn new(store: Arc<dyn AutomationStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a workflow: created when `existing` is `None`,
    /// otherwise replaces the owner's workflow with that id.
    pub async fn submit(
        &self,
        owner_id: Uuid,
        submission: WorkflowSubmission,
        existing: Option<Uuid>,
    ) -> ApiResult<AutomationView> {
        let valid = validate_submission(&submission)?;
        let new = NewAutomation {
            owner_id,
            name: valid.name,
            description: valid.description,
            is_active: valid.is_active,
            stages: valid.stages.encode()?,
        };

        let automation = match existing {
            None => {
                let automation = self.store.create(new).await?;
                info!(automation_id = %automation.id, owner_id = %owner_id, "Automation created");
                automation
            }
            Some(id) => {
                let automation = self
                    .store
                    .update(id, owner_id, AutomationChanges::from(new))
                    .await?
                    .ok_or_else(|| ApiError::not_found("Automation"))?;
                info!(automation_id = %id, owner_id = %owner_id, "Automation updated");
                automation
            }
        };

        Ok(AutomationView::new(automation))
    }

    /// Fetch a workflow and decode it for the edit form.
    pub async fn load_for_edit(&self, owner_id: Uuid, id: Uuid) -> ApiResult<AutomationView> {
        let automation = self.fetch(owner_id, id).await?;
        Ok(AutomationView::new(automation))
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> ApiResult<()> {
        if !self.store.delete(id, owner_id).await? {
            return Err(ApiError::not_found("Automation"));
        }
        info!(automation_id = %id, owner_id = %owner_id, "Automation deleted");
        Ok(())
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        filter: &AutomationFilter,
        params: &PaginationParams,
    ) -> ApiResult<PaginatedResponse<AutomationListItem>> {
        let (automations, total) = self
            .store
            .list(owner_id, filter, params.automation_page())
            .await?;
        let items = automations.into_iter().map(AutomationListItem::new).collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn toggle(&self, owner_id: Uuid, id: Uuid) -> ApiResult<AutomationListItem> {
        let automation = self
            .store
            .toggle_active(id, owner_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Automation"))?;
        info!(
            automation_id = %id,
            owner_id = %owner_id,
            is_active = automation.is_active,
            "Automation toggled"
        );
        Ok(AutomationListItem::new(automation))
    }

    pub async fn logs(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: &Option<String>,
        params: &PaginationParams,
    ) -> ApiResult<PaginatedResponse<AutomationLog>> {
        let status = enums::one_of_optional(status, "status", AUTOMATION_LOG_STATUSES)?;
        self.fetch(owner_id, id).await?;

        let (logs, total) = self
            .store
            .logs(id, owner_id, status.as_deref(), params.automation_page())
            .await?;
        Ok(PaginatedResponse::new(logs, params, total))
    }

    pub async fn log_summary(&self, owner_id: Uuid, id: Uuid) -> ApiResult<LogSummaryView> {
        self.fetch(owner_id, id).await?;
        let summary = self.store.log_summary(id, owner_id).await?;
        Ok(LogSummaryView {
            success_rate: summary.success_rate(),
            summary,
        })
    }

    pub async fn is_healthy(&self) -> bool {
        self.store.ping().await
    }

    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> ApiResult<Automation> {
        self.store
            .fetch(id, owner_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Automation"))
    }
}
