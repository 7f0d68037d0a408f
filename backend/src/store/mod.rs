//! Automation persistence
//!
//! Every read and write is scoped to the owning account: a row owned by
//! someone else behaves exactly like a missing row.

use async_trait::async_trait;
use churnlens_shared::automation::EncodedStages;
use churnlens_shared::{Automation, AutomationLog, AutomationLogSummary};
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryAutomationStore;
pub use postgres::PgAutomationStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A validated automation ready to be written.
#[derive(Debug, Clone)]
pub struct NewAutomation {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub stages: EncodedStages,
}

/// Full replacement of an automation's editable fields.
#[derive(Debug, Clone)]
pub struct AutomationChanges {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub stages: EncodedStages,
}

impl From<NewAutomation> for AutomationChanges {
    fn from(new: NewAutomation) -> Self {
        Self {
            name: new.name,
            description: new.description,
            is_active: new.is_active,
            stages: new.stages,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutomationFilter {
    /// Case-insensitive match on name
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// Sortable columns of the automations list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationSort {
    Name,
    CreatedAt,
    UpdatedAt,
}

impl AutomationSort {
    pub const FIELDS: &'static [&'static str] = &["name", "created_at", "updated_at"];

    pub fn parse(field: &str) -> Self {
        match field {
            "name" => Self::Name,
            "updated_at" => Self::UpdatedAt,
            _ => Self::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
    pub sort: AutomationSort,
    pub ascending: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: crate::pagination::DEFAULT_PAGE_SIZE,
            offset: 0,
            sort: AutomationSort::CreatedAt,
            ascending: false,
        }
    }
}

/// Storage for automations and their execution logs.
///
/// Implementations must be `Send + Sync + 'static` to live in axum state.
#[async_trait]
pub trait AutomationStore: Send + Sync + 'static {
    /// Insert a new automation, generating its id and `created_at`.
    async fn create(&self, new: NewAutomation) -> StoreResult<Automation>;

    /// Overwrite an automation in place, setting `updated_at`. `None` if not found for this owner.
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: AutomationChanges,
    ) -> StoreResult<Option<Automation>>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool>;

    async fn fetch(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Automation>>;

    /// One page of an owner's automations plus the total matching the filter.
    async fn list(
        &self,
        owner_id: Uuid,
        filter: &AutomationFilter,
        page: Page,
    ) -> StoreResult<(Vec<Automation>, i64)>;

    /// Flip `is_active`.
    async fn toggle_active(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Automation>>;

    /// Execution logs of one automation, newest first.
    async fn logs(
        &self,
        automation_id: Uuid,
        owner_id: Uuid,
        status: Option<&str>,
        page: Page,
    ) -> StoreResult<(Vec<AutomationLog>, i64)>;

    async fn log_summary(
        &self,
        automation_id: Uuid,
        owner_id: Uuid,
    ) -> StoreResult<AutomationLogSummary>;

    /// Whether the backing storage is reachable.
    async fn ping(&self) -> bool;
}
