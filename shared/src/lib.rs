use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod automation;

/// A persisted automation. Stage configurations are stored as JSON blobs and
/// interpreted with `automation::decode`.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub source_config: String,
    pub condition_config: String,
    pub action_config: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Automation {
    pub fn decode(&self) -> automation::DecodedStages {
        automation::decode(&self.source_config, &self.condition_config, &self.action_config)
    }
}

/// One execution record written by the automation runner.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationLog {
    pub id: Uuid,
    pub automation_id: Uuid,
    pub contact_id: Option<i64>,
    pub status: String, // success, failed, skipped
    pub message: Option<String>,
    pub executed_at: DateTime<Utc>,
}

pub const AUTOMATION_LOG_STATUSES: &[&str] = &["success", "failed", "skipped"];

/// Aggregate of an automation's execution records.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationLogSummary {
    pub total_runs: i64,
    pub succeeded: i64,
    pub failed: i64,
    pub skipped: i64,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl AutomationLogSummary {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a AutomationLog>) -> Self {
        let mut summary = Self::default();
        for log in logs {
            summary.total_runs += 1;
            match log.status.as_str() {
                "success" => summary.succeeded += 1,
                "failed" => summary.failed += 1,
                "skipped" => summary.skipped += 1,
                _ => {}
            }
            if summary.last_run_at.is_none_or(|last| log.executed_at > last) {
                summary.last_run_at = Some(log.executed_at);
            }
        }
        summary
    }

    /// Share of runs that succeeded, as a percentage.
    pub fn success_rate(&self) -> Option<f64> {
        (self.total_runs > 0).then(|| self.succeeded as f64 / self.total_runs as f64 * 100.0)
    }
}
