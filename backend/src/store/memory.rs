use async_trait::async_trait;
use chrono::{DateTime, Utc};
use churnlens_shared::{Automation, AutomationLog, AutomationLogSummary};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AutomationChanges, AutomationFilter, AutomationSort, AutomationStore, NewAutomation, Page,
    StoreResult,
};

/// In-process store used by the test suite.
#[derive(Default)]
pub struct MemoryAutomationStore {
    automations: RwLock<HashMap<Uuid, Automation>>,
    logs: RwLock<Vec<AutomationLog>>,
}

impl MemoryAutomationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an execution, as the automation runner would.
    pub async fn record_log(
        &self,
        automation_id: Uuid,
        status: &str,
        contact_id: Option<i64>,
        executed_at: DateTime<Utc>,
    ) -> AutomationLog {
        let log = AutomationLog {
            id: Uuid::new_v4(),
            automation_id,
            contact_id,
            status: status.to_string(),
            message: None,
            executed_at,
        };
        self.logs.write().await.push(log.clone());
        log
    }

    /// Overwrite a stored blob directly, bypassing validation.
    pub async fn corrupt_action(&self, id: Uuid, blob: &str) {
        if let Some(automation) = self.automations.write().await.get_mut(&id) {
            automation.action_config = blob.to_string();
        }
    }

    async fn owns(&self, id: Uuid, owner_id: Uuid) -> bool {
        self.automations
            .read()
            .await
            .get(&id)
            .is_some_and(|a| a.owner_id == owner_id)
    }

    async fn owner_logs(&self, automation_id: Uuid, owner_id: Uuid) -> Vec<AutomationLog> {
        if !self.owns(automation_id, owner_id).await {
            return Vec::new();
        }
        self.logs
            .read()
            .await
            .iter()
            .filter(|l| l.automation_id == automation_id)
            .cloned()
            .collect()
    }
}

fn compare(sort: AutomationSort, a: &Automation, b: &Automation) -> Ordering {
    match sort {
        AutomationSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        AutomationSort::CreatedAt => a.created_at.cmp(&b.created_at),
        AutomationSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn window<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl AutomationStore for MemoryAutomationStore {
    async fn create(&self, new: NewAutomation) -> StoreResult<Automation> {
        let automation = Automation {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            description: new.description,
            is_active: new.is_active,
            source_config: new.stages.source,
            condition_config: new.stages.condition,
            action_config: new.stages.action,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.automations
            .write()
            .await
            .insert(automation.id, automation.clone());
        Ok(automation)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: AutomationChanges,
    ) -> StoreResult<Option<Automation>> {
        let mut automations = self.automations.write().await;
        let Some(automation) = automations.get_mut(&id).filter(|a| a.owner_id == owner_id) else {
            return Ok(None);
        };

        automation.name = changes.name;
        automation.description = changes.description;
        automation.is_active = changes.is_active;
        automation.source_config = changes.stages.source;
        automation.condition_config = changes.stages.condition;
        automation.action_config = changes.stages.action;
        automation.updated_at = Some(Utc::now());

        Ok(Some(automation.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        if !self.owns(id, owner_id).await {
            return Ok(false);
        }
        self.automations.write().await.remove(&id);
        self.logs.write().await.retain(|l| l.automation_id != id);
        Ok(true)
    }

    async fn fetch(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Automation>> {
        Ok(self
            .automations
            .read()
            .await
            .get(&id)
            .filter(|a| a.owner_id == owner_id)
            .cloned())
    }

    async fn list(
        &self,
        owner_id: Uuid,
        filter: &AutomationFilter,
        page: Page,
    ) -> StoreResult<(Vec<Automation>, i64)> {
        let search = filter
            .search
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut matching: Vec<Automation> = self
            .automations
            .read()
            .await
            .values()
            .filter(|a| a.owner_id == owner_id)
            .filter(|a| {
                search
                    .as_ref()
                    .is_none_or(|q| a.name.to_lowercase().contains(q))
            })
            .filter(|a| filter.is_active.is_none_or(|active| a.is_active == active))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let order = compare(page.sort, a, b);
            let order = if page.ascending { order } else { order.reverse() };
            order.then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        Ok((window(matching, page), total))
    }

    async fn toggle_active(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Automation>> {
        let mut automations = self.automations.write().await;
        let Some(automation) = automations.get_mut(&id).filter(|a| a.owner_id == owner_id) else {
            return Ok(None);
        };
        automation.is_active = !automation.is_active;
        automation.updated_at = Some(Utc::now());
        Ok(Some(automation.clone()))
    }

    async fn logs(
        &self,
        automation_id: Uuid,
        owner_id: Uuid,
        status: Option<&str>,
        page: Page,
    ) -> StoreResult<(Vec<AutomationLog>, i64)> {
        let mut logs: Vec<AutomationLog> = self
            .owner_logs(automation_id, owner_id)
            .await
            .into_iter()
            .filter(|l| status.is_none_or(|s| l.status == s))
            .collect();
        logs.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));

        let total = logs.len() as i64;
        Ok((window(logs, page), total))
    }

    async fn log_summary(
        &self,
        automation_id: Uuid,
        owner_id: Uuid,
    ) -> StoreResult<AutomationLogSummary> {
        let logs = self.owner_logs(automation_id, owner_id).await;
        Ok(AutomationLogSummary::from_logs(&logs))
    }

    async fn ping(&self) -> bool {
        true
    }
}
