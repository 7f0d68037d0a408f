use async_trait::async_trait;
use churnlens_shared::{Automation, AutomationLog, AutomationLogSummary};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AutomationChanges, AutomationFilter, AutomationStore, NewAutomation, Page, StoreResult,
};
use crate::pagination::QueryBuilder;

const AUTOMATION_COLUMNS: &str = "id, owner_id, name, description, is_active, \
     source_config, condition_config, action_config, created_at, updated_at";

/// Postgres-backed automation storage.
#[derive(Clone)]
pub struct PgAutomationStore {
    pool: PgPool,
}

impl PgAutomationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AutomationStore for PgAutomationStore {
    async fn create(&self, new: NewAutomation) -> StoreResult<Automation> {
        let automation = sqlx::query_as::<_, Automation>(&format!(
            r#"INSERT INTO automations (
                id, owner_id, name, description, is_active,
                source_config, condition_config, action_config, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING {AUTOMATION_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.is_active)
        .bind(&new.stages.source)
        .bind(&new.stages.condition)
        .bind(&new.stages.action)
        .fetch_one(&self.pool)
        .await?;

        Ok(automation)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: AutomationChanges,
    ) -> StoreResult<Option<Automation>> {
        let automation = sqlx::query_as::<_, Automation>(&format!(
            r#"UPDATE automations SET
                name = $3,
                description = $4,
                is_active = $5,
                source_config = $6,
                condition_config = $7,
                action_config = $8,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {AUTOMATION_COLUMNS}"#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.is_active)
        .bind(&changes.stages.source)
        .bind(&changes.stages.condition)
        .bind(&changes.stages.action)
        .fetch_optional(&self.pool)
        .await?;

        Ok(automation)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM automations WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Automation>> {
        let automation = sqlx::query_as::<_, Automation>(&format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(automation)
    }

    async fn list(
        &self,
        owner_id: Uuid,
        filter: &AutomationFilter,
        page: Page,
    ) -> StoreResult<(Vec<Automation>, i64)> {
        let search = filter
            .search
            .as_ref()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let mut qb = QueryBuilder::new();
        qb.add_condition("owner_id = {}");
        qb.add_optional("name ILIKE {}", &search);
        qb.add_optional("is_active = {}", &filter.is_active);

        let limit_param = qb.param_count() + 1;
        let list_sql = format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations {} ORDER BY {} {} NULLS LAST, id LIMIT ${} OFFSET ${}",
            qb.where_clause(),
            page.sort.column(),
            if page.ascending { "ASC" } else { "DESC" },
            limit_param,
            limit_param + 1,
        );
        let count_sql = format!("SELECT COUNT(*) FROM automations {}", qb.where_clause());

        let mut list_query = sqlx::query_as::<_, Automation>(&list_sql).bind(owner_id);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(owner_id);
        if let Some(search) = &search {
            list_query = list_query.bind(search);
            count_query = count_query.bind(search);
        }
        if let Some(is_active) = filter.is_active {
            list_query = list_query.bind(is_active);
            count_query = count_query.bind(is_active);
        }

        let automations = list_query
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok((automations, total))
    }

    async fn toggle_active(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Automation>> {
        let automation = sqlx::query_as::<_, Automation>(&format!(
            r#"UPDATE automations SET is_active = NOT is_active, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {AUTOMATION_COLUMNS}"#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(automation)
    }

    async fn logs(
        &self,
        automation_id: Uuid,
        owner_id: Uuid,
        status: Option<&str>,
        page: Page,
    ) -> StoreResult<(Vec<AutomationLog>, i64)> {
        let logs = sqlx::query_as::<_, AutomationLog>(
            r#"SELECT l.id, l.automation_id, l.contact_id, l.status, l.message, l.executed_at
            FROM automation_logs l
            JOIN automations a ON a.id = l.automation_id
            WHERE l.automation_id = $1 AND a.owner_id = $2
              AND ($3::TEXT IS NULL OR l.status = $3)
            ORDER BY l.executed_at DESC
            LIMIT $4 OFFSET $5"#,
        )
        .bind(automation_id)
        .bind(owner_id)
        .bind(status)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*)
            FROM automation_logs l
            JOIN automations a ON a.id = l.automation_id
            WHERE l.automation_id = $1 AND a.owner_id = $2
              AND ($3::TEXT IS NULL OR l.status = $3)"#,
        )
        .bind(automation_id)
        .bind(owner_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((logs, total))
    }

    async fn log_summary(
        &self,
        automation_id: Uuid,
        owner_id: Uuid,
    ) -> StoreResult<AutomationLogSummary> {
        let summary = sqlx::query_as::<_, AutomationLogSummary>(
            r#"SELECT
                COUNT(*) AS total_runs,
                COUNT(*) FILTER (WHERE l.status = 'success') AS succeeded,
                COUNT(*) FILTER (WHERE l.status = 'failed') AS failed,
                COUNT(*) FILTER (WHERE l.status = 'skipped') AS skipped,
                MAX(l.executed_at) AS last_run_at
            FROM automation_logs l
            JOIN automations a ON a.id = l.automation_id
            WHERE l.automation_id = $1 AND a.owner_id = $2"#,
        )
        .bind(automation_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
