// Unit tests for the automation service

use chrono::{Duration, Utc};
use churnlens_shared::automation::{ActionConfig, ConditionConfig, ExternalAction, SourceConfig};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

use crate::error::AppError;
use crate::pagination::PaginationParams;
use crate::services::automations::validate_submission;
use crate::store::{AutomationFilter, AutomationStore};
use crate::tests::TestContext;
use crate::tests::fixtures::*;

fn validation_details(err: AppError) -> std::collections::HashMap<String, Vec<String>> {
    match err {
        AppError::ValidationError { details } => details,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        let valid = validate_submission(&submission(workflow_json())).unwrap();

        assert!(valid.is_active);
        assert_eq!(valid.stages.source, SourceConfig::Cohort { cohort_id: 12 });
        assert_eq!(
            valid.stages.condition,
            ConditionConfig::ChurnProbability {
                operator: ">=".parse().unwrap(),
                value: Decimal::from_str("75.5").unwrap(),
            }
        );
        assert!(matches!(
            valid.stages.action,
            ActionConfig::External(ExternalAction::Zapier { .. })
        ));
    }

    #[test]
    fn test_name_and_description_are_trimmed() {
        let mut workflow = workflow_json();
        workflow["name"] = json!("  Win back  ");
        workflow["description"] = json!("   ");

        let valid = validate_submission(&submission(workflow)).unwrap();
        assert_eq!(valid.name, "Win back");
        assert_eq!(valid.description, None);
    }

    #[test]
    fn test_every_problem_is_reported_together() {
        let mut workflow = workflow_with(
            json!({ "type": "stream" }),
            json!({ "type": "churn_probability", "operator": "!=", "value": "140" }),
            json!({ "type": "external", "service": "ifttt" }),
        );
        workflow["name"] = json!("");

        let details = validation_details(validate_submission(&submission(workflow)).unwrap_err());

        assert_eq!(details["name"], vec!["name cannot be empty".to_string()]);
        assert!(details.contains_key("source.stream_id"));
        assert!(details.contains_key("condition.operator"));
        assert!(details.contains_key("condition.value"));
        assert_eq!(
            details["action.service"],
            vec!["action service 'ifttt' is not supported".to_string()]
        );
        assert!(!details.contains_key("action.event_name"));
    }

    #[test]
    fn test_contact_source_accepts_contact_ids() {
        let workflow = workflow_with(
            json!({ "type": "contact", "contact_ids": [7] }),
            json!({ "type": "last_login", "days_since_login": 14 }),
            json!({ "type": "email", "template_id": 2 }),
        );

        let valid = validate_submission(&submission(workflow)).unwrap();
        assert_eq!(
            valid.stages.source,
            SourceConfig::Contact {
                contact_ids: [7].into_iter().collect()
            }
        );
    }

    #[test]
    fn test_missing_stages_are_required() {
        let details = validation_details(
            validate_submission(&submission(json!({ "name": "Empty" }))).unwrap_err(),
        );

        let mut keys: Vec<_> = details.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["action.type", "condition.type", "source.type"]);
    }

    #[test]
    fn test_zapier_requires_event_and_payload() {
        let workflow = workflow_with(
            json!({ "type": "stream", "stream_id": "3" }),
            json!({ "type": "last_login", "days_since_login": "7" }),
            json!({ "type": "external", "service": "zapier", "event_name": "  " }),
        );

        let details = validation_details(validate_submission(&submission(workflow)).unwrap_err());
        assert_eq!(details.len(), 2);
        assert!(details.contains_key("action.event_name"));
        assert!(details.contains_key("action.payload_template"));
    }
}

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_creates_and_loads_for_edit() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();

        let view = ctx.service.load_for_edit(ctx.owner, created.id).await.unwrap();
        assert_eq!(view, created);
        assert_eq!(view.source.config, Some(SourceConfig::Cohort { cohort_id: 12 }));
        assert_eq!(view.source.form.kind.as_deref(), Some("cohort"));
        assert_eq!(view.source.form.fields.single("cohort_id"), Some("12"));
        assert_eq!(view.action.form.fields.single("service"), Some("zapier"));
        assert!(view.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_invalid_submission_writes_nothing() {
        let ctx = TestContext::new();
        let workflow = workflow_with(json!({}), json!({}), json!({ "type": "email" }));

        assert!(ctx.service.submit(ctx.owner, submission(workflow), None).await.is_err());

        let (rows, total) = ctx
            .store
            .list(ctx.owner, &AutomationFilter::default(), Default::default())
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_every_stage() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();

        let replacement = workflow_with(
            json!({ "type": "contact", "contact_id": ["4", "2", "4"] }),
            json!({ "type": "feature_usage", "feature_name": "exports", "min_usage_count": 3 }),
            json!({ "type": "sms", "phone_field": "mobile", "message": "Need a hand?" }),
        );
        let updated = ctx
            .service
            .submit(ctx.owner, submission(replacement), Some(created.id))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert!(updated.updated_at.is_some());
        assert_eq!(
            updated.source.config,
            Some(SourceConfig::Contact {
                contact_ids: [2, 4].into_iter().collect()
            })
        );
        assert_eq!(
            updated.condition.config,
            Some(ConditionConfig::FeatureUsage {
                feature_name: "exports".to_string(),
                min_usage_count: 3
            })
        );
    }

    #[tokio::test]
    async fn test_other_accounts_cannot_see_or_change_a_workflow() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();
        let stranger = uuid::Uuid::new_v4();

        let load = ctx.service.load_for_edit(stranger, created.id).await;
        assert!(matches!(load, Err(AppError::NotFound(_))));

        let update = ctx
            .service
            .submit(stranger, submission(workflow_json()), Some(created.id))
            .await;
        assert!(matches!(update, Err(AppError::NotFound(_))));

        let delete = ctx.service.delete(stranger, created.id).await;
        assert!(matches!(delete, Err(AppError::NotFound(_))));

        assert!(ctx.service.load_for_edit(ctx.owner, created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_unrecognized_blob_loads_as_unselected() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();
        ctx.store
            .corrupt_action(created.id, r#"{"type":"fax","number":"555"}"#)
            .await;

        let view = ctx.service.load_for_edit(ctx.owner, created.id).await.unwrap();
        assert_eq!(view.action.config, None);
        assert_eq!(view.action.form.kind, None);
        assert!(view.action.form.fields.is_empty());
        assert!(view.source.config.is_some());
        assert!(view.condition.config.is_some());
    }

    #[tokio::test]
    async fn test_list_filters_and_reports_stage_types() {
        let ctx = TestContext::new();
        for name in ["Renewal nudge", "Trial rescue", "Renewal survey"] {
            let mut workflow = workflow_json();
            workflow["name"] = json!(name);
            ctx.service.submit(ctx.owner, submission(workflow), None).await.unwrap();
        }
        ctx.service
            .submit(uuid::Uuid::new_v4(), submission(workflow_json()), None)
            .await
            .unwrap();

        let filter = AutomationFilter {
            search: Some("renewal".to_string()),
            is_active: None,
        };
        let params = PaginationParams {
            sort_by: Some("name".to_string()),
            sort_order: "asc".to_string(),
            ..Default::default()
        };
        let page = ctx.service.list(ctx.owner, &filter, &params).await.unwrap();

        assert_eq!(page.meta.total, 2);
        let names: Vec<_> = page.data.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Renewal nudge", "Renewal survey"]);
        assert_eq!(page.data[0].source_type, Some("cohort"));
        assert_eq!(page.data[0].condition_type, Some("churn_probability"));
        assert_eq!(page.data[0].action_type, Some("external"));
    }

    #[tokio::test]
    async fn test_toggle_flips_active_flag() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();
        assert!(created.is_active);

        let toggled = ctx.service.toggle(ctx.owner, created.id).await.unwrap();
        assert!(!toggled.is_active);
        let toggled = ctx.service.toggle(ctx.owner, created.id).await.unwrap();
        assert!(toggled.is_active);
    }

    #[tokio::test]
    async fn test_logs_and_summary() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();
        let now = Utc::now();
        ctx.store.record_log(created.id, "success", Some(1), now - Duration::hours(3)).await;
        ctx.store.record_log(created.id, "failed", Some(2), now - Duration::hours(2)).await;
        let latest = ctx.store.record_log(created.id, "success", Some(3), now).await;

        let params = PaginationParams::default();
        let logs = ctx
            .service
            .logs(ctx.owner, created.id, &None, &params)
            .await
            .unwrap();
        assert_eq!(logs.meta.total, 3);
        assert_eq!(logs.data[0].id, latest.id);

        let failed = ctx
            .service
            .logs(ctx.owner, created.id, &Some("FAILED".to_string()), &params)
            .await
            .unwrap();
        assert_eq!(failed.meta.total, 1);
        assert_eq!(failed.data[0].contact_id, Some(2));

        let bad_status = ctx
            .service
            .logs(ctx.owner, created.id, &Some("pending".to_string()), &params)
            .await;
        assert!(matches!(bad_status, Err(AppError::ValidationError { .. })));

        let summary = ctx.service.log_summary(ctx.owner, created.id).await.unwrap();
        assert_eq!(summary.summary.total_runs, 3);
        assert_eq!(summary.summary.succeeded, 2);
        assert_eq!(summary.summary.last_run_at, Some(now));
    }

    #[tokio::test]
    async fn test_delete_removes_workflow_and_logs() {
        let ctx = TestContext::new();
        let created = ctx
            .service
            .submit(ctx.owner, submission(workflow_json()), None)
            .await
            .unwrap();
        ctx.store.record_log(created.id, "skipped", None, Utc::now()).await;

        ctx.service.delete(ctx.owner, created.id).await.unwrap();

        assert!(matches!(
            ctx.service.load_for_edit(ctx.owner, created.id).await,
            Err(AppError::NotFound(_))
        ));
        let summary = ctx.store.log_summary(created.id, ctx.owner).await.unwrap();
        assert_eq!(summary.total_runs, 0);
    }
}
