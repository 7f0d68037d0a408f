// Form schema - the fields each stage variant asks for
//
// A rendering layer walks this to build the dynamic workflow form. The
// validators in this module are the authority; this describes them.

use serde::Serialize;

use super::error::{Constraint, Stage};
use super::{ActionConfig, ComparisonOperator, ConditionConfig, ExternalAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Reference picked from a list supplied by the caller (stream, cohort, template...).
    Id,
    /// Multi-select of references.
    IdList,
    Integer,
    Decimal,
    Text,
    Select,
}

/// Makes a field required only when a sibling field holds a given value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredWhen {
    pub field: &'static str,
    pub equals: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_when: Option<RequiredWhen>,
}

impl FieldSchema {
    fn new(name: &'static str, label: &'static str, input: InputKind) -> Self {
        Self {
            name,
            label,
            input,
            required: true,
            constraint: None,
            options: Vec::new(),
            required_when: None,
        }
    }

    fn id(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, InputKind::Id)
    }

    fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, InputKind::Text)
    }

    fn count(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, InputKind::Integer).constrained(Constraint::AtLeast { min: 1 })
    }

    fn select(name: &'static str, label: &'static str, options: &[&'static str]) -> Self {
        let mut field = Self::new(name, label, InputKind::Select);
        field.options = options.to_vec();
        field
    }

    fn constrained(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    fn required_when(mut self, field: &'static str, equals: &'static str) -> Self {
        self.required = false;
        self.required_when = Some(RequiredWhen { field, equals });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: &'static str,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSchema {
    pub stage: Stage,
    pub variants: Vec<VariantSchema>,
}

impl StageSchema {
    pub fn for_stage(stage: Stage) -> Self {
        let variants = match stage {
            Stage::Source => source_variants(),
            Stage::Condition => condition_variants(),
            Stage::Action => action_variants(),
        };
        Self { stage, variants }
    }

    /// All three stages, in workflow order.
    pub fn all() -> Vec<Self> {
        Stage::ALL.into_iter().map(Self::for_stage).collect()
    }

    pub fn variant(&self, kind: &str) -> Option<&VariantSchema> {
        self.variants.iter().find(|v| v.kind == kind)
    }
}

fn source_variants() -> Vec<VariantSchema> {
    vec![
        VariantSchema {
            kind: "stream",
            label: "Stream",
            fields: vec![FieldSchema::id("stream_id", "Stream")],
        },
        VariantSchema {
            kind: "cohort",
            label: "Cohort",
            fields: vec![FieldSchema::id("cohort_id", "Cohort")],
        },
        VariantSchema {
            kind: "contact",
            label: "Specific contacts",
            fields: vec![FieldSchema::new("contact_id", "Contacts", InputKind::IdList)],
        },
    ]
}

fn condition_variants() -> Vec<VariantSchema> {
    vec![
        VariantSchema {
            kind: "churn_probability",
            label: "Churn probability",
            fields: vec![
                FieldSchema::select("operator", "Operator", ComparisonOperator::SYMBOLS),
                FieldSchema::new("value", "Probability (%)", InputKind::Decimal).constrained(
                    Constraint::Between {
                        min: ConditionConfig::PROBABILITY_MIN,
                        max: ConditionConfig::PROBABILITY_MAX,
                    },
                ),
            ],
        },
        VariantSchema {
            kind: "competitor_visit",
            label: "Competitor visit",
            fields: vec![
                FieldSchema::id("competitor_id", "Competitor"),
                FieldSchema::count("timeframe_days", "Within (days)"),
            ],
        },
        VariantSchema {
            kind: "feature_usage",
            label: "Feature usage",
            fields: vec![
                FieldSchema::text("feature_name", "Feature"),
                FieldSchema::count("min_usage_count", "Minimum uses"),
            ],
        },
        VariantSchema {
            kind: "last_login",
            label: "Last login",
            fields: vec![FieldSchema::count("days_since_login", "Days since login")],
        },
    ]
}

fn action_variants() -> Vec<VariantSchema> {
    vec![
        VariantSchema {
            kind: "email",
            label: "Send email",
            fields: vec![FieldSchema::id("template_id", "Template")],
        },
        VariantSchema {
            kind: "sms",
            label: "Send SMS",
            fields: vec![
                FieldSchema::text("phone_field", "Phone field"),
                FieldSchema::text("message", "Message"),
            ],
        },
        VariantSchema {
            kind: "change_cohort",
            label: "Move to cohort",
            fields: vec![FieldSchema::id("cohort_id", "Cohort")],
        },
        VariantSchema {
            kind: "notification",
            label: "Team notification",
            fields: vec![FieldSchema::text("message", "Message")],
        },
        VariantSchema {
            kind: "external",
            label: "External service",
            fields: vec![
                FieldSchema::select("service", "Service", ExternalAction::SERVICES),
                FieldSchema::text("event_name", "Event name").required_when("service", "zapier"),
                FieldSchema::text("payload_template", "Payload template")
                    .required_when("service", "zapier"),
            ],
        },
    ]
}

/// Variant kinds per stage, as accepted by the validators.
pub fn kinds(stage: Stage) -> &'static [&'static str] {
    match stage {
        Stage::Source => super::SourceConfig::KINDS,
        Stage::Condition => ConditionConfig::KINDS,
        Stage::Action => ActionConfig::KINDS,
    }
}
