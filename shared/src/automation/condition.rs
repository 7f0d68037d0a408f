// Workflow conditions - when an automation fires for a contact

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::StageConfig;
use super::error::{FieldErrors, Stage};
use super::fields::RawFields;
use super::reader::FieldReader;

/// Comparison applied to a contact's churn score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = ">=")]
    GreaterThanOrEquals,
    #[serde(rename = "<=")]
    LessThanOrEquals,
}

impl ComparisonOperator {
    pub const SYMBOLS: &'static [&'static str] = &[">", "<", "=", ">=", "<="];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equals => "=",
            Self::GreaterThanOrEquals => ">=",
            Self::LessThanOrEquals => "<=",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            "=" => Ok(Self::Equals),
            ">=" => Ok(Self::GreaterThanOrEquals),
            "<=" => Ok(Self::LessThanOrEquals),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionConfig {
    /// Churn score (percent) compared against a threshold.
    ChurnProbability {
        operator: ComparisonOperator,
        value: Decimal,
    },
    CompetitorVisit {
        competitor_id: i64,
        timeframe_days: u32,
    },
    FeatureUsage {
        feature_name: String,
        min_usage_count: u32,
    },
    LastLogin { days_since_login: u32 },
}

impl ConditionConfig {
    pub const KINDS: &'static [&'static str] = &[
        "churn_probability",
        "competitor_visit",
        "feature_usage",
        "last_login",
    ];

    pub const PROBABILITY_MIN: i64 = 0;
    pub const PROBABILITY_MAX: i64 = 100;
}

impl StageConfig for ConditionConfig {
    const STAGE: Stage = Stage::Condition;

    fn kind(&self) -> &'static str {
        match self {
            Self::ChurnProbability { .. } => "churn_probability",
            Self::CompetitorVisit { .. } => "competitor_visit",
            Self::FeatureUsage { .. } => "feature_usage",
            Self::LastLogin { .. } => "last_login",
        }
    }

    fn validate_known(kind: &str, fields: &RawFields) -> Option<Result<Self, FieldErrors>> {
        let mut reader = FieldReader::new(Stage::Condition, fields);
        let config = match kind {
            "churn_probability" => {
                let operator = reader.choice("operator", ComparisonOperator::SYMBOLS);
                let value = reader.decimal("value", Self::PROBABILITY_MIN, Self::PROBABILITY_MAX);
                operator
                    .zip(value)
                    .map(|(operator, value)| Self::ChurnProbability { operator, value })
            }
            "competitor_visit" => {
                let competitor_id = reader.id("competitor_id");
                let timeframe_days = reader.count("timeframe_days", 1);
                competitor_id
                    .zip(timeframe_days)
                    .map(|(competitor_id, timeframe_days)| Self::CompetitorVisit {
                        competitor_id,
                        timeframe_days,
                    })
            }
            "feature_usage" => {
                let feature_name = reader.text("feature_name");
                let min_usage_count = reader.count("min_usage_count", 1);
                feature_name
                    .zip(min_usage_count)
                    .map(|(feature_name, min_usage_count)| Self::FeatureUsage {
                        feature_name,
                        min_usage_count,
                    })
            }
            "last_login" => reader
                .count("days_since_login", 1)
                .map(|days_since_login| Self::LastLogin { days_since_login }),
            _ => return None,
        };
        Some(reader.finish(config))
    }

    fn to_fields(&self) -> RawFields {
        let fields = RawFields::new();
        match self {
            Self::ChurnProbability { operator, value } => fields
                .with("operator", operator.as_str())
                .with("value", value.to_string()),
            Self::CompetitorVisit {
                competitor_id,
                timeframe_days,
            } => fields
                .with("competitor_id", competitor_id.to_string())
                .with("timeframe_days", timeframe_days.to_string()),
            Self::FeatureUsage {
                feature_name,
                min_usage_count,
            } => fields
                .with("feature_name", feature_name.clone())
                .with("min_usage_count", min_usage_count.to_string()),
            Self::LastLogin { days_since_login } => {
                fields.with("days_since_login", days_since_login.to_string())
            }
        }
    }
}

/// Validate the condition stage of a submission.
pub fn validate_condition(kind: &str, fields: &RawFields) -> Result<ConditionConfig, FieldErrors> {
    ConditionConfig::validate(kind, fields)
}
