// Validation errors for workflow stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three slots of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Source,
    Condition,
    Action,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Source, Stage::Condition, Stage::Action];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Condition => "condition",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule a submitted value failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    AtLeast { min: i64 },
    Between { min: i64, max: i64 },
    Integer,
    Number,
    OneOf { options: Vec<&'static str> },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast { min } => write!(f, "≥{}", min),
            Self::Between { min, max } => write!(f, "between {} and {}", min, max),
            Self::Integer => f.write_str("a whole number"),
            Self::Number => f.write_str("a number"),
            Self::OneOf { options } => write!(f, "one of: {}", options.join(", ")),
        }
    }
}

/// A single problem with a submitted stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{stage} {field} '{value}' is not supported")]
    UnknownVariant {
        stage: Stage,
        field: &'static str,
        value: String,
    },

    #[error("{stage} {field} is required")]
    MissingField { stage: Stage, field: &'static str },

    #[error("{stage} {field} must be {constraint}")]
    OutOfRange {
        stage: Stage,
        field: &'static str,
        constraint: Constraint,
    },
}

impl FieldError {
    pub fn unknown_variant(stage: Stage, field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            stage,
            field,
            value: value.into(),
        }
    }

    pub fn missing(stage: Stage, field: &'static str) -> Self {
        Self::MissingField { stage, field }
    }

    pub fn out_of_range(stage: Stage, field: &'static str, constraint: Constraint) -> Self {
        Self::OutOfRange {
            stage,
            field,
            constraint,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::UnknownVariant { stage, .. }
            | Self::MissingField { stage, .. }
            | Self::OutOfRange { stage, .. } => *stage,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::UnknownVariant { field, .. }
            | Self::MissingField { field, .. }
            | Self::OutOfRange { field, .. } => field,
        }
    }

    /// Dotted key used when reporting errors per form field, e.g. `condition.timeframe_days`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.stage(), self.field())
    }
}

/// Every problem found in a submission, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn append(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |e| e.stage() == stage)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}
