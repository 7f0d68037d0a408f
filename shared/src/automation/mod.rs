// Automation workflow configuration
//
// A workflow has three stages: a source (which contacts), a condition (when)
// and an action (what happens). Each stage is one variant of a closed set,
// validated from raw form fields and persisted as an independent JSON blob.

pub mod action;
pub mod codec;
pub mod condition;
pub mod error;
pub mod fields;
pub mod schema;
pub mod source;

mod reader;

pub use action::{ActionConfig, ExternalAction, validate_action};
pub use codec::{DecodedStages, EncodedStages, decode, encode};
pub use condition::{ComparisonOperator, ConditionConfig, validate_condition};
pub use error::{Constraint, FieldError, FieldErrors, Stage};
pub use fields::{FieldValue, RawFields};
pub use schema::{FieldSchema, InputKind, StageSchema, VariantSchema};
pub use source::{SourceConfig, validate_source};

use serde::{Deserialize, Serialize};

/// Behaviour shared by the three stage configurations.
pub trait StageConfig: Sized + Serialize + serde::de::DeserializeOwned {
    const STAGE: Stage;

    /// The `type` discriminant of this variant.
    fn kind(&self) -> &'static str;

    /// Validate fields for a known kind. `None` when the kind is not a variant of this stage.
    fn validate_known(kind: &str, fields: &RawFields) -> Option<Result<Self, FieldErrors>>;

    /// Flatten back into the form fields that would produce this configuration.
    fn to_fields(&self) -> RawFields;

    /// Validate a stage: type present, then the variant's own fields.
    fn validate(kind: &str, fields: &RawFields) -> Result<Self, FieldErrors> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(FieldError::missing(Self::STAGE, "type").into());
        }
        Self::validate_known(kind, fields)
            .unwrap_or_else(|| Err(FieldError::unknown_variant(Self::STAGE, "type", kind).into()))
    }
}

/// One stage as submitted: the selected `type` plus its flat fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageForm {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub fields: RawFields,
}

impl StageForm {
    pub fn new(kind: impl Into<String>, fields: RawFields) -> Self {
        Self {
            kind: Some(kind.into()),
            fields,
        }
    }

    /// The form that re-renders an existing configuration.
    pub fn prefill<T: StageConfig>(config: &T) -> Self {
        Self::new(config.kind(), config.to_fields())
    }

    fn selected_kind(&self) -> Option<&str> {
        self.kind.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Where a stage stands after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageState<T> {
    Unselected,
    Selected {
        kind: String,
        result: Result<T, FieldErrors>,
    },
}

impl<T: StageConfig> StageState<T> {
    pub fn from_form(form: &StageForm) -> Self {
        match form.selected_kind() {
            None => Self::Unselected,
            Some(kind) => Self::Selected {
                kind: kind.to_string(),
                result: T::validate(kind, &form.fields),
            },
        }
    }

    /// The configuration, or every reason the stage cannot be saved.
    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            Self::Unselected => Err(FieldError::missing(T::STAGE, "type").into()),
            Self::Selected { result, .. } => result,
        }
    }
}

/// The three validated stages of a workflow, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStages {
    pub source: SourceConfig,
    pub condition: ConditionConfig,
    pub action: ActionConfig,
}

impl ValidatedStages {
    pub fn encode(&self) -> Result<EncodedStages, serde_json::Error> {
        encode(&self.source, &self.condition, &self.action)
    }
}

/// Validate all three stages, collecting every error before rejecting the submission.
pub fn validate_workflow(
    source: &StageForm,
    condition: &StageForm,
    action: &StageForm,
) -> Result<ValidatedStages, FieldErrors> {
    let source = StageState::<SourceConfig>::from_form(source).into_result();
    let condition = StageState::<ConditionConfig>::from_form(condition).into_result();
    let action = StageState::<ActionConfig>::from_form(action).into_result();

    match (source, condition, action) {
        (Ok(source), Ok(condition), Ok(action)) => Ok(ValidatedStages {
            source,
            condition,
            action,
        }),
        (source, condition, action) => {
            let mut errors = FieldErrors::new();
            for stage_errors in [source.err(), condition.err(), action.err()]
                .into_iter()
                .flatten()
            {
                errors.append(stage_errors);
            }
            Err(errors)
        }
    }
}
