// Workflow source - which contacts an automation watches

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::StageConfig;
use super::error::{FieldErrors, Stage};
use super::fields::RawFields;
use super::reader::FieldReader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Stream { stream_id: i64 },
    Cohort { cohort_id: i64 },
    Contact { contact_ids: BTreeSet<i64> },
}

impl SourceConfig {
    pub const KINDS: &'static [&'static str] = &["stream", "cohort", "contact"];
}

impl StageConfig for SourceConfig {
    const STAGE: Stage = Stage::Source;

    fn kind(&self) -> &'static str {
        match self {
            Self::Stream { .. } => "stream",
            Self::Cohort { .. } => "cohort",
            Self::Contact { .. } => "contact",
        }
    }

    fn validate_known(kind: &str, fields: &RawFields) -> Option<Result<Self, FieldErrors>> {
        let mut reader = FieldReader::new(Stage::Source, fields);
        let config = match kind {
            "stream" => reader.id("stream_id").map(|stream_id| Self::Stream { stream_id }),
            "cohort" => reader.id("cohort_id").map(|cohort_id| Self::Cohort { cohort_id }),
            "contact" => reader
                .ids("contact_id", &["contact_ids"])
                .map(|contact_ids| Self::Contact { contact_ids }),
            _ => return None,
        };
        Some(reader.finish(config))
    }

    fn to_fields(&self) -> RawFields {
        let mut fields = RawFields::new();
        match self {
            Self::Stream { stream_id } => fields.insert("stream_id", stream_id.to_string()),
            Self::Cohort { cohort_id } => fields.insert("cohort_id", cohort_id.to_string()),
            Self::Contact { contact_ids } => {
                fields.insert_list("contact_id", contact_ids.iter().map(|id| id.to_string()))
            }
        }
        fields
    }
}

/// Validate the source stage of a submission.
pub fn validate_source(kind: &str, fields: &RawFields) -> Result<SourceConfig, FieldErrors> {
    SourceConfig::validate(kind, fields)
}
