// Blob encoding - each stage is stored as its own JSON document

use serde::{Deserialize, Serialize};

use super::{ActionConfig, ConditionConfig, SourceConfig, StageConfig};

/// The persisted form of a workflow's three stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedStages {
    pub source: String,
    pub condition: String,
    pub action: String,
}

/// Stages read back from storage. `None` means the blob was not recognised and
/// the stage should be shown as unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedStages {
    pub source: Option<SourceConfig>,
    pub condition: Option<ConditionConfig>,
    pub action: Option<ActionConfig>,
}

impl DecodedStages {
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.condition.is_some() && self.action.is_some()
    }
}

pub fn encode(
    source: &SourceConfig,
    condition: &ConditionConfig,
    action: &ActionConfig,
) -> Result<EncodedStages, serde_json::Error> {
    Ok(EncodedStages {
        source: encode_stage(source)?,
        condition: encode_stage(condition)?,
        action: encode_stage(action)?,
    })
}

pub fn encode_stage<T: StageConfig>(config: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(config)
}

pub fn decode(source: &str, condition: &str, action: &str) -> DecodedStages {
    DecodedStages {
        source: decode_stage(source),
        condition: decode_stage(condition),
        action: decode_stage(action),
    }
}

/// Decode one stage blob. Malformed JSON, unknown variants, missing fields and
/// values the validators would reject all yield `None`.
pub fn decode_stage<T: StageConfig>(blob: &str) -> Option<T> {
    let parsed: T = serde_json::from_str(blob).ok()?;
    T::validate(parsed.kind(), &parsed.to_fields()).ok()
}
