// Workflow actions - what an automation does once its condition matches

use serde::{Deserialize, Serialize};

use super::StageConfig;
use super::error::{FieldErrors, Stage};
use super::fields::RawFields;
use super::reader::FieldReader;

/// Third-party delivery target, keyed by `service`.
///
/// Only Zapier is accepted; any other service value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ExternalAction {
    Zapier {
        event_name: String,
        payload_template: String,
    },
}

impl ExternalAction {
    pub const SERVICES: &'static [&'static str] = &["zapier"];

    pub fn service(&self) -> &'static str {
        match self {
            Self::Zapier { .. } => "zapier",
        }
    }

    /// Second-level validation: `service` decides which sibling fields are required.
    fn read(reader: &mut FieldReader<'_>) -> Option<Self> {
        let Some(service) = reader.optional("service") else {
            reader.missing("service");
            return None;
        };

        match service {
            "zapier" => {
                let event_name = reader.text("event_name");
                let payload_template = reader.text("payload_template");
                event_name
                    .zip(payload_template)
                    .map(|(event_name, payload_template)| Self::Zapier {
                        event_name,
                        payload_template,
                    })
            }
            other => {
                reader.unknown("service", other);
                None
            }
        }
    }

    fn write(&self, fields: &mut RawFields) {
        fields.insert("service", self.service());
        match self {
            Self::Zapier {
                event_name,
                payload_template,
            } => {
                fields.insert("event_name", event_name.clone());
                fields.insert("payload_template", payload_template.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    Email {
        template_id: i64,
    },
    Sms {
        /// Contact attribute holding the phone number.
        phone_field: String,
        message: String,
    },
    ChangeCohort {
        cohort_id: i64,
    },
    Notification {
        message: String,
    },
    External(ExternalAction),
}

impl ActionConfig {
    pub const KINDS: &'static [&'static str] =
        &["email", "sms", "change_cohort", "notification", "external"];
}

impl StageConfig for ActionConfig {
    const STAGE: Stage = Stage::Action;

    fn kind(&self) -> &'static str {
        match self {
            Self::Email { .. } => "email",
            Self::Sms { .. } => "sms",
            Self::ChangeCohort { .. } => "change_cohort",
            Self::Notification { .. } => "notification",
            Self::External(_) => "external",
        }
    }

    fn validate_known(kind: &str, fields: &RawFields) -> Option<Result<Self, FieldErrors>> {
        let mut reader = FieldReader::new(Stage::Action, fields);
        let config = match kind {
            "email" => reader
                .id("template_id")
                .map(|template_id| Self::Email { template_id }),
            "sms" => {
                let phone_field = reader.text("phone_field");
                let message = reader.text("message");
                phone_field
                    .zip(message)
                    .map(|(phone_field, message)| Self::Sms {
                        phone_field,
                        message,
                    })
            }
            "change_cohort" => reader
                .id("cohort_id")
                .map(|cohort_id| Self::ChangeCohort { cohort_id }),
            "notification" => reader
                .text("message")
                .map(|message| Self::Notification { message }),
            "external" => ExternalAction::read(&mut reader).map(Self::External),
            _ => return None,
        };
        Some(reader.finish(config))
    }

    fn to_fields(&self) -> RawFields {
        let mut fields = RawFields::new();
        match self {
            Self::Email { template_id } => fields.insert("template_id", template_id.to_string()),
            Self::Sms {
                phone_field,
                message,
            } => {
                fields.insert("phone_field", phone_field.clone());
                fields.insert("message", message.clone());
            }
            Self::ChangeCohort { cohort_id } => fields.insert("cohort_id", cohort_id.to_string()),
            Self::Notification { message } => fields.insert("message", message.clone()),
            Self::External(external) => external.write(&mut fields),
        }
        fields
    }
}

/// Validate the action stage of a submission.
pub fn validate_action(kind: &str, fields: &RawFields) -> Result<ActionConfig, FieldErrors> {
    ActionConfig::validate(kind, fields)
}
