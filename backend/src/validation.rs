//! Request validation
//!
//! Collects every problem with a request before rejecting it, so a client
//! sees all of its field errors in a single response.

use churnlens_shared::automation::FieldErrors;

use crate::error::{ApiError, AppError, ValidationBuilder};

/// Validation result type
pub type ValidationResult<T> = Result<T, AppError>;

/// Longest name accepted for an automation.
pub const NAME_MAX_LENGTH: usize = 255;

/// Enum validation
pub mod enums {
    use super::*;

    /// Validate value is one of allowed options
    pub fn one_of(value: &str, field: &str, allowed: &[&str]) -> ValidationResult<String> {
        let lower = value.trim().to_lowercase();
        if allowed.iter().any(|a| a.eq_ignore_ascii_case(&lower)) {
            Ok(lower)
        } else {
            Err(ApiError::validation_single(
                field,
                format!("{} must be one of: {}", field, allowed.join(", ")),
            ))
        }
    }

    /// Validate optional enum value
    pub fn one_of_optional(
        value: &Option<String>,
        field: &str,
        allowed: &[&str],
    ) -> ValidationResult<Option<String>> {
        match value {
            Some(v) => Ok(Some(one_of(v, field, allowed)?)),
            None => Ok(None),
        }
    }
}

/// Validator builder for complex validations
#[derive(Debug, Default)]
pub struct Validator {
    builder: ValidationBuilder,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add error for a field
    pub fn error(mut self, field: &str, message: &str) -> Self {
        self.builder = self.builder.error(field, message);
        self
    }

    /// Validate required string
    pub fn required_string(self, value: &Option<String>, field: &str) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => self,
            Some(_) => self.error(field, &format!("{} cannot be empty", field)),
            None => self.error(field, &format!("{} is required", field)),
        }
    }

    /// Validate max length
    pub fn max_length(self, value: &Option<String>, field: &str, max: usize) -> Self {
        match value {
            Some(s) if s.trim().chars().count() > max => {
                self.error(field, &format!("{} must be {} characters or less", field, max))
            }
            _ => self,
        }
    }

    /// Merge errors reported by the workflow stage validators.
    pub fn field_errors(mut self, errors: &FieldErrors) -> Self {
        self.builder = self.builder.field_errors(errors);
        self
    }

    /// Finish validation, returning error if any
    pub fn finish(self) -> ValidationResult<()> {
        match self.builder.build() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
