// Field reader - pulls typed values out of raw fields, accumulating errors

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;

use super::error::{Constraint, FieldError, FieldErrors, Stage};
use super::fields::RawFields;

/// Reads the fields of one stage. Every accessor returns `None` on failure and
/// records why, so a variant's fields are all checked before the stage is rejected.
pub(crate) struct FieldReader<'a> {
    stage: Stage,
    fields: &'a RawFields,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(stage: Stage, fields: &'a RawFields) -> Self {
        Self {
            stage,
            fields,
            errors: FieldErrors::new(),
        }
    }

    pub fn missing(&mut self, field: &'static str) {
        self.errors.push(FieldError::missing(self.stage, field));
    }

    pub fn unknown(&mut self, field: &'static str, value: &str) {
        self.errors
            .push(FieldError::unknown_variant(self.stage, field, value));
    }

    fn out_of_range(&mut self, field: &'static str, constraint: Constraint) {
        self.errors
            .push(FieldError::out_of_range(self.stage, field, constraint));
    }

    /// A value that may legitimately be absent; records nothing.
    pub fn optional(&self, field: &'static str) -> Option<&'a str> {
        self.fields.single(field)
    }

    /// Required non-empty text.
    pub fn text(&mut self, field: &'static str) -> Option<String> {
        match self.fields.single(field) {
            Some(s) => Some(s.to_string()),
            None => {
                self.missing(field);
                None
            }
        }
    }

    /// Required reference to another record.
    pub fn id(&mut self, field: &'static str) -> Option<i64> {
        let raw = self.required(field)?;
        match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.out_of_range(field, Constraint::Integer);
                None
            }
        }
    }

    /// Required multi-select of references; an empty selection is missing.
    /// The first non-empty of `field` and its `aliases` is read, and errors
    /// are always reported against `field`.
    pub fn ids(&mut self, field: &'static str, aliases: &[&str]) -> Option<BTreeSet<i64>> {
        let fields = self.fields;
        let values = std::iter::once(field)
            .chain(aliases.iter().copied())
            .map(|key| fields.list(key))
            .find(|values| !values.is_empty())
            .unwrap_or_default();
        if values.is_empty() {
            self.missing(field);
            return None;
        }

        let parsed: Result<BTreeSet<i64>, _> = values.iter().map(|v| v.parse::<i64>()).collect();
        match parsed {
            Ok(ids) => Some(ids),
            Err(_) => {
                self.out_of_range(field, Constraint::Integer);
                None
            }
        }
    }

    /// Required whole number with a lower bound.
    pub fn count(&mut self, field: &'static str, min: i64) -> Option<u32> {
        let raw = self.required(field)?;
        let Ok(n) = raw.parse::<i64>() else {
            self.out_of_range(field, Constraint::Integer);
            return None;
        };
        if n < min {
            self.out_of_range(field, Constraint::AtLeast { min });
            return None;
        }
        match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                self.out_of_range(field, Constraint::Integer);
                None
            }
        }
    }

    /// Required decimal within an inclusive range.
    pub fn decimal(&mut self, field: &'static str, min: i64, max: i64) -> Option<Decimal> {
        let raw = self.required(field)?;
        let Ok(value) = Decimal::from_str(raw) else {
            self.out_of_range(field, Constraint::Number);
            return None;
        };
        if value < Decimal::from(min) || value > Decimal::from(max) {
            self.out_of_range(field, Constraint::Between { min, max });
            return None;
        }
        Some(value)
    }

    /// Required value from a closed set of options.
    pub fn choice<T: FromStr>(
        &mut self,
        field: &'static str,
        options: &[&'static str],
    ) -> Option<T> {
        let raw = self.required(field)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.out_of_range(
                    field,
                    Constraint::OneOf {
                        options: options.to_vec(),
                    },
                );
                None
            }
        }
    }

    fn required(&mut self, field: &'static str) -> Option<&'a str> {
        let value = self.fields.single(field);
        if value.is_none() {
            self.missing(field);
        }
        value
    }

    /// Settle the stage: the built value if nothing was recorded, otherwise every error.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, FieldErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}
