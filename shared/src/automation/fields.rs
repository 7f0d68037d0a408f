// Raw form fields - the flat key/value input of one workflow stage

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A value as it is stored after normalization: forms post strings, multi-selects
/// post lists of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

/// A single submitted scalar. JSON clients may send numbers or booleans where
/// an HTML form would send text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Submitted {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl From<Submitted> for FieldValue {
    fn from(value: Submitted) -> Self {
        match value {
            Submitted::One(s) => FieldValue::Single(s.into_text()),
            Submitted::Many(items) => {
                FieldValue::List(items.into_iter().map(Scalar::into_text).collect())
            }
        }
    }
}

/// Flat key/value input for one stage, keyed by stage-specific field names.
///
/// Blank values are treated as absent by every accessor. Keys posted in the
/// `name[]` multi-select convention are stored under `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawFields {
    values: BTreeMap<String, FieldValue>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from form-style pairs. Repeated keys and `name[]` keys collect into a list.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let (name, is_list) = match key.strip_suffix("[]") {
                Some(name) => (name, true),
                None => (key, false),
            };
            let value = value.into();

            match fields.values.remove(name) {
                None if is_list => {
                    fields.values.insert(name.to_string(), FieldValue::List(vec![value]));
                }
                None => {
                    fields.values.insert(name.to_string(), FieldValue::Single(value));
                }
                Some(FieldValue::Single(first)) => {
                    fields
                        .values
                        .insert(name.to_string(), FieldValue::List(vec![first, value]));
                }
                Some(FieldValue::List(mut items)) => {
                    items.push(value);
                    fields.values.insert(name.to_string(), FieldValue::List(items));
                }
            }
        }
        fields
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(normalize_key(name.into()), FieldValue::Single(value.into()));
    }

    pub fn insert_list<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.values.insert(
            normalize_key(name.into()),
            FieldValue::List(values.into_iter().map(Into::into).collect()),
        );
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// First non-blank value of a field, trimmed.
    pub fn single(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Single(s) => non_blank(s),
            FieldValue::List(items) => items.iter().find_map(|s| non_blank(s)),
        }
    }

    /// Every non-blank value of a field, trimmed.
    pub fn list(&self, name: &str) -> Vec<&str> {
        match self.values.get(name) {
            Some(FieldValue::Single(s)) => non_blank(s).into_iter().collect(),
            Some(FieldValue::List(items)) => items.iter().filter_map(|s| non_blank(s)).collect(),
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn normalize_key(key: String) -> String {
    match key.strip_suffix("[]") {
        Some(name) => name.to_string(),
        None => key,
    }
}

impl FromIterator<(String, FieldValue)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (normalize_key(k), v))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for RawFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let submitted = BTreeMap::<String, Option<Submitted>>::deserialize(deserializer)?;
        Ok(submitted
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, FieldValue::from(v))))
            .collect())
    }
}
