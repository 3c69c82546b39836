//! Raw Input Records and Payload Shape

use crate::error::PreprocessError;
use crate::features::Feature;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Caller-supplied field values for one employee, before encoding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, Value>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from URL query parameters.
    ///
    /// Only canonical feature names are kept, empty values are skipped and
    /// the first occurrence of a repeated name wins. Values stay textual;
    /// numeric conversion happens during preprocessing so a malformed number
    /// is reported like any other bad field.
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if value.is_empty() || Feature::from_name(key).is_none() || record.contains(key) {
                continue;
            }
            record.insert(key, value);
        }
        record
    }

    /// Numeric field value, `None` when absent
    pub(crate) fn number(&self, field: &'static str) -> Result<Option<f64>, PreprocessError> {
        let Some(value) = self.fields.get(field) else {
            return Ok(None);
        };
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or(PreprocessError::InvalidValue { field, kind: "number" }),
            Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                PreprocessError::MalformedNumber {
                    field,
                    value: s.clone(),
                }
            }),
            other => Err(PreprocessError::InvalidValue {
                field,
                kind: json_kind(other),
            }),
        }
    }

    /// Numeric field value that must be present
    pub(crate) fn required_number(&self, field: &'static str) -> Result<f64, PreprocessError> {
        self.number(field)?.ok_or(PreprocessError::MissingField(field))
    }

    /// Categorical field value, encoded through `lookup`
    pub(crate) fn category<C>(
        &self,
        field: &'static str,
        lookup: impl Fn(&str) -> Option<C>,
    ) -> Result<C, PreprocessError> {
        let value = self
            .fields
            .get(field)
            .ok_or(PreprocessError::MissingField(field))?;
        let found = match value {
            Value::String(s) => lookup(s),
            _ => None,
        };
        found.ok_or_else(|| PreprocessError::UnknownCategory {
            field,
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One item or an ordered batch of items.
///
/// The shape of a request is resolved once at ingestion and carried
/// through preprocessing and inference so the response mirrors it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Single(T),
    Batch(Vec<T>),
}

impl<T> Payload<T> {
    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Items as a slice, one element for `Single`
    pub fn as_slice(&self) -> &[T] {
        match self {
            Payload::Single(item) => std::slice::from_ref(item),
            Payload::Batch(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Payload::Single(item) => vec![item],
            Payload::Batch(items) => items,
        }
    }

    /// Rebuild a payload of the same shape from row-aligned results.
    ///
    /// Returns `None` if `rows` does not have exactly `self.len()` items.
    pub fn with_rows<U>(&self, rows: Vec<U>) -> Option<Payload<U>> {
        if rows.len() != self.len() {
            return None;
        }
        match self {
            Payload::Single(_) => rows.into_iter().next().map(Payload::Single),
            Payload::Batch(_) => Some(Payload::Batch(rows)),
        }
    }
}

impl Payload<RawRecord> {
    /// Resolve a decoded JSON body into a single record or a batch
    pub fn from_json(value: Value) -> Result<Self, PreprocessError> {
        match value {
            Value::Object(map) => Ok(Payload::Single(map.into())),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(map) => Ok(RawRecord::from(map)),
                    other => Err(PreprocessError::InvalidPayload(format!(
                        "item {index} is a {}, expected an object",
                        json_kind(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Payload::Batch),
            other => Err(PreprocessError::InvalidPayload(format!(
                "expected an object or a list of objects, got a {}",
                json_kind(&other)
            ))),
        }
    }
}
