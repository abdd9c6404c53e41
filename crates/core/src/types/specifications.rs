//! Technical specification sheet ("Especificações Técnicas").
//!
//! An ordered mapping of label to text, stored as a JSON object and edited as
//! JSON text. Parsing the edited text is strict (anything but an object of
//! scalars is rejected) while reading stored rows is lenient, since older rows
//! may carry numbers or nested values.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Errors raised when parsing the specification text of the editing form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecificationsError {
    /// The text is not valid JSON.
    #[error("JSON inválido nas especificações: {0}")]
    Malformed(String),
    /// The JSON is valid but not an object.
    #[error("As especificações devem ser um objeto JSON, ex.: {{\"Motor\": \"2.0 16V\"}}")]
    NotAnObject,
    /// A value is an object, array or null.
    #[error("O valor da especificação '{0}' deve ser texto ou número")]
    NonTextValue(String),
}

/// Ordered label -> value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Specifications(IndexMap<String, String>);

impl Specifications {
    /// Create a mapping from label/value pairs, keeping their order.
    #[must_use]
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parse the editing representation. Blank text is an empty mapping.
    ///
    /// Numbers and booleans are accepted and kept as their JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of scalar values.
    pub fn from_text(text: &str) -> Result<Self, SpecificationsError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_str(text).map_err(|e| SpecificationsError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(SpecificationsError::NotAnObject);
        }

        // Parse again into an ordered map; `Value` objects do not keep key order.
        let object: IndexMap<String, Value> =
            serde_json::from_str(text).map_err(|e| SpecificationsError::Malformed(e.to_string()))?;

        let mut entries = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            let text = scalar_text(&value).ok_or_else(|| SpecificationsError::NonTextValue(key.clone()))?;
            entries.insert(key, text);
        }

        Ok(Self(entries))
    }

    /// The editing representation: pretty-printed JSON with two-space indent.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    /// Look up a value by label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(label, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSpecifications {
    Object(IndexMap<String, Value>),
    Other(Value),
}

// Stored rows: NULL or non-object reads as empty, nested values keep their
// JSON text.
impl<'de> Deserialize<'de> for Specifications {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let StoredSpecifications::Object(object) = StoredSpecifications::deserialize(deserializer)?
        else {
            return Ok(Self::default());
        };

        Ok(Self(
            object
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let text = scalar_text(&v).unwrap_or_else(|| v.to_string());
                    (k, text)
                })
                .collect(),
        ))
    }
}
