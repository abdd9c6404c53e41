//! Vehicle record identifier.
//!
//! The backend assigns identifiers on insert. Depending on the table schema
//! they arrive as JSON numbers (`bigint` keys, and the static sample
//! catalogue) or strings (`uuid` keys), so [`VehicleId`] keeps the key as
//! opaque text and accepts either shape when deserializing.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, immutable identifier of a vehicle record.
///
/// # Example
///
/// ```rust
/// # use linha_verde_core::VehicleId;
/// let id: VehicleId = serde_json::from_str("42").unwrap();
/// assert_eq!(id.as_str(), "42");
///
/// let id: VehicleId = serde_json::from_str("\"b7a1\"").unwrap();
/// assert_eq!(id, VehicleId::new("b7a1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    /// Create an ID from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying key as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for VehicleId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for VehicleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

struct VehicleIdVisitor;

impl Visitor<'_> for VehicleIdVisitor {
    type Value = VehicleId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a vehicle identifier (string or integer)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.is_empty() {
            return Err(E::custom("vehicle identifier cannot be empty"));
        }
        Ok(VehicleId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(VehicleId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(VehicleId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for VehicleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VehicleIdVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_integer_key() {
        let id: VehicleId = serde_json::from_str("7").unwrap();
        assert_eq!(id.as_str(), "7");
    }

    #[test]
    fn test_deserialize_uuid_key() {
        let id: VehicleId =
            serde_json::from_str("\"0b6f2c1e-8a8e-4c5e-9d3c-6c1f7d0b9a11\"").unwrap();
        assert_eq!(id.as_str(), "0b6f2c1e-8a8e-4c5e-9d3c-6c1f7d0b9a11");
    }

    #[test]
    fn test_deserialize_empty_string_rejected() {
        assert!(serde_json::from_str::<VehicleId>("\"\"").is_err());
    }

    #[test]
    fn test_serializes_as_text() {
        let json = serde_json::to_string(&VehicleId::from(12)).unwrap();
        assert_eq!(json, "\"12\"");
    }
}
