//! Tolerant numeric amounts (price and mileage).
//!
//! Current records store price and mileage as JSON numbers. Older records were
//! written straight from the form and hold display text such as `"R$ 89.900"`
//! or `"45.000 km"`. [`Amount`] keeps both shapes so a legacy row never fails
//! to load, and offers best-effort parsing of the text variant.
//!
//! # Parsing rules (pt-BR)
//!
//! 1. Unit markers are removed (`R$`/`R`/`$` for prices, `km`/`k`/`m` for
//!    mileage) together with all whitespace.
//! 2. If a `,` is present it is the decimal separator and every `.` is a
//!    thousands separator.
//! 3. Otherwise several `.` are thousands separators; a single `.` followed by
//!    exactly three digits is a thousands separator too (`"89.900"`), any other
//!    single `.` is a decimal point (`"89900.50"`).

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing an amount from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Nothing numeric was left after removing unit markers.
    #[error("amount cannot be empty")]
    Empty,
    /// The remaining text is not a number.
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
}

/// Which unit markers to strip when parsing legacy text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    /// Currency amount (`R$ 89.900,00`).
    Price,
    /// Distance in kilometres (`45.000 km`).
    Mileage,
}

impl AmountKind {
    fn is_marker(self, c: char) -> bool {
        match self {
            Self::Price => matches!(c, 'R' | 'r' | '$'),
            Self::Mileage => matches!(c, 'K' | 'k' | 'M' | 'm'),
        }
    }
}

/// A stored price or mileage value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    /// A numeric value (the current storage format).
    Number(Decimal),
    /// Display text written by older versions of the admin form.
    Legacy(String),
}

impl Amount {
    /// Parse free text into a number using the pt-BR rules described in the
    /// module documentation.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Empty`] when no digits remain and
    /// [`AmountError::NotANumber`] when the cleaned text does not parse.
    pub fn parse(text: &str, kind: AmountKind) -> Result<Decimal, AmountError> {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && !kind.is_marker(*c))
            .collect();

        if cleaned.is_empty() {
            return Err(AmountError::Empty);
        }

        let normalized = if cleaned.contains(',') {
            cleaned.replace('.', "").replacen(',', ".", 1)
        } else {
            match cleaned.matches('.').count() {
                0 => cleaned.clone(),
                1 => {
                    let decimals = cleaned.rsplit('.').next().map_or(0, str::len);
                    if decimals == 3 {
                        cleaned.replace('.', "")
                    } else {
                        cleaned.clone()
                    }
                }
                _ => cleaned.replace('.', ""),
            }
        };

        Decimal::from_str(&normalized).map_err(|_| AmountError::NotANumber(text.trim().to_owned()))
    }

    /// The numeric value, parsing legacy text on demand.
    ///
    /// Returns `None` for legacy text that cannot be parsed.
    #[must_use]
    pub fn value(&self, kind: AmountKind) -> Option<Decimal> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Legacy(text) => Self::parse(text, kind).ok(),
        }
    }

    /// The text shown in the editing form.
    ///
    /// Numbers are written without grouping so that saving the form again
    /// yields the same value; legacy text is shown as stored.
    #[must_use]
    pub fn to_form_text(&self) -> String {
        match self {
            Self::Number(value) => value.normalize().to_string(),
            Self::Legacy(text) => text.clone(),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(value) => {
                let value = value.normalize();
                if value.fract().is_zero() {
                    if let Some(whole) = value.to_i64() {
                        return serializer.serialize_i64(whole);
                    }
                }
                match value.to_f64() {
                    Some(float) => serializer.serialize_f64(float),
                    None => serializer.serialize_str(&value.to_string()),
                }
            }
            Self::Legacy(text) => serializer.serialize_str(text),
        }
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a formatted amount string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount::Number(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount::Number(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Decimal::try_from(v)
            .map(Amount::Number)
            .map_err(|_| E::custom(format!("{v} is out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        // Plain numeric text (e.g. a numeric column read as text) is a number.
        Ok(Decimal::from_str(v.trim())
            .map_or_else(|_| Amount::Legacy(v.to_owned()), Amount::Number))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(text: &str) -> Decimal {
        Amount::parse(text, AmountKind::Price).unwrap()
    }

    #[test]
    fn test_parse_formatted_price() {
        assert_eq!(price("R$ 89.900"), Decimal::from(89_900));
        assert_eq!(price("R$ 89.900,50"), Decimal::new(8_990_050, 2));
        assert_eq!(price("1.234.567"), Decimal::from(1_234_567));
    }

    #[test]
    fn test_parse_plain_decimal_point() {
        assert_eq!(price("89900.5"), Decimal::new(899_005, 1));
        assert_eq!(price("89900"), Decimal::from(89_900));
    }

    #[test]
    fn test_parse_mileage_units() {
        let km = Amount::parse("45.000 km", AmountKind::Mileage).unwrap();
        assert_eq!(km, Decimal::from(45_000));
        let km = Amount::parse("32000KM", AmountKind::Mileage).unwrap();
        assert_eq!(km, Decimal::from(32_000));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Amount::parse("R$ ", AmountKind::Price), Err(AmountError::Empty));
        assert!(matches!(
            Amount::parse("sob consulta", AmountKind::Price),
            Err(AmountError::NotANumber(_))
        ));
    }

    #[test]
    fn test_deserialize_number_and_legacy_text() {
        let amount: Amount = serde_json::from_str("89900").unwrap();
        assert_eq!(amount, Amount::Number(Decimal::from(89_900)));

        let amount: Amount = serde_json::from_str("\"R$ 89.900\"").unwrap();
        assert_eq!(amount, Amount::Legacy("R$ 89.900".to_string()));
        assert_eq!(amount.value(AmountKind::Price), Some(Decimal::from(89_900)));

        let amount: Amount = serde_json::from_str("\"95500.00\"").unwrap();
        assert_eq!(amount.value(AmountKind::Price), Some(Decimal::new(9_550_000, 2)));
    }

    #[test]
    fn test_serialize_as_json_number() {
        let json = serde_json::to_string(&Amount::from(89_900)).unwrap();
        assert_eq!(json, "89900");

        let json = serde_json::to_string(&Amount::Number(Decimal::new(8_990_050, 2))).unwrap();
        assert_eq!(json, "89900.5");
    }

    #[test]
    fn test_form_text_round_trips() {
        let amount = Amount::Number(Decimal::new(8_990_000, 2));
        let text = amount.to_form_text();
        assert_eq!(text, "89900");
        assert_eq!(price(&text), Decimal::from(89_900));
    }
}
