//! The vehicle editing form and its validation.
//!
//! The admin editor holds every field as raw text so a failed submission can
//! be shown again exactly as typed. [`VehicleForm::validate`] turns the text
//! into typed [`VehicleFields`] without touching the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    Amount, AmountKind, Features, Specifications, SpecificationsError, Vehicle, VehicleFields,
};

/// Errors that block a submission before any backend call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("O campo '{0}' é obrigatório")]
    MissingField(&'static str),
    /// The year is not an integer.
    #[error("Ano inválido: '{0}'")]
    InvalidYear(String),
    /// The price or mileage is not a number.
    #[error("{field} inválido: '{value}'")]
    InvalidAmount { field: &'static str, value: String },
    /// The specifications text is not a JSON object of scalars.
    #[error(transparent)]
    Specifications(#[from] SpecificationsError),
}

/// Raw text of the editing form, one string per input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleForm {
    pub name: String,
    pub year: String,
    pub price: String,
    pub mileage: String,
    pub fuel: String,
    pub transmission: String,
    pub engine: String,
    pub color: String,
    pub doors: String,
    pub description: String,
    /// One equipment item per line.
    pub features: String,
    /// JSON object text.
    pub specifications: String,
}

impl VehicleForm {
    /// Pre-fill the form from a stored record.
    ///
    /// Features are joined with newlines and specifications pretty-printed,
    /// so submitting the form unchanged writes the same values back.
    #[must_use]
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            name: vehicle.name.clone(),
            year: vehicle.year.to_string(),
            price: vehicle.price.as_ref().map(Amount::to_form_text).unwrap_or_default(),
            mileage: vehicle.mileage.as_ref().map(Amount::to_form_text).unwrap_or_default(),
            fuel: vehicle.fuel.clone().unwrap_or_default(),
            transmission: vehicle.transmission.clone().unwrap_or_default(),
            engine: vehicle.engine.clone().unwrap_or_default(),
            color: vehicle.color.clone().unwrap_or_default(),
            doors: vehicle.doors.clone().unwrap_or_default(),
            description: vehicle.description.clone().unwrap_or_default(),
            features: vehicle.features.to_text(),
            specifications: if vehicle.specifications.is_empty() {
                String::new()
            } else {
                vehicle.specifications.to_text()
            },
        }
    }

    /// Validate the form into the columns written to the backend.
    ///
    /// Price and mileage are normalized to numbers here, so formatted input
    /// like `R$ 89.900` is stored as `89900`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking required fields
    /// first.
    pub fn validate(&self) -> Result<VehicleFields, ValidationError> {
        let name = required(&self.name, "Nome do Modelo")?;
        let year_text = required(&self.year, "Ano")?;
        let price_text = required(&self.price, "Preço")?;
        let mileage_text = required(&self.mileage, "Quilometragem")?;

        let year = year_text
            .parse::<i32>()
            .map_err(|_| ValidationError::InvalidYear(year_text.to_owned()))?;
        let price = parse_amount(price_text, AmountKind::Price, "Preço")?;
        let mileage = parse_amount(mileage_text, AmountKind::Mileage, "Quilometragem")?;

        let specifications = Specifications::from_text(&self.specifications)?;

        Ok(VehicleFields {
            name: name.to_owned(),
            year,
            price: Amount::Number(price),
            mileage: Amount::Number(mileage),
            fuel: optional(&self.fuel),
            transmission: optional(&self.transmission),
            engine: optional(&self.engine),
            color: optional(&self.color),
            doors: optional(&self.doors),
            description: optional(&self.description),
            features: Features::from_text(&self.features),
            specifications,
        })
    }
}

fn required<'a>(value: &'a str, label: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(label))
    } else {
        Ok(value)
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn parse_amount(
    text: &str,
    kind: AmountKind,
    field: &'static str,
) -> Result<Decimal, ValidationError> {
    Amount::parse(text, kind).map_err(|_| ValidationError::InvalidAmount {
        field,
        value: text.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::VehicleId;

    fn filled_form() -> VehicleForm {
        VehicleForm {
            name: "  Toyota Corolla XEI ".to_string(),
            year: "2021".to_string(),
            price: "R$ 95.500".to_string(),
            mileage: "32.000 km".to_string(),
            fuel: "Flex".to_string(),
            transmission: String::new(),
            features: "Carregador wireless\n\nFaróis automáticos\n".to_string(),
            specifications: "{\"Motor\": \"2.0 16V\", \"Tanque\": \"50 litros\"}".to_string(),
            ..VehicleForm::default()
        }
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let fields = filled_form().validate().unwrap();
        assert_eq!(fields.name, "Toyota Corolla XEI");
        assert_eq!(fields.year, 2021);
        assert_eq!(fields.price, Amount::Number(Decimal::from(95_500)));
        assert_eq!(fields.mileage, Amount::Number(Decimal::from(32_000)));
        assert_eq!(fields.fuel.as_deref(), Some("Flex"));
        assert_eq!(fields.transmission, None);
        assert_eq!(
            fields.features.as_slice(),
            ["Carregador wireless", "Faróis automáticos"]
        );
        assert_eq!(fields.specifications.get("Tanque"), Some("50 litros"));
    }

    #[test]
    fn test_required_fields() {
        let form = VehicleForm {
            name: "   ".to_string(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField("Nome do Modelo"))
        );

        let form = VehicleForm {
            mileage: String::new(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField("Quilometragem"))
        );
    }

    #[test]
    fn test_invalid_year_and_price() {
        let form = VehicleForm {
            year: "dois mil".to_string(),
            ..filled_form()
        };
        assert!(matches!(form.validate(), Err(ValidationError::InvalidYear(_))));

        let form = VehicleForm {
            price: "a combinar".to_string(),
            ..filled_form()
        };
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidAmount { field: "Preço", .. })
        ));
    }

    #[test]
    fn test_malformed_specifications() {
        let form = VehicleForm {
            specifications: "{invalid json".to_string(),
            ..filled_form()
        };
        let err = form.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Specifications(SpecificationsError::Malformed(_))
        ));
        assert!(err.to_string().starts_with("JSON inválido"));
    }

    #[test]
    fn test_blank_specifications_is_empty_mapping() {
        let form = VehicleForm {
            specifications: "  ".to_string(),
            ..filled_form()
        };
        assert!(form.validate().unwrap().specifications.is_empty());
    }

    #[test]
    fn test_form_from_vehicle_round_trips() {
        let fields = filled_form().validate().unwrap();
        let vehicle = Vehicle::from_fields(VehicleId::from(2), fields.clone(), None);

        let form = VehicleForm::from_vehicle(&vehicle);
        assert_eq!(form.price, "95500");
        assert_eq!(form.features, "Carregador wireless\nFaróis automáticos");
        assert!(form.specifications.starts_with("{\n  \"Motor\""));
        assert_eq!(form.validate().unwrap(), fields);
    }
}
