//! Vehicle record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Amount, Features, Specifications, VehicleId};
use crate::format::{format_mileage, format_price};

/// A vehicle listed in the inventory.
///
/// Every field except `id`, `name` and `year` is tolerant of missing or NULL
/// columns so that rows written by older versions still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Backend-assigned key.
    pub id: VehicleId,
    /// Model name, e.g. "Honda Civic EXL".
    pub name: String,
    /// Model year.
    pub year: i32,
    /// Price in BRL.
    #[serde(default)]
    pub price: Option<Amount>,
    /// Odometer reading in kilometres.
    #[serde(default)]
    pub mileage: Option<Amount>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub doors: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub specifications: Specifications,
    /// Public image URLs; index 0 is the cover.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    /// Single image URL written by the first version of the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Vehicle {
    /// Build a record from validated fields, as the backend would return it
    /// after an insert.
    #[must_use]
    pub fn from_fields(id: VehicleId, fields: VehicleFields, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            name: fields.name,
            year: fields.year,
            price: Some(fields.price),
            mileage: Some(fields.mileage),
            fuel: fields.fuel,
            transmission: fields.transmission,
            engine: fields.engine,
            color: fields.color,
            doors: fields.doors,
            description: fields.description,
            features: fields.features,
            specifications: fields.specifications,
            images: Vec::new(),
            image: None,
            created_at,
        }
    }

    /// Apply a partial update. Only the columns carried by the patch change.
    pub fn apply_patch(&mut self, patch: &VehiclePatch) {
        match patch {
            VehiclePatch::Fields(fields) => {
                let fields = fields.clone();
                self.name = fields.name;
                self.year = fields.year;
                self.price = Some(fields.price);
                self.mileage = Some(fields.mileage);
                self.fuel = fields.fuel;
                self.transmission = fields.transmission;
                self.engine = fields.engine;
                self.color = fields.color;
                self.doors = fields.doors;
                self.description = fields.description;
                self.features = fields.features;
                self.specifications = fields.specifications;
            }
            VehiclePatch::Images { images } => self.images.clone_from(images),
        }
    }

    /// The image shown on catalogue cards and list rows.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.image_at(0)
    }

    /// The gallery image at `index`, or `None` when out of range.
    ///
    /// Records without `images` expose the legacy `image` as their only entry.
    #[must_use]
    pub fn image_at(&self, index: usize) -> Option<&str> {
        self.gallery().get(index).copied()
    }

    /// All gallery images in display order.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        if self.images.is_empty() {
            self.image.as_deref().into_iter().collect()
        } else {
            self.images.iter().map(String::as_str).collect()
        }
    }

    /// Price formatted for display, e.g. `R$ 89.900,00`.
    #[must_use]
    pub fn price_display(&self) -> String {
        format_price(self.price.as_ref())
    }

    /// Mileage formatted for display, e.g. `45.000 km`.
    #[must_use]
    pub fn mileage_display(&self) -> String {
        format_mileage(self.mileage.as_ref())
    }
}

/// The editable columns of a vehicle, as written by the admin form.
///
/// Carries neither the identifier nor the images: the id is assigned by the
/// backend and images are attached by a separate update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleFields {
    pub name: String,
    pub year: i32,
    pub price: Amount,
    pub mileage: Amount,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub engine: Option<String>,
    pub color: Option<String>,
    pub doors: Option<String>,
    pub description: Option<String>,
    pub features: Features,
    pub specifications: Specifications,
}

/// A partial update of a vehicle row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VehiclePatch {
    /// Overwrite every editable column; images are left alone.
    Fields(VehicleFields),
    /// Replace the image list.
    Images { images: Vec<String> },
}

impl VehiclePatch {
    /// Returns `true` when the patch writes the `images` column.
    #[must_use]
    pub const fn touches_images(&self) -> bool {
        matches!(self, Self::Images { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_fields() -> VehicleFields {
        VehicleFields {
            name: "Honda Civic EXL".to_string(),
            year: 2020,
            price: Amount::from(89_900),
            mileage: Amount::from(45_000),
            fuel: Some("Flex".to_string()),
            transmission: None,
            engine: None,
            color: None,
            doors: None,
            description: None,
            features: Features::new(["Câmera de ré"]),
            specifications: Specifications::new([("Motor", "2.0")]),
        }
    }

    #[test]
    fn test_deserialize_minimal_legacy_row() {
        let row = r#"{
            "id": 9,
            "name": "Fiat Uno",
            "year": 2012,
            "price": "R$ 18.500",
            "mileage": null,
            "features": null,
            "specifications": null,
            "images": null,
            "image": "https://cdn.example.com/uno.jpg"
        }"#;
        let vehicle: Vehicle = serde_json::from_str(row).unwrap();
        assert_eq!(vehicle.id.as_str(), "9");
        assert!(vehicle.images.is_empty());
        assert_eq!(vehicle.cover_image(), Some("https://cdn.example.com/uno.jpg"));
        assert_eq!(vehicle.price_display(), "R$ 18.500,00");
        assert_eq!(vehicle.mileage_display(), "0 km");
    }

    #[test]
    fn test_no_images_has_no_cover() {
        let vehicle = Vehicle::from_fields(VehicleId::from(1), sample_fields(), None);
        assert_eq!(vehicle.cover_image(), None);
        assert_eq!(vehicle.image_at(3), None);
        assert!(vehicle.gallery().is_empty());
    }

    #[test]
    fn test_images_take_precedence_over_legacy_image() {
        let mut vehicle = Vehicle::from_fields(VehicleId::from(1), sample_fields(), None);
        vehicle.image = Some("legacy.jpg".to_string());
        vehicle.images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        assert_eq!(vehicle.cover_image(), Some("a.jpg"));
        assert_eq!(vehicle.image_at(1), Some("b.jpg"));
        assert_eq!(vehicle.image_at(2), None);
    }

    #[test]
    fn test_fields_patch_keeps_images() {
        let mut vehicle = Vehicle::from_fields(VehicleId::from(1), sample_fields(), None);
        vehicle.images = vec!["a.jpg".to_string()];

        let mut fields = sample_fields();
        fields.name = "Honda Civic Touring".to_string();
        vehicle.apply_patch(&VehiclePatch::Fields(fields));

        assert_eq!(vehicle.name, "Honda Civic Touring");
        assert_eq!(vehicle.images, ["a.jpg"]);
    }

    #[test]
    fn test_patch_serialization_shapes() {
        let json = serde_json::to_value(VehiclePatch::Fields(sample_fields())).unwrap();
        assert!(json.get("images").is_none());
        assert!(json.get("id").is_none());
        assert_eq!(json["price"], 89_900);
        assert_eq!(json["features"][0], "Câmera de ré");

        let patch = VehiclePatch::Images { images: vec!["x.jpg".to_string()] };
        assert!(patch.touches_images());
        let json = serde_json::to_value(patch).unwrap();
        assert_eq!(json, serde_json::json!({ "images": ["x.jpg"] }));
    }
}
