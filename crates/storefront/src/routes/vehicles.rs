//! Vehicle detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use linha_verde_core::{Vehicle, VehicleId, fallback};
use linha_verde_supabase::RecordStore;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::ContactConfig;
use crate::contact::ContactLinks;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Detail page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    /// Selected gallery image. Kept as text so that a malformed value falls
    /// back to the cover instead of rejecting the request.
    pub image: Option<String>,
}

/// One gallery thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub index: usize,
    pub url: String,
    pub selected: bool,
}

/// One row of the technical specifications table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRow {
    pub label: String,
    pub value: String,
}

/// Vehicle detail display data.
#[derive(Debug, Clone)]
pub struct VehicleDetailView {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub price: String,
    pub mileage: String,
    pub fuel: String,
    pub transmission: String,
    pub engine: Option<String>,
    pub color: Option<String>,
    pub doors: Option<String>,
    pub description: String,
    pub features: Vec<String>,
    pub specifications: Vec<SpecRow>,
    /// The large image; `None` renders the placeholder.
    pub main_image: Option<String>,
    pub gallery: Vec<GalleryImage>,
}

impl VehicleDetailView {
    /// Build the view with gallery image `selected` highlighted.
    #[must_use]
    pub fn new(vehicle: &Vehicle, selected: usize) -> Self {
        let gallery = vehicle
            .gallery()
            .into_iter()
            .enumerate()
            .map(|(index, url)| GalleryImage {
                index,
                url: url.to_string(),
                selected: index == selected,
            })
            .collect();

        Self {
            id: vehicle.id.to_string(),
            name: vehicle.name.clone(),
            year: vehicle.year,
            price: vehicle.price_display(),
            mileage: vehicle.mileage_display(),
            fuel: vehicle.fuel.clone().unwrap_or_default(),
            transmission: vehicle.transmission.clone().unwrap_or_default(),
            engine: vehicle.engine.clone(),
            color: vehicle.color.clone(),
            doors: vehicle.doors.clone(),
            description: vehicle.description.clone().unwrap_or_default(),
            features: vehicle.features.iter().cloned().collect(),
            specifications: vehicle
                .specifications
                .iter()
                .map(|(label, value)| SpecRow {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            main_image: vehicle.image_at(selected).map(str::to_string),
            gallery,
        }
    }
}

/// Vehicle detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "vehicle.html")]
pub struct VehicleTemplate {
    pub vehicle: VehicleDetailView,
    pub links: ContactLinks,
    pub contact: ContactConfig,
    pub admin_url: String,
    pub base_url: String,
}

/// Resolve the gallery index to show.
///
/// Missing, malformed and out-of-range values select the cover image.
#[must_use]
pub fn selected_image(requested: Option<&str>, image_count: usize) -> usize {
    requested
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|index| *index < image_count)
        .unwrap_or(0)
}

/// Find a vehicle in the backend, then in the sample catalogue.
pub async fn find_vehicle(records: &dyn RecordStore, id: &VehicleId) -> Option<Vehicle> {
    match records.get(id).await {
        Ok(Some(vehicle)) => Some(vehicle),
        Ok(None) => fallback::find(id),
        Err(e) => {
            warn!(error = %e, id = %id, "Failed to load vehicle, trying sample catalogue");
            fallback::find(id)
        }
    }
}

/// Display the vehicle detail page.
#[instrument(skip_all, fields(id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<VehicleTemplate> {
    let id = VehicleId::new(id);
    let vehicle = find_vehicle(state.records(), &id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id}")))?;

    let selected = selected_image(query.image.as_deref(), vehicle.gallery().len());
    let config = state.config();

    Ok(VehicleTemplate {
        links: ContactLinks::for_vehicle(&config.contact, &vehicle.name, vehicle.year),
        vehicle: VehicleDetailView::new(&vehicle, selected),
        contact: config.contact.clone(),
        admin_url: config.admin_url.clone(),
        base_url: config.base_url.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use linha_verde_supabase::{MemoryBackend, Operation};

    use super::*;

    #[test]
    fn test_selected_image() {
        assert_eq!(selected_image(None, 4), 0);
        assert_eq!(selected_image(Some("2"), 4), 2);
        assert_eq!(selected_image(Some("4"), 4), 0);
        assert_eq!(selected_image(Some("99"), 4), 0);
        assert_eq!(selected_image(Some("-1"), 4), 0);
        assert_eq!(selected_image(Some("abc"), 4), 0);
        assert_eq!(selected_image(Some("0"), 0), 0);
    }

    #[test]
    fn test_detail_view_gallery() {
        let mut vehicle = fallback::find(&VehicleId::from(1)).unwrap();
        vehicle.images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        let view = VehicleDetailView::new(&vehicle, 1);

        assert_eq!(view.main_image.as_deref(), Some("b.jpg"));
        let selected: Vec<bool> = view.gallery.iter().map(|g| g.selected).collect();
        assert_eq!(selected, [false, true]);
    }

    #[test]
    fn test_detail_view_without_images() {
        let mut vehicle = fallback::find(&VehicleId::from(1)).unwrap();
        vehicle.images.clear();
        let view = VehicleDetailView::new(&vehicle, 0);
        assert_eq!(view.main_image, None);
        assert!(view.gallery.is_empty());
    }

    #[test]
    fn test_detail_view_keeps_specification_order() {
        let vehicle = fallback::find(&VehicleId::from(2)).unwrap();
        let view = VehicleDetailView::new(&vehicle, 0);
        let labels: Vec<_> = view.specifications.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels.first(), Some(&"Motor"));
        assert_eq!(labels.last(), Some(&"Porta-malas"));
    }

    #[tokio::test]
    async fn test_find_vehicle_prefers_backend() {
        let backend = MemoryBackend::with_samples();
        let mut stored = fallback::find(&VehicleId::from(1)).unwrap();
        stored.id = VehicleId::from(10);
        stored.name = "Fiat Argo Drive".to_string();
        backend.seed(stored);

        let found = find_vehicle(&backend, &VehicleId::from(10)).await.unwrap();
        assert_eq!(found.name, "Fiat Argo Drive");
    }

    #[tokio::test]
    async fn test_find_vehicle_falls_back_to_samples() {
        let backend = MemoryBackend::new();
        let found = find_vehicle(&backend, &VehicleId::from(3)).await.unwrap();
        assert_eq!(found.name, "Volkswagen Jetta Comfortline");

        backend.fail(Operation::Get, "timeout");
        let found = find_vehicle(&backend, &VehicleId::from(2)).await.unwrap();
        assert_eq!(found.name, "Toyota Corolla XEI");
    }

    #[tokio::test]
    async fn test_find_vehicle_unknown() {
        let backend = MemoryBackend::new();
        assert!(find_vehicle(&backend, &VehicleId::from(404)).await.is_none());
    }
}
