//! Catalogue page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use linha_verde_core::{Vehicle, fallback};
use linha_verde_supabase::{RecordStore, SortOrder};
use tracing::{instrument, warn};

use crate::config::ContactConfig;
use crate::filters;
use crate::state::AppState;

/// A customer quote in the testimonials section.
pub struct Testimonial {
    pub name: &'static str,
    pub rating: usize,
    pub comment: &'static str,
}

/// Testimonials shown on the catalogue page.
pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Maria Silva",
        rating: 5,
        comment: "Excelente atendimento e carros de qualidade. Recomendo!",
    },
    Testimonial {
        name: "João Santos",
        rating: 5,
        comment: "Comprei meu carro aqui e foi a melhor experiência. Equipe muito profissional.",
    },
    Testimonial {
        name: "Ana Costa",
        rating: 5,
        comment: "Preços justos e transparência total. Voltarei sempre!",
    },
];

/// Vehicle card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleCard {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub price: String,
    pub mileage: String,
    pub fuel: String,
    /// Cover image, `None` renders the placeholder.
    pub cover: Option<String>,
}

impl From<&Vehicle> for VehicleCard {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id.to_string(),
            name: vehicle.name.clone(),
            year: vehicle.year,
            price: vehicle.price_display(),
            mileage: vehicle.mileage_display(),
            fuel: vehicle.fuel.clone().unwrap_or_default(),
            cover: vehicle.cover_image().map(str::to_string),
        }
    }
}

/// Catalogue page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub vehicles: Vec<VehicleCard>,
    pub testimonials: &'static [Testimonial],
    pub contact: ContactConfig,
    pub admin_url: String,
    pub base_url: String,
}

/// Load the catalogue, newest first.
///
/// A failed request or an empty table both yield the sample catalogue, so
/// the page never renders without vehicles.
pub async fn load_catalogue(records: &dyn RecordStore) -> Vec<Vehicle> {
    match records.list(SortOrder::NewestFirst).await {
        Ok(vehicles) if !vehicles.is_empty() => vehicles,
        Ok(_) => {
            tracing::debug!("No vehicles stored, showing sample catalogue");
            fallback::catalogue()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load vehicles, showing sample catalogue");
            fallback::catalogue()
        }
    }
}

/// Display the catalogue page.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let vehicles = load_catalogue(state.records()).await;
    let config = state.config();

    HomeTemplate {
        vehicles: vehicles.iter().map(VehicleCard::from).collect(),
        testimonials: TESTIMONIALS,
        contact: config.contact.clone(),
        admin_url: config.admin_url.clone(),
        base_url: config.base_url.clone(),
    }
}
