//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Catalogue (hero, vehicles, about, testimonials, contact)
//! GET  /vehicle/{id}      - Vehicle detail, `?image=N` selects the gallery image
//! GET  /health            - Health check
//! GET  /static/*          - Stylesheets and images
//! ```

pub mod home;
pub mod vehicles;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the storefront page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/vehicle/{id}", get(vehicles::show))
}
