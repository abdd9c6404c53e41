//! Linha Verde Storefront library.
//!
//! This crate provides the public site as a library so the router can be
//! exercised in tests without binding a socket.
//!
//! # Pages
//!
//! - `/` - catalogue of all vehicles, newest first, with the sample catalogue
//!   as fallback when the backend is unreachable or empty
//! - `/vehicle/{id}` - vehicle detail with gallery, features, specifications
//!   and WhatsApp/email contact links

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod contact;
pub mod error;
pub mod filters;
pub mod routes;
pub mod state;

use axum::{Router, http::Uri, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the storefront router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

/// Any unknown path renders the not-found page.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
