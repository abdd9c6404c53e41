//! Unified error handling with Sentry integration.
//!
//! The storefront recovers from backend failures itself (fallback catalogue),
//! so the only error that reaches the client is a page that does not exist.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Vehicle or page not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Page rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// "Veículo não encontrado" page.
#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(what) => {
                tracing::debug!(%what, "Not found");
                match NotFoundTemplate.render() {
                    Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
                    Err(e) => Self::Template(e).into_response(),
                }
            }
            Self::Template(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
