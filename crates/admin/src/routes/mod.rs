//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /login                          - Login page (redirects when signed in)
//! POST /login                          - Sign in with email and password
//! POST /login/signup                   - Create an account
//! GET  /login/events                   - Auth-state stream for the open login page (SSE)
//! POST /logout                         - Sign out
//!
//! # Inventory
//! GET  /admin                          - Vehicle list, newest first
//! POST /admin/vehicles/new             - Open an empty editor
//! POST /admin/vehicles/{id}/edit       - Open the editor on a vehicle
//! GET  /admin/vehicles/{id}/delete     - Deletion prompt
//! POST /admin/vehicles/{id}/delete     - Delete (with confirm=yes)
//!
//! # Editor
//! GET  /admin/editor                   - The open editor
//! POST /admin/editor                   - Update fields/photos, remove a photo or save
//! POST /admin/editor/cancel            - Close the editor
//! GET  /admin/editor/previews/{index}  - Selected photo bytes
//! ```

use askama::Template;
use axum::Router;
use axum::response::{Html, IntoResponse, Response};

use crate::error::AppError;
use crate::models::CurrentAdmin;
use crate::state::AppState;

pub mod auth;
pub mod editor;
pub mod inventory;

/// Build the complete router for all admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(inventory::router())
        .merge(editor::router())
}

/// Header data shared by every signed-in page.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub storefront_url: String,
}

impl AdminUserView {
    #[must_use]
    pub fn new(admin: &CurrentAdmin, state: &AppState) -> Self {
        Self {
            name: admin.display_name().to_string(),
            storefront_url: state.config().storefront_url.clone(),
        }
    }
}

/// Render a template, logging and reporting failures.
pub(crate) fn render(template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => AppError::Template(e).into_response(),
    }
}
