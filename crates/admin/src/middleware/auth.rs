//! Authentication middleware and extractors for admin.
//!
//! Provides extractors for requiring an authenticated operator in route
//! handlers. The access token is renewed here shortly before it expires.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires an authenticated operator.
///
/// If nobody is logged in, redirects to the login page before the handler
/// runs, so no inventory data is fetched.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", admin.display_name())
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when authentication is required but the operator is not
/// logged in.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// The session layer is missing.
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        let admin = if admin.needs_refresh(Utc::now()) {
            refresh_admin(state, &session, admin).await?
        } else {
            admin
        };

        set_sentry_user(&admin.user_id, admin.email.as_deref());
        Ok(Self(admin))
    }
}

/// Renew the access token, signing the operator out if that fails.
async fn refresh_admin(
    state: &AppState,
    session: &Session,
    admin: CurrentAdmin,
) -> Result<CurrentAdmin, AdminAuthRejection> {
    let Some(refresh_token) = admin.refresh_token.as_ref() else {
        return Ok(admin);
    };

    match state.backend().auth.refresh(refresh_token).await {
        Ok(renewed) => {
            let renewed = CurrentAdmin::from_session(renewed, Utc::now());
            set_current_admin(session, &renewed)
                .await
                .map_err(|_| AdminAuthRejection::RedirectToLogin)?;
            info!(user_id = %renewed.user_id, "Access token renewed");
            Ok(renewed)
        }
        Err(e) => {
            warn!(error = %e, user_id = %admin.user_id, "Token renewal failed, signing out");
            let _ = clear_current_admin(session).await;
            clear_sentry_user();
            Err(AdminAuthRejection::RedirectToLogin)
        }
    }
}

/// Extractor that optionally gets the current operator.
///
/// Unlike `RequireAdminAuth`, this does not reject the request and does not
/// renew tokens.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Helper to set the current operator in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current operator from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
