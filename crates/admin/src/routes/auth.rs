//! Authentication route handlers for admin.
//!
//! Email and password sign-in against the backend's auth service. The
//! login page keeps an event stream open so it follows the browser into the
//! panel when a sign-in completes in another tab.

use std::convert::Infallible;

use askama::Template;
use async_stream::stream;
use axum::response::sse::{Event, KeepAlive};
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response, Sse},
    routing::{get, post},
};
use chrono::Utc;
use linha_verde_supabase::SignUpOutcome;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::session::{auth_channel, clear_editor_id};
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::render;
use crate::services::AuthEventKind;
use crate::state::AppState;

/// Shown after a successful sign-up.
pub const CONFIRM_EMAIL_MESSAGE: &str = "Verifique seu email para confirmar a conta.";

/// Where a signed-in operator lands.
const ADMIN_HOME: &str = "/admin";

/// Message above the login form.
#[derive(Debug, Clone)]
pub struct LoginMessage {
    pub text: String,
    pub is_error: bool,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub message: Option<LoginMessage>,
    pub storefront_url: String,
}

impl LoginTemplate {
    fn new(state: &AppState, email: String, message: Option<LoginMessage>) -> Self {
        Self {
            email,
            message,
            storefront_url: state.config().storefront_url.clone(),
        }
    }
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/login/signup", post(signup))
        .route("/login/events", get(auth_events))
        .route("/logout", post(logout))
}

/// Render the login page, or go straight to the panel when the browser's
/// session is still accepted by the backend.
///
/// GET /login
#[instrument(skip_all)]
async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Result<Response> {
    if let Some(admin) = admin {
        match state.backend().auth.current_user(&admin.access_token).await {
            Ok(Some(_)) => return Ok(Redirect::to(ADMIN_HOME).into_response()),
            Ok(None) => {
                info!(user_id = %admin.user_id, "Clearing stale admin session");
                clear_current_admin(&session).await?;
            }
            Err(e) => warn!(error = %e, "Could not verify existing session"),
        }
    }

    // Make sure the channel exists before the page opens its event stream.
    auth_channel(&session).await?;

    Ok(render(&LoginTemplate::new(&state, String::new(), None)))
}

/// Sign in with email and password.
///
/// POST /login
#[instrument(skip_all, fields(email = %credentials.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    let auth_session = match state
        .backend()
        .auth
        .sign_in(&credentials.email, &credentials.password)
        .await
    {
        Ok(auth_session) => auth_session,
        Err(e) => {
            warn!(error = %e, "Sign-in failed");
            let message = LoginMessage {
                text: e.to_string(),
                is_error: true,
            };
            return Ok(render(&LoginTemplate::new(
                &state,
                credentials.email,
                Some(message),
            )));
        }
    };

    let admin = CurrentAdmin::from_session(auth_session, Utc::now());
    session.cycle_id().await?;
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.user_id, admin.email.as_deref());
    info!(user_id = %admin.user_id, "Admin signed in");

    let channel = auth_channel(&session).await?;
    state.auth_events().publish(&channel, AuthEventKind::SignedIn);

    Ok(Redirect::to(ADMIN_HOME).into_response())
}

/// Create an account with the submitted credentials.
///
/// POST /login/signup
#[instrument(skip_all, fields(email = %credentials.email))]
async fn signup(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Response {
    let message = match state
        .backend()
        .auth
        .sign_up(&credentials.email, &credentials.password)
        .await
    {
        Ok(outcome) => {
            let confirmed = matches!(outcome, SignUpOutcome::SignedIn(_));
            info!(user_id = %outcome.user().id, confirmed, "Account created");
            LoginMessage {
                text: CONFIRM_EMAIL_MESSAGE.to_string(),
                is_error: false,
            }
        }
        Err(e) => {
            warn!(error = %e, "Sign-up failed");
            LoginMessage {
                text: e.to_string(),
                is_error: true,
            }
        }
    };

    render(&LoginTemplate::new(&state, credentials.email, Some(message)))
}

/// Stream auth-state changes for this browser to the open login page.
///
/// Emits one `signed-in` event carrying the panel URL, then ends. The
/// subscription is dropped, and so unsubscribed, when the page closes.
///
/// GET /login/events
async fn auth_events(
    State(state): State<AppState>,
    session: Session,
) -> std::result::Result<Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>>, AppError>
{
    let channel = auth_channel(&session).await?;
    let mut subscription = state.auth_events().subscribe(channel);

    let events = stream! {
        while let Some(kind) = subscription.next().await {
            if kind == AuthEventKind::SignedIn {
                yield Ok(Event::default().event("signed-in").data(ADMIN_HOME));
                break;
            }
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Sign out and clear the session.
///
/// POST /logout
#[instrument(skip_all)]
async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Result<Redirect> {
    if let Some(admin) = admin {
        if let Err(e) = state.backend().auth.sign_out(&admin.access_token).await {
            warn!(error = %e, "Backend sign-out failed, clearing session anyway");
        }
        info!(user_id = %admin.user_id, "Admin signed out");
    }

    if let Some(editor_id) = clear_editor_id(&session).await? {
        state.editors().close(&editor_id).await;
    }
    clear_current_admin(&session).await?;
    clear_sentry_user();

    let channel = auth_channel(&session).await?;
    state.auth_events().publish(&channel, AuthEventKind::SignedOut);

    Ok(Redirect::to("/login"))
}
