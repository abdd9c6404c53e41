//! Operator account commands.
//!
//! # Usage
//!
//! ```bash
//! lv-cli admin signup -e admin@linhaverde.com.br -p 's3nh4-forte'
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL
//! - `SUPABASE_ANON_KEY` - Public anon key

use linha_verde_supabase::{Backend, BackendError, SignUpOutcome};
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] linha_verde_supabase::ConfigError),

    /// The auth service rejected the request.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// Register a new operator account.
///
/// # Errors
///
/// Returns an error if the email is malformed, the environment is
/// incomplete, or the auth service rejects the account.
pub async fn signup(email: &str, password: &str) -> Result<(), AdminError> {
    let backend = super::backend_from_env()?;
    register(&backend, email, password).await
}

/// Register an account and report whether it still needs confirming.
///
/// # Errors
///
/// See [`signup`].
pub async fn register(backend: &Backend, email: &str, password: &str) -> Result<(), AdminError> {
    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(AdminError::InvalidEmail(email.to_owned()));
    }

    tracing::info!("Registering operator account: {}", email);

    match backend.auth.sign_up(email, password).await? {
        SignUpOutcome::ConfirmationRequired(user) => {
            tracing::info!(user_id = %user.id, "Account created, confirmation email sent");
        }
        SignUpOutcome::SignedIn(session) => {
            tracing::info!(user_id = %session.user.id, "Account created and confirmed");
            if let Err(e) = backend.auth.sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "Sign-out failed");
            }
        }
    }

    Ok(())
}
