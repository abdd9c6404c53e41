//! Command implementations.

pub mod admin;
pub mod seed;

use linha_verde_supabase::{Backend, BackendMode, ConfigError};

/// Backend selected by the environment, loading `.env` first.
fn backend_from_env() -> Result<Backend, ConfigError> {
    dotenvy::dotenv().ok();
    let mode = BackendMode::from_env()?;
    tracing::info!(backend = mode.name(), "Backend selected");
    Ok(Backend::from_mode(&mode))
}
