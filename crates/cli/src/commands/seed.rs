//! Seed the vehicle table with the sample catalogue.
//!
//! The three sample vehicles are the ones the storefront shows when the
//! backend is unreachable. Seeding a fresh project with them keeps the
//! catalogue identical once the backend comes up.

use linha_verde_core::{VehicleForm, VehiclePatch, fallback};
use linha_verde_supabase::{Backend, BackendError, SortOrder};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Backend settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] linha_verde_supabase::ConfigError),

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A sample vehicle does not pass form validation.
    #[error("Sample vehicle '{0}' is invalid: {1}")]
    InvalidSample(String, linha_verde_core::ValidationError),
}

/// What a seeding run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSummary {
    /// The table already had this many vehicles; nothing was written.
    Skipped { existing: usize },
    /// This many vehicles were inserted.
    Inserted { count: usize },
}

/// Seed the backend selected by the environment.
///
/// # Errors
///
/// Returns an error if the environment is incomplete, the credentials are
/// rejected, or a write fails.
pub async fn catalogue(email: &str, password: &str, force: bool) -> Result<(), SeedError> {
    let backend = super::backend_from_env()?;

    match seed_catalogue(&backend, email, password, force).await? {
        SeedSummary::Skipped { existing } => {
            warn!(existing, "Vehicle table is not empty, nothing inserted (use --force)");
        }
        SeedSummary::Inserted { count } => info!(count, "Seeding complete"),
    }
    Ok(())
}

/// Sign in and insert the sample vehicles.
///
/// Samples are inserted oldest first so that the newest-first catalogue
/// lists them in their usual order.
///
/// # Errors
///
/// Returns an error if sign-in, listing, or any write fails. Vehicles
/// inserted before the failure are kept.
pub async fn seed_catalogue(
    backend: &Backend,
    email: &str,
    password: &str,
    force: bool,
) -> Result<SeedSummary, SeedError> {
    let existing = backend.records.list(SortOrder::NewestFirst).await?.len();
    if existing > 0 && !force {
        return Ok(SeedSummary::Skipped { existing });
    }

    let session = backend.auth.sign_in(email, password).await?;
    info!(user_id = %session.user.id, "Signed in");

    let mut count = 0;
    for sample in fallback::catalogue().into_iter().rev() {
        let fields = VehicleForm::from_vehicle(&sample)
            .validate()
            .map_err(|e| SeedError::InvalidSample(sample.name.clone(), e))?;
        let created = backend.records.insert(&session.access_token, &fields).await?;

        let images = sample.gallery().into_iter().map(str::to_string).collect();
        backend
            .records
            .update(
                &session.access_token,
                &created.id,
                &VehiclePatch::Images { images },
            )
            .await?;

        info!(id = %created.id, name = %sample.name, "Inserted sample vehicle");
        count += 1;
    }

    if let Err(e) = backend.auth.sign_out(&session.access_token).await {
        warn!(error = %e, "Sign-out failed");
    }

    Ok(SeedSummary::Inserted { count })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use linha_verde_supabase::{MemoryBackend, Operation};

    use super::*;

    const EMAIL: &str = "admin@linhaverde.com.br";
    const PASSWORD: &str = "s3nh4-forte";

    #[tokio::test]
    async fn test_seed_empty_table() {
        let memory = MemoryBackend::new().with_account(EMAIL, PASSWORD);
        let backend = Backend::memory(&memory);

        let summary = seed_catalogue(&backend, EMAIL, PASSWORD, false).await.unwrap();
        assert_eq!(summary, SeedSummary::Inserted { count: 3 });

        let names: Vec<_> = backend
            .records
            .list(SortOrder::NewestFirst)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        let expected: Vec<_> = fallback::catalogue().into_iter().map(|v| v.name).collect();
        assert_eq!(names, expected);
        assert!(memory.records().iter().all(|v| v.gallery().len() == 4));
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_table() {
        let memory = MemoryBackend::with_samples().with_account(EMAIL, PASSWORD);
        let backend = Backend::memory(&memory);

        let summary = seed_catalogue(&backend, EMAIL, PASSWORD, false).await.unwrap();
        assert_eq!(summary, SeedSummary::Skipped { existing: 3 });
        assert!(memory.calls_of(Operation::Insert).is_empty());
        assert!(memory.calls_of(Operation::SignIn).is_empty());
    }

    #[tokio::test]
    async fn test_seed_force_inserts_again() {
        let memory = MemoryBackend::with_samples().with_account(EMAIL, PASSWORD);
        let backend = Backend::memory(&memory);

        let summary = seed_catalogue(&backend, EMAIL, PASSWORD, true).await.unwrap();
        assert_eq!(summary, SeedSummary::Inserted { count: 3 });
        assert_eq!(memory.records().len(), 6);
    }

    #[tokio::test]
    async fn test_seed_rejects_bad_credentials() {
        let memory = MemoryBackend::new().with_account(EMAIL, PASSWORD);
        let backend = Backend::memory(&memory);

        let result = seed_catalogue(&backend, EMAIL, "errada", false).await;
        assert!(matches!(result, Err(SeedError::Backend(_))));
        assert!(memory.records().is_empty());
    }
}
