//! Capability traits and the injected backend bundle.

use std::sync::Arc;

use async_trait::async_trait;
use linha_verde_core::{Vehicle, VehicleFields, VehicleId, VehiclePatch};

use crate::config::{BackendMode, SupabaseConfig};
use crate::error::BackendError;
use crate::memory::MemoryBackend;
use crate::types::{AccessToken, AuthSession, SignUpOutcome, SortOrder, UploadFile, User};
use crate::SupabaseClient;

/// The vehicle table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records in the requested order.
    async fn list(&self, order: SortOrder) -> Result<Vec<Vehicle>, BackendError>;

    /// A single record, or `None` when no row has this id.
    async fn get(&self, id: &VehicleId) -> Result<Option<Vehicle>, BackendError>;

    /// Insert a record and return it with its backend-assigned id.
    async fn insert(
        &self,
        token: &AccessToken,
        fields: &VehicleFields,
    ) -> Result<Vehicle, BackendError>;

    /// Apply a partial update to one record.
    ///
    /// Returns [`BackendError::NotFound`] when no row was updated.
    async fn update(
        &self,
        token: &AccessToken,
        id: &VehicleId,
        patch: &VehiclePatch,
    ) -> Result<(), BackendError>;

    /// Delete one record.
    ///
    /// Returns [`BackendError::NotFound`] when no row was deleted.
    async fn delete(&self, token: &AccessToken, id: &VehicleId) -> Result<(), BackendError>;
}

/// Email/password accounts.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError>;

    /// The account behind a token, or `None` if the token is no longer
    /// accepted (expired, revoked, signed out).
    async fn current_user(&self, token: &AccessToken) -> Result<Option<User>, BackendError>;

    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError>;

    /// Exchange a refresh token for a new session. The refresh token is
    /// consumed.
    async fn refresh(&self, refresh_token: &AccessToken) -> Result<AuthSession, BackendError>;
}

/// The public image bucket.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `file` at `path`, overwriting any existing object.
    async fn upload(
        &self,
        token: &AccessToken,
        path: &str,
        file: &UploadFile,
    ) -> Result<(), BackendError>;

    /// Public URL of the object at `path`. Does not check that it exists.
    fn public_url(&self, path: &str) -> String;
}

/// One implementation of each capability, shared across handlers.
#[derive(Clone)]
pub struct Backend {
    pub records: Arc<dyn RecordStore>,
    pub auth: Arc<dyn AuthService>,
    pub storage: Arc<dyn BlobStorage>,
}

impl Backend {
    /// Build the backend selected by `mode`.
    #[must_use]
    pub fn from_mode(mode: &BackendMode) -> Self {
        match mode {
            BackendMode::Supabase(config) => Self::supabase(config),
            BackendMode::Memory => Self::memory(&MemoryBackend::with_samples()),
        }
    }

    /// Backend talking to a Supabase project.
    #[must_use]
    pub fn supabase(config: &SupabaseConfig) -> Self {
        let client = Arc::new(SupabaseClient::new(config));
        Self {
            records: client.clone(),
            auth: client.clone(),
            storage: client,
        }
    }

    /// Backend backed by shared in-memory state.
    #[must_use]
    pub fn memory(memory: &MemoryBackend) -> Self {
        let memory = Arc::new(memory.clone());
        Self {
            records: memory.clone(),
            auth: memory.clone(),
            storage: memory,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
