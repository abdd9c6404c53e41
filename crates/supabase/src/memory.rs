//! In-memory backend.
//!
//! Implements every capability trait against process-local state. Each call
//! is recorded so tests can assert on the exact sequence of backend
//! operations, and any operation can be made to fail on demand.
//!
//! # Example
//!
//! ```rust
//! use linha_verde_supabase::{MemoryBackend, Operation};
//!
//! let memory = MemoryBackend::with_samples().with_account("admin@linhaverde.com.br", "s3nh4");
//! memory.fail_after(Operation::Upload, 1, "Payload too large");
//! assert_eq!(memory.records().len(), 3);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use linha_verde_core::{Vehicle, VehicleFields, VehicleId, VehiclePatch, fallback};
use tracing::debug;

use crate::backend::{AuthService, BlobStorage, RecordStore};
use crate::config::DEFAULT_IMAGES_BUCKET;
use crate::error::BackendError;
use crate::types::{AccessToken, AuthSession, SignUpOutcome, SortOrder, UploadFile, User};

/// Lifetime of issued access tokens unless overridden.
const SESSION_LIFETIME_SECONDS: i64 = 3600;

/// Backend operations, for failure injection and call filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Insert,
    Update,
    Delete,
    SignIn,
    SignUp,
    CurrentUser,
    SignOut,
    Refresh,
    Upload,
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    List(SortOrder),
    Get(VehicleId),
    Insert(VehicleFields),
    Update { id: VehicleId, patch: VehiclePatch },
    Delete(VehicleId),
    SignIn { email: String },
    SignUp { email: String },
    CurrentUser,
    SignOut,
    Refresh,
    Upload { path: String, file_name: String },
}

impl BackendCall {
    /// The operation this call belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::List(_) => Operation::List,
            Self::Get(_) => Operation::Get,
            Self::Insert(_) => Operation::Insert,
            Self::Update { .. } => Operation::Update,
            Self::Delete(_) => Operation::Delete,
            Self::SignIn { .. } => Operation::SignIn,
            Self::SignUp { .. } => Operation::SignUp,
            Self::CurrentUser => Operation::CurrentUser,
            Self::SignOut => Operation::SignOut,
            Self::Refresh => Operation::Refresh,
            Self::Upload { .. } => Operation::Upload,
        }
    }

    /// Returns `true` for calls that change stored state.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Insert(_) | Self::Update { .. } | Self::Delete(_) | Self::Upload { .. }
        )
    }
}

#[derive(Debug)]
struct Failure {
    /// Calls that still succeed before the failure kicks in.
    remaining_successes: usize,
    message: String,
}

#[derive(Debug)]
struct Account {
    password: String,
    user: User,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Records in insertion order.
    records: Vec<Vehicle>,
    next_id: i64,
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, User>,
    refresh_tokens: HashMap<String, User>,
    blobs: BTreeMap<String, UploadFile>,
    calls: Vec<BackendCall>,
    failures: HashMap<Operation, Failure>,
    /// `expires_in` of issued sessions.
    session_lifetime: Option<i64>,
}

impl MemoryState {
    fn record(&mut self, call: BackendCall) -> Result<(), BackendError> {
        let operation = call.operation();
        self.calls.push(call);

        let Some(failure) = self.failures.get_mut(&operation) else {
            return Ok(());
        };
        if failure.remaining_successes > 0 {
            failure.remaining_successes -= 1;
            return Ok(());
        }
        debug!(?operation, "Injected backend failure");
        Err(BackendError::service(500, failure.message.clone()))
    }

    fn authorize(&self, token: &AccessToken) -> Result<(), BackendError> {
        if self.sessions.contains_key(token.expose()) {
            Ok(())
        } else {
            Err(BackendError::service(401, "invalid JWT: token is not valid"))
        }
    }

    fn open_session(&mut self, user: User) -> AuthSession {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let refresh_token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user.clone());
        self.refresh_tokens.insert(refresh_token.clone(), user.clone());
        AuthSession {
            access_token: AccessToken::new(token),
            expires_in: Some(self.session_lifetime.unwrap_or(SESSION_LIFETIME_SECONDS)),
            refresh_token: Some(AccessToken::new(refresh_token)),
            user,
        }
    }
}

/// Shared in-memory state implementing [`RecordStore`], [`AuthService`] and
/// [`BlobStorage`]. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// An empty backend: no records, no accounts.
    #[must_use]
    pub fn new() -> Self {
        let backend = Self::default();
        backend.lock().next_id = 1;
        backend
    }

    /// A backend holding the sample catalogue, newest first in catalogue
    /// order.
    #[must_use]
    pub fn with_samples() -> Self {
        let backend = Self::new();
        let now = Utc::now();
        {
            let mut state = backend.lock();
            for (position, mut vehicle) in fallback::catalogue().into_iter().enumerate().rev() {
                let age = i64::try_from(position).unwrap_or_default();
                vehicle.created_at = Some(now - Duration::minutes(age));
                state.records.push(vehicle);
            }
            state.next_id = 4;
        }
        backend
    }

    /// Register a confirmed account.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: User {
                    id: uuid::Uuid::new_v4().to_string(),
                    email: Some(email.to_string()),
                },
            },
        );
        self
    }

    /// Issue sessions that expire after `seconds`.
    #[must_use]
    pub fn with_session_lifetime(self, seconds: i64) -> Self {
        self.lock().session_lifetime = Some(seconds);
        self
    }

    /// Store a record as-is, bypassing call recording.
    pub fn seed(&self, vehicle: Vehicle) {
        self.lock().records.push(vehicle);
    }

    /// Snapshot of all records in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<Vehicle> {
        self.lock().records.clone()
    }

    /// Snapshot of one record.
    #[must_use]
    pub fn record(&self, id: &VehicleId) -> Option<Vehicle> {
        self.lock().records.iter().find(|v| &v.id == id).cloned()
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Calls of one operation, in order.
    #[must_use]
    pub fn calls_of(&self, operation: Operation) -> Vec<BackendCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .cloned()
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// The object stored at `path`.
    #[must_use]
    pub fn blob(&self, path: &str) -> Option<UploadFile> {
        self.lock().blobs.get(path).cloned()
    }

    /// Paths of all stored objects, sorted.
    #[must_use]
    pub fn blob_paths(&self) -> Vec<String> {
        self.lock().blobs.keys().cloned().collect()
    }

    /// Make every call of `operation` fail with `message`.
    pub fn fail(&self, operation: Operation, message: &str) {
        self.fail_after(operation, 0, message);
    }

    /// Let `successes` calls of `operation` succeed, then fail the rest.
    pub fn fail_after(&self, operation: Operation, successes: usize, message: &str) {
        self.lock().failures.insert(
            operation,
            Failure {
                remaining_successes: successes,
                message: message.to_string(),
            },
        );
    }

    /// Invalidate every issued access token, as if they had all expired.
    /// Refresh tokens stay valid.
    pub fn expire_sessions(&self) {
        self.lock().sessions.clear();
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn list(&self, order: SortOrder) -> Result<Vec<Vehicle>, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::List(order))?;

        let mut records = state.records.clone();
        match order {
            SortOrder::NewestFirst => {
                // Later inserts win ties on equal timestamps.
                records.reverse();
                records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            SortOrder::OldestFirst => records.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(records)
    }

    async fn get(&self, id: &VehicleId) -> Result<Option<Vehicle>, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::Get(id.clone()))?;
        Ok(state.records.iter().find(|v| &v.id == id).cloned())
    }

    async fn insert(
        &self,
        token: &AccessToken,
        fields: &VehicleFields,
    ) -> Result<Vehicle, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::Insert(fields.clone()))?;
        state.authorize(token)?;

        let id = VehicleId::from(state.next_id);
        state.next_id += 1;
        let vehicle = Vehicle::from_fields(id, fields.clone(), Some(Utc::now()));
        state.records.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: &VehicleId,
        patch: &VehiclePatch,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::Update {
            id: id.clone(),
            patch: patch.clone(),
        })?;
        state.authorize(token)?;

        let vehicle = state
            .records
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        vehicle.apply_patch(patch);
        Ok(())
    }

    async fn delete(&self, token: &AccessToken, id: &VehicleId) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::Delete(id.clone()))?;
        state.authorize(token)?;

        let before = state.records.len();
        state.records.retain(|v| &v.id != id);
        if state.records.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::SignIn {
            email: email.to_string(),
        })?;

        let user = state
            .accounts
            .get(email)
            .filter(|account| account.password == password)
            .map(|account| account.user.clone())
            .ok_or_else(|| BackendError::service(400, "Invalid login credentials"))?;
        Ok(state.open_session(user))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::SignUp {
            email: email.to_string(),
        })?;

        if state.accounts.contains_key(email) {
            return Err(BackendError::service(422, "User already registered"));
        }
        if password.len() < 6 {
            return Err(BackendError::service(
                422,
                "Password should be at least 6 characters.",
            ));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        Ok(SignUpOutcome::SignedIn(state.open_session(user)))
    }

    async fn current_user(&self, token: &AccessToken) -> Result<Option<User>, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::CurrentUser)?;
        Ok(state.sessions.get(token.expose()).cloned())
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::SignOut)?;
        state.sessions.remove(token.expose());
        Ok(())
    }

    async fn refresh(&self, refresh_token: &AccessToken) -> Result<AuthSession, BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::Refresh)?;

        let user = state
            .refresh_tokens
            .remove(refresh_token.expose())
            .ok_or_else(|| {
                BackendError::service(400, "Invalid Refresh Token: Refresh Token Not Found")
            })?;
        Ok(state.open_session(user))
    }
}

#[async_trait]
impl BlobStorage for MemoryBackend {
    async fn upload(
        &self,
        token: &AccessToken,
        path: &str,
        file: &UploadFile,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.record(BackendCall::Upload {
            path: path.to_string(),
            file_name: file.file_name.clone(),
        })?;
        state.authorize(token)?;

        state.blobs.insert(path.to_string(), file.clone());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{DEFAULT_IMAGES_BUCKET}/{path}")
    }
}
