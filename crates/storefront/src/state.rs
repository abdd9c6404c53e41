//! Application state shared across handlers.

use std::sync::Arc;

use linha_verde_supabase::{Backend, RecordStore};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The storefront only reads, so
/// it holds the record store and nothing else from the backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    records: Arc<dyn RecordStore>,
}

impl AppState {
    /// Create state with the backend selected in `config`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = Backend::from_mode(&config.backend);
        Self::with_records(config, backend.records)
    }

    /// Create state around an existing record store.
    #[must_use]
    pub fn with_records(config: StorefrontConfig, records: Arc<dyn RecordStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, records }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the vehicle record store.
    #[must_use]
    pub fn records(&self) -> &dyn RecordStore {
        self.inner.records.as_ref()
    }
}
