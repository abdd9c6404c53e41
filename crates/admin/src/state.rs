//! Application state shared across handlers.

use std::sync::Arc;

use linha_verde_supabase::Backend;

use crate::config::AdminConfig;
use crate::services::{AuthStateNotifier, EditorStore, InventoryWorkflow};

/// Application state shared across all handlers.
///
/// Cheap to clone: everything sits behind one `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: AdminConfig,
    backend: Backend,
    workflow: InventoryWorkflow,
    editors: EditorStore,
    auth_events: AuthStateNotifier,
}

impl AppState {
    /// Build the state with the backend selected by the configuration.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let backend = Backend::from_mode(&config.backend);
        Self::with_backend(config, backend)
    }

    /// Build the state around an existing backend.
    #[must_use]
    pub fn with_backend(config: AdminConfig, backend: Backend) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                workflow: InventoryWorkflow::new(&backend),
                config,
                backend,
                editors: EditorStore::new(),
                auth_events: AuthStateNotifier::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    #[must_use]
    pub fn workflow(&self) -> &InventoryWorkflow {
        &self.inner.workflow
    }

    #[must_use]
    pub fn editors(&self) -> &EditorStore {
        &self.inner.editors
    }

    #[must_use]
    pub fn auth_events(&self) -> &AuthStateNotifier {
        &self.inner.auth_events
    }
}
