//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth_events` - Per-browser auth-state change notifications
//! - `editor` - Server-held editing forms and photo selections
//! - `inventory` - Two-phase vehicle save and deletion

pub mod auth_events;
pub mod editor;
pub mod inventory;

pub use auth_events::{AuthEvent, AuthEventKind, AuthStateNotifier, AuthSubscription};
pub use editor::{Editor, EditorHandle, EditorMode, EditorStatus, EditorStore};
pub use inventory::{InventoryWorkflow, SubmitOutcome, WorkflowError};
