//! Domain models for admin.

pub mod session;

pub use session::{CurrentAdmin, Flash, FlashKind};
pub use session::keys as session_keys;
