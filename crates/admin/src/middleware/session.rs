//! Session middleware configuration for admin.
//!
//! Sessions live in the process (`MemoryStore`): a restart signs everyone
//! out and drops open editors, which only costs a new login.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::AdminConfig;
use crate::models::{Flash, session_keys};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "lv_admin_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Queue a message for the next page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Take the queued message, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove::<Flash>(session_keys::FLASH).await
}

/// This browser's auth-state channel, created on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn auth_channel(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(channel) = session.get::<String>(session_keys::AUTH_CHANNEL).await? {
        return Ok(channel);
    }
    let channel = uuid::Uuid::new_v4().to_string();
    session.insert(session_keys::AUTH_CHANNEL, &channel).await?;
    Ok(channel)
}

/// Id of this browser's open editor.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn editor_id(session: &Session) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(session_keys::EDITOR_ID).await
}

/// Remember the editor opened by this browser.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_editor_id(session: &Session, id: &str) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::EDITOR_ID, id).await
}

/// Forget this browser's editor, returning its id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_editor_id(session: &Session) -> Result<Option<String>, tower_sessions::session::Error> {
    session.remove::<String>(session_keys::EDITOR_ID).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = session();
        set_flash(&session, Flash::success("Veículo criado com sucesso!")).await.unwrap();

        let flash = take_flash(&session).await.unwrap().unwrap();
        assert_eq!(flash.message, "Veículo criado com sucesso!");
        assert!(!flash.is_error());
        assert!(take_flash(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_auth_channel_is_stable() {
        let session = session();
        let first = auth_channel(&session).await.unwrap();
        let second = auth_channel(&session).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_editor_id_round_trip() {
        let session = session();
        assert!(editor_id(&session).await.unwrap().is_none());

        set_editor_id(&session, "ed-1").await.unwrap();
        assert_eq!(editor_id(&session).await.unwrap().as_deref(), Some("ed-1"));
        assert_eq!(clear_editor_id(&session).await.unwrap().as_deref(), Some("ed-1"));
        assert!(editor_id(&session).await.unwrap().is_none());
    }
}
