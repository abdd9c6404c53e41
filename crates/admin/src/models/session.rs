//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Duration, Utc};
use linha_verde_supabase::{AccessToken, AuthSession};
use serde::{Deserialize, Serialize};

/// How long before expiry an access token is renewed.
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Session-stored operator identity.
///
/// Holds the backend session so that writes run as the signed-in account.
/// The session store is server-side; only its id travels in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend account id.
    pub user_id: String,
    /// Account email, shown in the header.
    pub email: Option<String>,
    /// Bearer token for record and storage writes.
    pub access_token: AccessToken,
    /// Token used to renew `access_token`.
    pub refresh_token: Option<AccessToken>,
    /// When `access_token` stops being accepted, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CurrentAdmin {
    /// Build the session identity from a fresh backend session.
    #[must_use]
    pub fn from_session(session: AuthSession, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: session
                .expires_in
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| now.checked_add_signed(lifetime)),
            user_id: session.user.id,
            email: session.user.email,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
        }
    }

    /// Name shown in the header.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.user_id)
    }

    /// Whether the access token is about to expire and can be renewed.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_some()
            && self
                .expires_at
                .is_some_and(|at| at - now <= Duration::seconds(REFRESH_MARGIN_SECONDS))
    }
}

/// Kind of one-shot message shown above the inventory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashKind {
    Success,
    Error,
}

/// A message carried across one redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == FlashKind::Error
    }
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the current logged-in operator.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the id of this browser's open editor.
    pub const EDITOR_ID: &str = "editor_id";

    /// Key for this browser's auth-state channel.
    pub const AUTH_CHANNEL: &str = "auth_channel";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use linha_verde_supabase::User;

    use super::*;

    fn auth_session(expires_in: Option<i64>, refresh: bool) -> AuthSession {
        AuthSession {
            access_token: AccessToken::new("jwt"),
            expires_in,
            refresh_token: refresh.then(|| AccessToken::new("rt")),
            user: User {
                id: "f3a1".to_string(),
                email: Some("admin@linhaverde.com.br".to_string()),
            },
        }
    }

    #[test]
    fn test_needs_refresh() {
        let now = Utc::now();
        let admin = CurrentAdmin::from_session(auth_session(Some(3600), true), now);
        assert!(!admin.needs_refresh(now));
        assert!(admin.needs_refresh(now + Duration::seconds(3550)));
        assert!(admin.needs_refresh(now + Duration::seconds(7200)));
    }

    #[test]
    fn test_no_refresh_without_token_or_expiry() {
        let now = Utc::now();
        let later = now + Duration::days(1);
        assert!(!CurrentAdmin::from_session(auth_session(Some(3600), false), now).needs_refresh(later));
        assert!(!CurrentAdmin::from_session(auth_session(None, true), now).needs_refresh(later));
    }

    #[test]
    fn test_out_of_range_expiry_is_unknown() {
        let now = Utc::now();
        let admin = CurrentAdmin::from_session(auth_session(Some(i64::MAX), true), now);
        assert!(admin.expires_at.is_none());
        assert!(!admin.needs_refresh(now));
    }

    #[test]
    fn test_display_name() {
        let mut admin = CurrentAdmin::from_session(auth_session(None, false), Utc::now());
        assert_eq!(admin.display_name(), "admin@linhaverde.com.br");
        admin.email = None;
        assert_eq!(admin.display_name(), "f3a1");
    }
}
