//! Values exchanged with the backend services.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Bearer token of a signed-in account.
///
/// Sent on every write so the table's row-level security applies to the
/// signed-in user. `Debug` output is redacted.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccessToken {}

// Serialized only into the server-side session store.
impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account identifier (UUID).
    pub id: String,
    /// Account email, absent for phone-only accounts.
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session returned by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: AccessToken,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Single-use token exchanged for a new session before expiry.
    #[serde(default)]
    pub refresh_token: Option<AccessToken>,
    pub user: User,
}

/// Result of registering a new account.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The account must be confirmed by email before signing in.
    ConfirmationRequired(User),
    /// The project auto-confirms accounts; a session was issued.
    SignedIn(AuthSession),
}

impl SignUpOutcome {
    /// The registered account.
    #[must_use]
    pub const fn user(&self) -> &User {
        match self {
            Self::ConfirmationRequired(user) => user,
            Self::SignedIn(session) => &session.user,
        }
    }
}

/// Ordering of list queries, by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently created first (catalogue and admin list).
    #[default]
    NewestFirst,
    /// Oldest first.
    OldestFirst,
}

impl SortOrder {
    /// `PostgREST` `order` parameter value.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::NewestFirst => "created_at.desc",
            Self::OldestFirst => "created_at.asc",
        }
    }
}

/// A file selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name as chosen by the user.
    pub file_name: String,
    /// MIME type reported by the browser.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Create an upload from its parts.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Extension of the original file name, used for the stored object name.
    ///
    /// Names without a dot yield the whole name, matching how the stored
    /// object path has always been built; empty names fall back to `bin`.
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit('.').next() {
            Some(ext) if !ext.is_empty() => ext,
            _ => "bin",
        }
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
