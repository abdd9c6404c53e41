use thiserror::Error;

/// Errors returned by the record store, auth and storage services.
///
/// The `Display` form of [`BackendError::Service`] is the service's own
/// message, unmodified, since the admin panel shows it to the operator as-is.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("{message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid response from backend: {0}")]
    Parse(#[from] serde_json::Error),

    /// A write targeted a record that does not exist (or is not visible).
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl BackendError {
    /// Create a service error from a status and message.
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` if the service rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Service { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_message_is_verbatim() {
        let err = BackendError::service(400, "Invalid login credentials");
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(BackendError::service(401, "JWT expired").is_unauthorized());
        assert!(!BackendError::service(500, "boom").is_unauthorized());
        assert!(!BackendError::NotFound("7".to_string()).is_unauthorized());
    }
}
