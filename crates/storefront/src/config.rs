//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend
//! - `LINHA_VERDE_BACKEND` - `supabase` (default) or `memory`
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` - required for `supabase`
//! - `SUPABASE_VEHICLES_TABLE`, `SUPABASE_IMAGES_BUCKET` - optional overrides
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `ADMIN_URL` - Admin panel URL linked from the footer (default: `http://localhost:3001`)
//! - `CONTACT_WHATSAPP` - WhatsApp number in international format (default: 5531989693506)
//! - `CONTACT_PHONE` - Phone number as displayed (default: (31) 98969-3506)
//! - `CONTACT_EMAIL` - Sales email (default: contato@linhaverde.com.br)
//! - `CONTACT_ADDRESS` - Store address
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use linha_verde_supabase::BackendMode;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error(transparent)]
    Backend(#[from] linha_verde_supabase::ConfigError),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Admin panel URL ("Área Administrativa" footer link)
    pub admin_url: String,
    /// Dealership contact details
    pub contact: ContactConfig,
    /// Record store the catalogue is read from
    pub backend: BackendMode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Contact details rendered on every page and used for the detail page's
/// WhatsApp and email actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    /// WhatsApp number, digits only with country code (`wa.me` format).
    pub whatsapp: String,
    /// Phone number as shown to visitors.
    pub phone_display: String,
    pub email: String,
    pub address: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            whatsapp: "5531989693506".to_string(),
            phone_display: "(31) 98969-3506".to_string(),
            email: "contato@linhaverde.com.br".to_string(),
            address: "Av. Cristiano Machado, 2650, bairro Cidade Nova - BH".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the selected backend
    /// is missing its settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let admin_url = get_env_or_default("ADMIN_URL", "http://localhost:3001");
        let contact = ContactConfig::from_env()?;
        let backend = BackendMode::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            admin_url,
            contact,
            backend,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Defaults for tests and local runs, bound to loopback.
    #[must_use]
    pub fn local(backend: BackendMode) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            admin_url: "http://localhost:3001".to_string(),
            contact: ContactConfig::default(),
            backend,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ContactConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let whatsapp = get_env_or_default("CONTACT_WHATSAPP", &defaults.whatsapp);
        if whatsapp.is_empty() || !whatsapp.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "CONTACT_WHATSAPP".to_string(),
                "must contain only digits, including the country code".to_string(),
            ));
        }

        Ok(Self {
            whatsapp,
            phone_display: get_env_or_default("CONTACT_PHONE", &defaults.phone_display),
            email: get_env_or_default("CONTACT_EMAIL", &defaults.email),
            address: get_env_or_default("CONTACT_ADDRESS", &defaults.address),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::local(BackendMode::Memory);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_default_contact() {
        let contact = ContactConfig::default();
        assert_eq!(contact.whatsapp, "5531989693506");
        assert_eq!(contact.email, "contato@linhaverde.com.br");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = ConfigError::from(linha_verde_supabase::ConfigError::MissingEnvVar(
            "SUPABASE_URL".to_string(),
        ));
        assert_eq!(err.to_string(), "Missing environment variable: SUPABASE_URL");
    }
}
