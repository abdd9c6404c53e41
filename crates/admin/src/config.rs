//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend
//! - `LINHA_VERDE_BACKEND` - `supabase` (default) or `memory`
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` - required for `supabase`
//! - `SUPABASE_VEHICLES_TABLE`, `SUPABASE_IMAGES_BUCKET` - optional overrides
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: `http://localhost:3001`)
//! - `STOREFRONT_URL` - Public site, linked as "Ver Site" (default: `http://localhost:3000`)
//! - `ADMIN_MAX_UPLOAD_MB` - Request body limit for photo uploads (default: 25)
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Public storefront URL
    pub storefront_url: String,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
    /// Record store, auth and storage the panel works against
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

impl AdminConfig {
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

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001");
        let storefront_url = get_env_or_default("STOREFRONT_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();
        let max_upload_bytes = parse_upload_limit(&get_env_or_default("ADMIN_MAX_UPLOAD_MB", "25"))?;
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
            storefront_url,
            max_upload_bytes,
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
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            storefront_url: "http://localhost:3000".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
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

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Absolute URL for an image reference.
    ///
    /// Records created by the panel hold absolute bucket URLs; the sample
    /// catalogue holds paths relative to the storefront.
    #[must_use]
    pub fn image_url(&self, image: &str) -> String {
        if image.starts_with('/') {
            format!("{}{image}", self.storefront_url)
        } else {
            image.to_string()
        }
    }
}

fn parse_upload_limit(value: &str) -> Result<usize, ConfigError> {
    value
        .parse::<usize>()
        .ok()
        .filter(|mb| *mb > 0)
        .map(|mb| mb * 1024 * 1024)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "ADMIN_MAX_UPLOAD_MB".to_string(),
                format!("expected a positive number of megabytes, got '{value}'"),
            )
        })
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
