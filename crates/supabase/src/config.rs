//! Backend configuration shared by every binary.
//!
//! # Environment Variables
//!
//! - `LINHA_VERDE_BACKEND` - `supabase` (default) or `memory`
//! - `SUPABASE_URL` - Project URL, e.g. `https://abcd.supabase.co` (required for `supabase`)
//! - `SUPABASE_ANON_KEY` - Project anon key (required for `supabase`)
//! - `SUPABASE_VEHICLES_TABLE` - Record table (default: `vehicles`)
//! - `SUPABASE_IMAGES_BUCKET` - Public image bucket (default: `vehicle-images`)

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default record table.
pub const DEFAULT_VEHICLES_TABLE: &str = "vehicles";
/// Default image bucket.
pub const DEFAULT_IMAGES_BUCKET: &str = "vehicle-images";

/// Errors raised while reading backend configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection settings for a Supabase project.
///
/// Implements `Debug` manually to redact the anon key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL.
    pub url: Url,
    /// Anon (public) API key, sent as `apikey` on every request.
    pub anon_key: SecretString,
    /// Table holding vehicle records.
    pub vehicles_table: String,
    /// Bucket holding vehicle photos.
    pub images_bucket: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("vehicles_table", &self.vehicles_table)
            .field("images_bucket", &self.images_bucket)
            .finish()
    }
}

impl SupabaseConfig {
    /// Settings with the default table and bucket names.
    #[must_use]
    pub fn new(url: Url, anon_key: SecretString) -> Self {
        Self {
            url,
            anon_key,
            vehicles_table: DEFAULT_VEHICLES_TABLE.to_string(),
            images_bucket: DEFAULT_IMAGES_BUCKET.to_string(),
        }
    }

    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL or key is missing, or the URL does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("SUPABASE_URL")?;
        let url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        let anon_key = SecretString::from(get_required_env("SUPABASE_ANON_KEY")?);

        Ok(Self {
            url,
            anon_key,
            vehicles_table: get_env_or_default("SUPABASE_VEHICLES_TABLE", DEFAULT_VEHICLES_TABLE),
            images_bucket: get_env_or_default("SUPABASE_IMAGES_BUCKET", DEFAULT_IMAGES_BUCKET),
        })
    }
}

/// Which backend implementation a binary runs against.
#[derive(Debug, Clone)]
pub enum BackendMode {
    /// A Supabase project.
    Supabase(SupabaseConfig),
    /// Process-local memory seeded with the sample catalogue. Nothing is
    /// shared between processes or persisted.
    Memory,
}

impl BackendMode {
    /// Load from `LINHA_VERDE_BACKEND` and, for `supabase`, the `SUPABASE_*`
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown mode or incomplete Supabase
    /// settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("LINHA_VERDE_BACKEND", "supabase").as_str() {
            "supabase" => Ok(Self::Supabase(SupabaseConfig::from_env()?)),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidEnvVar(
                "LINHA_VERDE_BACKEND".to_string(),
                format!("expected 'supabase' or 'memory', got '{other}'"),
            )),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Supabase(_) => "supabase",
            Self::Memory => "memory",
        }
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SupabaseConfig::new(
            Url::parse("https://abcd.supabase.co").unwrap(),
            SecretString::from("anon"),
        );
        assert_eq!(config.vehicles_table, "vehicles");
        assert_eq!(config.images_bucket, "vehicle-images");
    }

    #[test]
    fn test_debug_redacts_anon_key() {
        let config = SupabaseConfig::new(
            Url::parse("https://abcd.supabase.co").unwrap(),
            SecretString::from("super_secret_anon_key"),
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("abcd.supabase.co"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super_secret_anon_key"));
    }
}
