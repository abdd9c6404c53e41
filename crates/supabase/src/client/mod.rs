//! HTTP client for a Supabase project.
//!
//! One [`SupabaseClient`] implements all three capability traits:
//!
//! - `rest` - [`RecordStore`](crate::RecordStore) over `/rest/v1`
//! - `auth` - [`AuthService`](crate::AuthService) over `/auth/v1`
//! - `storage` - [`BlobStorage`](crate::BlobStorage) over `/storage/v1`
//!
//! Every request carries the project's anon key as `apikey`. Reads are
//! authorized with the anon key; writes carry the signed-in user's access
//! token so row-level security applies.

mod auth;
mod rest;
mod storage;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::SupabaseConfig;
use crate::error::BackendError;
use crate::types::AccessToken;

/// Supabase API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    /// Project base URL without trailing slash.
    base_url: String,
    anon_key: SecretString,
    vehicles_table: String,
    images_bucket: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url)
            .field("anon_key", &"[REDACTED]")
            .field("vehicles_table", &self.inner.vehicles_table)
            .field("images_bucket", &self.inner.images_bucket)
            .finish()
    }
}

/// Error body shapes used across the Supabase services:
/// `PostgREST` and Storage send `message`, `GoTrue` sends `msg` or
/// `error_description`, older endpoints only `error`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl SupabaseClient {
    /// Create a client for the configured project.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
                vehicles_table: config.vehicles_table.clone(),
                images_bucket: config.images_bucket.clone(),
            }),
        }
    }

    /// Absolute URL of a service path such as `rest/v1/vehicles`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with the `apikey` header and a bearer token (the
    /// user's token when given, the anon key otherwise).
    fn request(&self, method: Method, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        let bearer = token.map_or_else(|| self.inner.anon_key.expose_secret(), AccessToken::expose);
        self.inner
            .client
            .request(method, self.endpoint(path))
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer)
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        let response = Self::send(request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request, turning error statuses into [`BackendError::Service`].
    async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), message = %message, "Backend request failed");
        Err(BackendError::service(status.as_u16(), message))
    }
}

/// Pick the human-readable message out of an error body, falling back to the
/// raw body and then the status reason.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    [parsed.message, parsed.msg, parsed.error_description, parsed.error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .or_else(|| {
            let body = body.trim();
            (!body.is_empty() && !body.starts_with('{')).then(|| body.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
        })
}
