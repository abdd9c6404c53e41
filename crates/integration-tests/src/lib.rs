//! Integration tests for Linha Verde.
//!
//! The routers are driven in-process with [`tower::ServiceExt::oneshot`]
//! against a [`MemoryBackend`], so the tests need neither a network nor a
//! Supabase project.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p linha-verde-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront` - Catalogue and detail pages
//! - `admin_auth` - Sign-in, sign-up, guard and sign-out
//! - `admin_inventory` - Listing, editor, submission and deletion

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::response::Response;
use linha_verde_admin::config::AdminConfig;
use linha_verde_storefront::config::StorefrontConfig;
use linha_verde_supabase::{Backend, BackendMode, MemoryBackend};
use tower::ServiceExt;

/// Operator account registered by [`admin_client`].
pub const ADMIN_EMAIL: &str = "admin@linhaverde.com.br";
pub const ADMIN_PASSWORD: &str = "s3nh4-forte";

/// Storefront router over `memory`.
pub fn storefront_app(memory: &MemoryBackend) -> Router {
    let backend = Backend::memory(memory);
    let state = linha_verde_storefront::state::AppState::with_records(
        StorefrontConfig::local(BackendMode::Memory),
        backend.records,
    );
    linha_verde_storefront::app(state)
}

/// Admin router over `memory`.
pub fn admin_app(memory: &MemoryBackend) -> Router {
    let state = linha_verde_admin::state::AppState::with_backend(
        AdminConfig::local(BackendMode::Memory),
        Backend::memory(memory),
    );
    linha_verde_admin::app(state)
}

/// A browser against the admin panel, not yet signed in.
///
/// `memory` gets the [`ADMIN_EMAIL`] account.
pub fn admin_client(memory: MemoryBackend) -> (TestClient, MemoryBackend) {
    let memory = memory.with_account(ADMIN_EMAIL, ADMIN_PASSWORD);
    (TestClient::new(admin_app(&memory)), memory)
}

/// A browser against the admin panel, signed in as [`ADMIN_EMAIL`].
///
/// # Panics
///
/// Panics if sign-in does not redirect to the panel.
pub async fn signed_in_admin(memory: MemoryBackend) -> (TestClient, MemoryBackend) {
    let (mut client, memory) = admin_client(memory);
    let response = client
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
        .await;
    assert_eq!(response.location(), Some("/admin"), "sign-in failed: {}", response.body);
    memory.clear_calls();
    (client, memory)
}

/// Response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// Target of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// One router plus the cookie a browser would carry between requests.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub const fn new(router: Router) -> Self {
        Self {
            router,
            cookie: None,
        }
    }

    /// Whether the server has set a session cookie.
    #[must_use]
    pub const fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, Body::empty()).await
    }

    /// POST an url-encoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Method::POST,
            path,
            Some("application/x-www-form-urlencoded".to_string()),
            Body::from(body),
        )
        .await
    }

    /// POST a multipart form.
    pub async fn post_multipart(&mut self, path: &str, form: MultipartForm) -> TestResponse {
        let (content_type, body) = form.encode();
        self.send(Method::POST, path, Some(content_type), Body::from(body))
            .await
    }

    /// Send one request and read the whole body.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        content_type: Option<String>,
        body: Body,
    ) -> TestResponse {
        let response = self.open(method, path, content_type, body).await;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            bytes,
        }
    }

    /// Send one request, carrying and updating the session cookie, and
    /// return the response with its body unread.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    #[allow(clippy::unwrap_used)]
    pub async fn open(
        &mut self,
        method: Method,
        path: &str,
        content_type: Option<String>,
        body: Body,
    ) -> Response {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().trim();
            self.cookie = pair
                .split_once('=')
                .is_some_and(|(_, value)| !value.is_empty())
                .then(|| pair.to_string());
        }

        response
    }
}

/// A `multipart/form-data` body built part by part.
#[derive(Debug, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

#[derive(Debug)]
struct Part {
    name: String,
    file: Option<(String, String)>,
    bytes: Vec<u8>,
}

impl MultipartForm {
    const BOUNDARY: &'static str = "linha-verde-test-boundary";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            file: None,
            bytes: value.as_bytes().to_vec(),
        });
        self
    }

    /// Add several text fields.
    #[must_use]
    pub fn texts(self, fields: &[(&str, &str)]) -> Self {
        fields
            .iter()
            .fold(self, |form, (name, value)| form.text(name, value))
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            file: Some((file_name.to_string(), content_type.to_string())),
            bytes: bytes.to_vec(),
        });
        self
    }

    /// Content type header value and encoded body.
    #[must_use]
    pub fn encode(&self) -> (String, Vec<u8>) {
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(format!("--{}\r\n", Self::BOUNDARY).as_bytes());
            match &part.file {
                Some((file_name, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                            part.name
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(&part.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", Self::BOUNDARY).as_bytes());

        (
            format!("multipart/form-data; boundary={}", Self::BOUNDARY),
            body,
        )
    }
}
