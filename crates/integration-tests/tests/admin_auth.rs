//! Integration tests for operator sign-in, sign-up, the route guard and
//! sign-out.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Method, StatusCode, header};
use linha_verde_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, admin_client, signed_in_admin,
};
use linha_verde_core::VehicleId;
use linha_verde_supabase::{MemoryBackend, Operation};

// ============================================================================
// Guard
// ============================================================================

#[tokio::test]
async fn test_admin_routes_redirect_to_login_without_session() {
    let (mut client, memory) = admin_client(MemoryBackend::with_samples());

    for path in ["/admin", "/admin/editor", "/admin/vehicles/1/delete"] {
        let response = client.get(path).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/login"), "{path}");
    }

    let response = client.post_form("/admin/vehicles/1/delete", &[("confirm", "yes")]).await;
    assert_eq!(response.location(), Some("/login"));

    assert!(memory.calls_of(Operation::List).is_empty());
    assert!(memory.calls_of(Operation::Get).is_empty());
    assert!(memory.calls_of(Operation::Delete).is_empty());
    assert_eq!(memory.records().len(), 3);
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_login_page_renders_form() {
    let (mut client, _memory) = admin_client(MemoryBackend::new());

    let response = client.get("/login").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Área Administrativa"));
    assert!(response.body.contains("formaction=\"/login/signup\""));
    assert!(response.body.contains("/login/events"));
}

#[tokio::test]
async fn test_login_with_wrong_password_shows_backend_message() {
    let (mut client, _memory) = admin_client(MemoryBackend::new());

    let response = client
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "errada")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid login credentials"));
    assert!(response.body.contains(ADMIN_EMAIL));

    let response = client.get("/admin").await;
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_login_then_panel() {
    let (mut client, _memory) = signed_in_admin(MemoryBackend::with_samples()).await;

    let response = client.get("/admin").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(&format!("Olá, {ADMIN_EMAIL}")));
    assert!(response.body.contains("Veículos em Estoque"));
}

#[tokio::test]
async fn test_login_page_redirects_when_session_is_valid() {
    let (mut client, memory) = signed_in_admin(MemoryBackend::new()).await;

    let response = client.get("/login").await;

    assert_eq!(response.location(), Some("/admin"));
    assert_eq!(memory.calls_of(Operation::CurrentUser).len(), 1);
}

#[tokio::test]
async fn test_login_page_clears_stale_session() {
    let (mut client, memory) = signed_in_admin(MemoryBackend::new()).await;
    memory.expire_sessions();

    let response = client.get("/login").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Entrar"));

    let response = client.get("/admin").await;
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_login_events_follow_sign_in() {
    let (mut client, _memory) = admin_client(MemoryBackend::new());
    client.get("/login").await;

    let events = client
        .open(Method::GET, "/login/events", None, Body::empty())
        .await;
    assert_eq!(events.status(), StatusCode::OK);
    assert_eq!(
        events.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let response = client
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
        .await;
    assert_eq!(response.location(), Some("/admin"));

    let body = tokio::time::timeout(
        Duration::from_secs(5),
        to_bytes(events.into_body(), usize::MAX),
    )
    .await
    .unwrap()
    .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("event: signed-in"));
    assert!(body.contains("data: /admin"));
}

// ============================================================================
// Sign-up
// ============================================================================

#[tokio::test]
async fn test_signup_shows_confirmation_message() {
    let (mut client, memory) = admin_client(MemoryBackend::new());

    let response = client
        .post_form(
            "/login/signup",
            &[("email", "vendas@linhaverde.com.br"), ("password", "s3nh4-forte")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Verifique seu email para confirmar a conta."));
    assert_eq!(memory.calls_of(Operation::SignUp).len(), 1);
}

#[tokio::test]
async fn test_signup_shows_backend_message() {
    let (mut client, _memory) = admin_client(MemoryBackend::new());

    let response = client
        .post_form("/login/signup", &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("User already registered"));
}

// ============================================================================
// Token renewal
// ============================================================================

#[tokio::test]
async fn test_expiring_token_is_renewed_and_kept_in_session() {
    let memory = MemoryBackend::with_samples().with_session_lifetime(30);
    let (mut client, memory) = signed_in_admin(memory).await;
    // The token issued at sign-in stops working; only a renewed one can write.
    memory.expire_sessions();

    let response = client.get("/admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(memory.calls_of(Operation::Refresh).len(), 1);

    // Renewing again needs the refresh token stored by the previous request.
    let response = client
        .post_form("/admin/vehicles/2/delete", &[("confirm", "yes")])
        .await;
    assert_eq!(response.location(), Some("/admin"));
    assert_eq!(memory.calls_of(Operation::Refresh).len(), 2);
    assert!(memory.record(&VehicleId::from(2)).is_none());

    let list = client.get("/admin").await;
    assert!(list.body.contains("Veículo excluído com sucesso!"));
}

#[tokio::test]
async fn test_failed_renewal_signs_out() {
    let memory = MemoryBackend::with_samples().with_session_lifetime(30);
    let (mut client, memory) = signed_in_admin(memory).await;
    memory.fail(Operation::Refresh, "Invalid Refresh Token: Already Used");

    let response = client.get("/admin").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
    assert!(memory.calls_of(Operation::List).is_empty());

    // The session no longer holds the operator, so nothing is renewed.
    memory.clear_failures();
    let response = client.get("/admin").await;
    assert_eq!(response.location(), Some("/login"));
    assert_eq!(memory.calls_of(Operation::Refresh).len(), 1);
    assert!(memory.calls_of(Operation::List).is_empty());
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_logout_signs_out_and_closes_panel() {
    let (mut client, memory) = signed_in_admin(MemoryBackend::with_samples()).await;

    let response = client.post_form("/logout", &[]).await;
    assert_eq!(response.location(), Some("/login"));
    assert_eq!(memory.calls_of(Operation::SignOut).len(), 1);

    let response = client.get("/admin").await;
    assert_eq!(response.location(), Some("/login"));
}
