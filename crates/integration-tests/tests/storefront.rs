//! Integration tests for the public catalogue and detail pages.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use linha_verde_core::{Amount, AmountKind, Vehicle, VehicleId, fallback};
use linha_verde_integration_tests::{TestClient, storefront_app};
use linha_verde_supabase::{MemoryBackend, Operation};

/// A stored vehicle distinct from the samples.
fn stored_vehicle(id: i64, name: &str, minutes_ago: i64) -> Vehicle {
    let mut vehicle = fallback::find(&VehicleId::from(1)).unwrap();
    vehicle.id = VehicleId::from(id);
    vehicle.name = name.to_string();
    vehicle.created_at = Some(Utc::now() - Duration::minutes(minutes_ago));
    vehicle
}

// ============================================================================
// Catalogue
// ============================================================================

#[tokio::test]
async fn test_catalogue_lists_stored_vehicles_newest_first() {
    let memory = MemoryBackend::new();
    memory.seed(stored_vehicle(10, "Fiat Argo Drive", 30));
    memory.seed(stored_vehicle(11, "Jeep Renegade Sport", 5));
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    let renegade = response.body.find("Jeep Renegade Sport").unwrap();
    let argo = response.body.find("Fiat Argo Drive").unwrap();
    assert!(renegade < argo);
    assert!(response.body.contains("/vehicle/11"));
    assert!(!response.body.contains("Toyota Corolla"));
}

#[tokio::test]
async fn test_catalogue_falls_back_to_samples_when_empty() {
    let memory = MemoryBackend::new();
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    for sample in fallback::catalogue() {
        assert!(response.body.contains(&sample.name), "missing {}", sample.name);
    }
}

#[tokio::test]
async fn test_catalogue_falls_back_to_samples_on_backend_error() {
    let memory = MemoryBackend::new();
    memory.fail(Operation::List, "connection refused");
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Honda Civic EXL"));
    assert_eq!(memory.calls_of(Operation::List).len(), 1);
}

#[tokio::test]
async fn test_catalogue_formats_prices() {
    let memory = MemoryBackend::new();
    let mut priced = stored_vehicle(10, "Fiat Argo Drive", 10);
    priced.price = Some(Amount::Number(Amount::parse("74900", AmountKind::Price).unwrap()));
    let mut unpriced = stored_vehicle(11, "Jeep Renegade Sport", 5);
    unpriced.price = None;
    memory.seed(priced);
    memory.seed(unpriced);
    let mut client = TestClient::new(storefront_app(&memory));

    let body = client.get("/").await.body;

    assert!(body.contains("R$ 74.900,00"));
    assert!(body.contains("R$ 0,00"));
}

#[tokio::test]
async fn test_catalogue_card_without_images() {
    let memory = MemoryBackend::new();
    let mut legacy = stored_vehicle(10, "Fiat Argo Drive", 10);
    legacy.images.clear();
    legacy.image = Some("https://cdn.example.com/argo.jpg".to_string());
    let mut bare = stored_vehicle(11, "Jeep Renegade Sport", 5);
    bare.images.clear();
    bare.image = None;
    memory.seed(legacy);
    memory.seed(bare);
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("https://cdn.example.com/argo.jpg"));
    assert!(response.body.contains("/static/images/placeholder.svg"));
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_detail_shows_stored_vehicle_with_contact_links() {
    let memory = MemoryBackend::new();
    memory.seed(stored_vehicle(10, "Fiat Argo Drive", 10));
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/vehicle/10").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Fiat Argo Drive"));
    assert!(response.body.contains("https://wa.me/5531989693506?text="));
    assert!(response.body.contains("mailto:contato@linhaverde.com.br?subject="));
}

#[tokio::test]
async fn test_detail_falls_back_to_sample_with_same_id() {
    let memory = MemoryBackend::new();
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/vehicle/2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Toyota Corolla"));
}

#[tokio::test]
async fn test_detail_not_found() {
    let memory = MemoryBackend::new();
    let mut client = TestClient::new(storefront_app(&memory));

    let response = client.get("/vehicle/999").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Veículo não encontrado"));
    assert!(response.body.contains("href=\"/\""));
}

#[tokio::test]
async fn test_detail_out_of_range_image_selects_cover() {
    let memory = MemoryBackend::new();
    let mut vehicle = stored_vehicle(10, "Fiat Argo Drive", 10);
    vehicle.images = vec!["/img/a.jpg".to_string(), "/img/b.jpg".to_string()];
    memory.seed(vehicle);
    let mut client = TestClient::new(storefront_app(&memory));

    let selected = client.get("/vehicle/10?image=1").await.body;
    let fallback = client.get("/vehicle/10?image=7").await.body;

    assert!(selected.contains("href=\"/vehicle/10?image=1\" class=\"selected\""));
    assert!(fallback.contains("href=\"/vehicle/10?image=0\" class=\"selected\""));
}
