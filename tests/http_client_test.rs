//! Contract tests for the reqwest-backed collaborator client: URL shapes,
//! query parameters, request bodies, and the HTTP status → error taxonomy
//! mapping.

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use freightline_core::client::{CollaboratorApi, HttpCollaborator};
use freightline_core::config::AppConfig;
use freightline_core::dto::{
    DocumentUpload, RawLocation, ShipmentListFilter, UpdateShipmentRequest,
};
use freightline_core::errors::ServiceError;
use freightline_core::models::ShipmentStatus;

async fn client_for(server: &MockServer) -> HttpCollaborator {
    let config = AppConfig::new(server.uri(), "test".into());
    HttpCollaborator::new(&config).unwrap()
}

fn update_request(admin_override: Option<bool>) -> UpdateShipmentRequest {
    UpdateShipmentRequest {
        reference: None,
        customer_name: "Acme".into(),
        client_id: None,
        sub_client_id: None,
        sub_client_name: None,
        origin: RawLocation {
            address: Some("1 Origin Way".into()),
            latitude: Some(40.7),
            longitude: Some(-74.0),
        },
        destination: RawLocation {
            address: Some("9 Harbor St".into()),
            latitude: Some(42.3),
            longitude: Some(-71.0),
        },
        driver: None,
        status: ShipmentStatus::Pending,
        shipping_cost: Decimal::ZERO,
        items: vec![],
        comments: None,
        invoice_ref: None,
        delivered_at: None,
        admin_override,
    }
}

#[tokio::test]
async fn fetches_and_normalizes_a_single_shipment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shipment/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "customer_name": "Acme",
            "status": "in_transit",
            "driver": 0,
            "items": [{ "id": 41, "description": "crate", "quantity": 2, "value": "19.99" }]
        })))
        .mount(&server)
        .await;

    let record = client_for(&server).await.get_shipment(3).await.unwrap();
    let shipment = record.into_shipment();
    assert_eq!(shipment.status, ShipmentStatus::InTransit);
    assert_eq!(shipment.items.len(), 1);
    assert_eq!(shipment.items[0].id.server_id(), Some(41));
    assert_eq!(shipment.assigned_driver_id(), None);
}

#[tokio::test]
async fn maps_404_to_not_found_and_403_to_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shipment/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shipment/403"))
        .respond_with(ResponseTemplate::new(403).set_body_string("tampered request"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shipment/500"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_matches!(
        client.get_shipment(404).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        client.get_shipment(403).await,
        Err(ServiceError::PermissionDenied(msg)) => assert_eq!(msg, "tampered request")
    );
    assert_matches!(
        client.get_shipment(500).await,
        Err(ServiceError::ExternalService(_))
    );
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    // A non-pooled server: `MockServer::start()` hands out a pooled server
    // whose listener stays open after drop, so the connection would succeed
    // and return 404 instead of being refused.
    let server = MockServer::builder().start().await;
    let client = client_for(&server).await;
    drop(server);

    let err = client.get_shipment(1).await.unwrap_err();
    assert_matches!(err, ServiceError::Transport(_));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn update_carries_admin_override_only_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/shipment/9"))
        .and(body_partial_json(json!({ "admin_override": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .update_shipment(9, &update_request(Some(true)))
        .await
        .unwrap();

    // Without the flag the body must omit the key entirely, so the mock
    // above no longer matches.
    let err = client
        .update_shipment(9, &update_request(None))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ExternalService(_) | ServiceError::NotFound(_));
}

#[tokio::test]
async fn list_shipments_passes_filters_as_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shipments"))
        .and(query_param("status", "pending"))
        .and(query_param("driver", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let filter = ShipmentListFilter {
        status: Some(ShipmentStatus::Pending),
        driver: Some(7),
    };
    let records = client_for(&server).await.list_shipments(&filter).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn driver_listing_queries_the_users_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("role", "driver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "A" },
            { "id": 2, "name": "B" }
        ])))
        .mount(&server)
        .await;

    let drivers = client_for(&server).await.list_drivers().await.unwrap();
    assert_eq!(drivers.len(), 2);
    assert_eq!(drivers[0].name, "A");
}

#[tokio::test]
async fn document_upload_and_delete_hit_the_document_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/shipment/6/document"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": "s3://pods/6.pdf" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/shipment/document/12"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let raw = client
        .upload_document(6, DocumentUpload::new("pod.pdf", "application/pdf", vec![0xFF]))
        .await
        .unwrap();
    let document = raw.normalize(6, "pod.pdf");
    assert_eq!(document.name, "pod.pdf");
    assert_eq!(document.content_ref, "s3://pods/6.pdf");

    client.delete_document(12).await.unwrap();
}
