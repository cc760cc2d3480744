//! Validation-path integration tests.
//!
//! These run against an unreachable lazy pool: a request that is rejected by
//! validation never touches the store, so a 400 here also proves no store
//! access happened (a store access would surface as a 500 instead).

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, get_request, json_request, parse_response_body, test_config, unreachable_pool};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_ble_event_missing_uuid_is_rejected_before_store_access() {
    let app = create_test_app(test_config(), unreachable_pool());

    let request = json_request(
        Method::POST,
        "/api/ble_event",
        json!({"beacon_id": "101", "rssi": -70}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("uuid"));
}

#[tokio::test]
async fn test_ble_event_missing_beacon_id_is_rejected() {
    let app = create_test_app(test_config(), unreachable_pool());

    let request = json_request(Method::POST, "/api/ble_event", json!({"uuid": "device-abc"}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ble_event_accepts_numeric_beacon_id_in_validation() {
    // Numeric beacon ids deserialize; the request then fails on the store,
    // not on validation.
    let app = create_test_app(test_config(), unreachable_pool());

    let request = json_request(
        Method::POST,
        "/api/ble_event",
        json!({"uuid": "device-abc", "beacon_id": 101}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_register_device_missing_uuid() {
    let app = create_test_app(test_config(), unreachable_pool());

    let request = json_request(
        Method::POST,
        "/api/register_device",
        json!({"metadata": {"model": "Pixel 5"}}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_device_empty_uuid() {
    let app = create_test_app(test_config(), unreachable_pool());

    let request = json_request(Method::POST, "/api/register_device", json!({"uuid": ""}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_device_missing_uuid() {
    let app = create_test_app(test_config(), unreachable_pool());

    let request = json_request(Method::POST, "/api/check_device", json!({"beacon_id": "101"}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_index_banner() {
    let app = create_test_app(test_config(), unreachable_pool());

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_liveness_probe_needs_no_store() {
    let app = create_test_app(test_config(), unreachable_pool());

    let response = app.oneshot(get_request("/api/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_probe_fails_without_store() {
    let app = create_test_app(test_config(), unreachable_pool());

    let response = app.oneshot(get_request("/api/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app(test_config(), unreachable_pool());

    let request = axum::http::Request::builder()
        .method(Method::GET)
        .uri("/")
        .header("X-Request-ID", "test-trace-42")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "test-trace-42"
    );
}
