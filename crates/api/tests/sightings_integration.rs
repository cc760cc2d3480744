//! Integration tests for sighting ingestion and the presence state machine.
//!
//! These tests require a running PostgreSQL instance; set TEST_DATABASE_URL
//! and run with `cargo test -- --ignored`. Elapsed time is simulated by
//! backdating the stored last_seen rather than sleeping through the guard
//! window.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{
    backdate_last_seen, cleanup_device, create_test_app, create_test_pool, json_request,
    parse_response_body, run_migrations, test_config,
};
use domain::models::presence::SightingOutcome;
use persistence::repositories::{PresenceRepository, TransitionEventRepository};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

const BEACON: &str = "101";

fn fresh_uuid() -> String {
    format!("test-{}", Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_first_sighting_is_entry_with_one_history_row() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let uuid = fresh_uuid();

    let app = create_test_app(test_config(), pool.clone());
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/ble_event",
            json!({"uuid": uuid, "beacon_id": BEACON, "rssi": -70}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["type"], "entry");

    let presence = PresenceRepository::new(pool.clone());
    let record = presence.find_by_key(&uuid, BEACON).await.unwrap().unwrap();
    assert_eq!(record.state, "inside");
    assert_eq!(record.last_event, "entry");
    assert_eq!(record.last_rssi, Some(-70));
    assert!(record.last_seen.is_some());

    let history = TransitionEventRepository::new(pool.clone());
    assert_eq!(history.count_for_key(&uuid, BEACON).await.unwrap(), 1);

    cleanup_device(&pool, &uuid).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_rapid_resighting_is_suppressed_and_refreshes_recency() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let uuid = fresh_uuid();

    for (rssi, expect_entry) in [(-70, true), (-80, false)] {
        let app = create_test_app(test_config(), pool.clone());
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/ble_event",
                json!({"uuid": uuid, "beacon_id": BEACON, "rssi": rssi}),
            ))
            .await
            .unwrap();
        let body = parse_response_body(response).await;
        if expect_entry {
            assert_eq!(body["type"], "entry");
        } else {
            assert_eq!(body["suppressed"], true);
            assert!(body.get("type").is_none());
        }
    }

    // The heartbeat refreshed rssi but left state untouched, and appended
    // nothing to history.
    let presence = PresenceRepository::new(pool.clone());
    let record = presence.find_by_key(&uuid, BEACON).await.unwrap().unwrap();
    assert_eq!(record.state, "inside");
    assert_eq!(record.last_event, "entry");
    assert_eq!(record.last_rssi, Some(-80));

    let history = TransitionEventRepository::new(pool.clone());
    assert_eq!(history.count_for_key(&uuid, BEACON).await.unwrap(), 1);

    cleanup_device(&pool, &uuid).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_spaced_sightings_alternate_and_append_history() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let uuid = fresh_uuid();

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        let app = create_test_app(test_config(), pool.clone());
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/ble_event",
                json!({"uuid": uuid, "beacon_id": BEACON}),
            ))
            .await
            .unwrap();
        let body = parse_response_body(response).await;
        outcomes.push(body["type"].as_str().unwrap().to_string());
        // Simulate >8s of silence before the next sighting.
        backdate_last_seen(&pool, &uuid, BEACON, 10).await;
    }

    assert_eq!(outcomes, vec!["entry", "exit", "entry", "exit"]);

    let history = TransitionEventRepository::new(pool.clone());
    assert_eq!(history.count_for_key(&uuid, BEACON).await.unwrap(), 4);
    let events = history.recent_for_key(&uuid, BEACON, 10).await.unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].transition, "exit");

    cleanup_device(&pool, &uuid).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_flicker_lock_keeps_continuously_sighted_device_inside() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let uuid = fresh_uuid();

    let presence = PresenceRepository::new(pool.clone());
    let t0 = Utc::now();

    // t=0: absent record, entry.
    let applied = presence.apply_sighting(&uuid, BEACON, Some(-70), t0).await.unwrap();
    assert_eq!(applied.outcome, SightingOutcome::Entry);

    // t=3s: within the window.
    let applied = presence
        .apply_sighting(&uuid, BEACON, Some(-72), t0 + Duration::seconds(3))
        .await
        .unwrap();
    assert_eq!(applied.outcome, SightingOutcome::HeartbeatSuppressed);

    // t=10s: 10s after entry but only 7s after the refreshed last_seen.
    let applied = presence
        .apply_sighting(&uuid, BEACON, Some(-75), t0 + Duration::seconds(10))
        .await
        .unwrap();
    assert_eq!(applied.outcome, SightingOutcome::HeartbeatSuppressed);

    // t=12s: still refreshed.
    let applied = presence
        .apply_sighting(&uuid, BEACON, Some(-71), t0 + Duration::seconds(12))
        .await
        .unwrap();
    assert_eq!(applied.outcome, SightingOutcome::HeartbeatSuppressed);

    // t=20s: 8s since t=12, the guard has elapsed.
    let applied = presence
        .apply_sighting(&uuid, BEACON, Some(-90), t0 + Duration::seconds(20))
        .await
        .unwrap();
    assert_eq!(applied.outcome, SightingOutcome::Exit);

    cleanup_device(&pool, &uuid).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_guard_is_keyed_per_beacon() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let uuid = fresh_uuid();

    let presence = PresenceRepository::new(pool.clone());
    let now = Utc::now();

    let applied = presence.apply_sighting(&uuid, "101", None, now).await.unwrap();
    assert_eq!(applied.outcome, SightingOutcome::Entry);

    // Presence at beacon 101 does not affect classification at beacon 102.
    let applied = presence.apply_sighting(&uuid, "102", None, now).await.unwrap();
    assert_eq!(applied.outcome, SightingOutcome::Entry);

    cleanup_device(&pool, &uuid).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_concurrent_sightings_yield_one_entry() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let uuid = fresh_uuid();

    // Fire 8 concurrent sightings for the same key from an absent record.
    // Per-key serialization must admit exactly one Entry; the rest land
    // inside the guard window of whichever write preceded them.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let presence = PresenceRepository::new(pool.clone());
        let uuid = uuid.clone();
        handles.push(tokio::spawn(async move {
            presence
                .apply_sighting(&uuid, BEACON, Some(-70), Utc::now())
                .await
                .unwrap()
                .outcome
        }));
    }

    let mut entries = 0;
    let mut suppressed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            SightingOutcome::Entry => entries += 1,
            SightingOutcome::HeartbeatSuppressed => suppressed += 1,
            SightingOutcome::Exit => panic!("Exit cannot follow within the guard window"),
        }
    }
    assert_eq!(entries, 1);
    assert_eq!(suppressed, 7);

    let presence = PresenceRepository::new(pool.clone());
    let record = presence.find_by_key(&uuid, BEACON).await.unwrap().unwrap();
    assert_eq!(record.state, "inside");

    cleanup_device(&pool, &uuid).await;
}
