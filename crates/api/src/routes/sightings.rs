//! Sighting ingestion endpoint handler.
//!
//! One POST per sighting from a beacon node. Validation happens before any
//! store access; the classifier plus its atomic apply decide whether the
//! sighting is an entry, an exit, or a suppressed heartbeat, and history is
//! appended only for accepted transitions.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use persistence::repositories::{PresenceRepository, TransitionEventRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_sighting_classified;
use domain::models::presence::{BleEventRequest, BleEventResponse};

/// Ingest one beacon sighting.
///
/// POST /api/ble_event
pub async fn ble_event(
    State(state): State<AppState>,
    Json(request): Json<BleEventRequest>,
) -> Result<(StatusCode, Json<BleEventResponse>), ApiError> {
    request.validate()?;
    let uuid = request
        .uuid
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Missing uuid field".to_string()))?;
    let beacon_id = request
        .beacon_id
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Missing beacon_id field".to_string()))?;

    let now = Utc::now();

    let presence = PresenceRepository::new(state.pool.clone());
    let applied = presence
        .apply_sighting(uuid, beacon_id, request.rssi, now)
        .await?;

    // History is appended outside the presence transaction: a failed append
    // after a committed presence write leaves the stores briefly
    // inconsistent, surfaced here as a 500 and not retried.
    if let Some(transition) = applied.outcome.transition() {
        let history = TransitionEventRepository::new(state.pool.clone());
        history
            .append(
                uuid,
                beacon_id,
                request.rssi,
                transition,
                now,
                request.reported_at(),
            )
            .await?;
    }

    record_sighting_classified(applied.outcome);
    info!(
        uuid = %uuid,
        beacon_id = %beacon_id,
        rssi = ?request.rssi,
        outcome = applied.outcome.as_str(),
        "Sighting classified"
    );

    Ok((
        StatusCode::CREATED,
        Json(BleEventResponse::from_outcome(applied.outcome)),
    ))
}
