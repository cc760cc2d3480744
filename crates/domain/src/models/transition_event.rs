//! Transition event history model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::presence::TransitionType;

/// One accepted entry or exit, appended to history exactly once per accepted
/// sighting. Immutable after insert.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionEvent {
    pub id: i64,
    pub device_uuid: String,
    pub beacon_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    pub transition: TransitionType,
    /// Instant the classifier accepted the transition.
    pub occurred_at: DateTime<Utc>,
    /// Beacon-local timestamp from the sighting payload, if it was parsable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
    pub recorded_at: DateTime<Utc>,
}
