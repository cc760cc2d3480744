//! Presence entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::presence::{PresenceRecord, PresenceState, TransitionType};
use domain::services::classifier::PresenceSnapshot;

/// Database row mapping for the presence table.
///
/// `state` and `last_event` are stored as text; parsing happens at the edge
/// so that a corrupted row degrades instead of failing the request.
#[derive(Debug, Clone, FromRow)]
pub struct PresenceEntity {
    pub id: i64,
    pub device_uuid: String,
    pub beacon_id: String,
    pub state: String,
    pub last_event: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_rssi: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PresenceEntity {
    /// Parse the stored state, treating unknown values as `outside`.
    ///
    /// A missing record already means `outside`, so a row we cannot read is
    /// degraded to the same baseline rather than rejected.
    pub fn parsed_state(&self) -> PresenceState {
        PresenceState::parse(&self.state).unwrap_or_else(|| {
            tracing::warn!(
                device_uuid = %self.device_uuid,
                beacon_id = %self.beacon_id,
                state = %self.state,
                "Unparsable presence state in store; treating as outside"
            );
            PresenceState::Outside
        })
    }

    /// Parse the stored last event, defaulting consistently with the state.
    pub fn parsed_last_event(&self) -> TransitionType {
        TransitionType::parse(&self.last_event).unwrap_or_else(|| {
            tracing::warn!(
                device_uuid = %self.device_uuid,
                beacon_id = %self.beacon_id,
                last_event = %self.last_event,
                "Unparsable last_event in store; deriving from state"
            );
            match self.parsed_state() {
                PresenceState::Inside => TransitionType::Entry,
                PresenceState::Outside => TransitionType::Exit,
            }
        })
    }

    /// The classifier's view of this row.
    pub fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            state: self.parsed_state(),
            last_event: self.parsed_last_event(),
            last_seen: self.last_seen,
        }
    }
}

impl From<PresenceEntity> for PresenceRecord {
    fn from(entity: PresenceEntity) -> Self {
        let state = entity.parsed_state();
        let last_event = entity.parsed_last_event();
        Self {
            device_uuid: entity.device_uuid,
            beacon_id: entity.beacon_id,
            state,
            last_event,
            last_seen: entity.last_seen,
            last_rssi: entity.last_rssi,
            updated_at: entity.updated_at,
        }
    }
}
