//! Transition event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::presence::TransitionType;
use domain::models::TransitionEvent;

/// Database row mapping for the append-only transition_events table.
#[derive(Debug, Clone, FromRow)]
pub struct TransitionEventEntity {
    pub id: i64,
    pub device_uuid: String,
    pub beacon_id: String,
    pub rssi: Option<i32>,
    pub transition: String,
    pub occurred_at: DateTime<Utc>,
    pub reported_at: Option<DateTime<Utc>>,
    pub recorded_at: DateTime<Utc>,
}

impl From<TransitionEventEntity> for TransitionEvent {
    fn from(entity: TransitionEventEntity) -> Self {
        let transition = TransitionType::parse(&entity.transition).unwrap_or_else(|| {
            tracing::warn!(
                id = entity.id,
                transition = %entity.transition,
                "Unparsable transition in history; reporting as exit"
            );
            TransitionType::Exit
        });
        Self {
            id: entity.id,
            device_uuid: entity.device_uuid,
            beacon_id: entity.beacon_id,
            rssi: entity.rssi,
            transition,
            occurred_at: entity.occurred_at,
            reported_at: entity.reported_at,
            recorded_at: entity.recorded_at,
        }
    }
}
