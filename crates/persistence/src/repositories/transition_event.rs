//! Transition event history repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use domain::models::presence::TransitionType;

use crate::entities::TransitionEventEntity;

/// Repository for the append-only transition history.
#[derive(Clone)]
pub struct TransitionEventRepository {
    pool: PgPool,
}

impl TransitionEventRepository {
    /// Creates a new TransitionEventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one accepted transition. Rows are never updated or deleted.
    pub async fn append(
        &self,
        device_uuid: &str,
        beacon_id: &str,
        rssi: Option<i32>,
        transition: TransitionType,
        occurred_at: DateTime<Utc>,
        reported_at: Option<DateTime<Utc>>,
    ) -> Result<TransitionEventEntity, sqlx::Error> {
        sqlx::query_as::<_, TransitionEventEntity>(
            r#"
            INSERT INTO transition_events
                (device_uuid, beacon_id, rssi, transition, occurred_at, reported_at, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, device_uuid, beacon_id, rssi, transition,
                      occurred_at, reported_at, recorded_at
            "#,
        )
        .bind(device_uuid)
        .bind(beacon_id)
        .bind(rssi)
        .bind(transition.as_str())
        .bind(occurred_at)
        .bind(reported_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    /// Number of history rows for one (device, beacon) key.
    ///
    /// Used by integration tests and diagnostics; no ingestion path counts.
    pub async fn count_for_key(
        &self,
        device_uuid: &str,
        beacon_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transition_events WHERE device_uuid = $1 AND beacon_id = $2",
        )
        .bind(device_uuid)
        .bind(beacon_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Most recent history rows for one key, newest first.
    ///
    /// Used by integration tests and diagnostics.
    pub async fn recent_for_key(
        &self,
        device_uuid: &str,
        beacon_id: &str,
        limit: i64,
    ) -> Result<Vec<TransitionEventEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransitionEventEntity>(
            r#"
            SELECT id, device_uuid, beacon_id, rssi, transition,
                   occurred_at, reported_at, recorded_at
            FROM transition_events
            WHERE device_uuid = $1 AND beacon_id = $2
            ORDER BY occurred_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(device_uuid)
        .bind(beacon_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
