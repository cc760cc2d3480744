//! Presence store repository and the atomic apply wrapper around the
//! classifier.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use domain::models::presence::{PresenceRecord, SightingOutcome};
use domain::services::classifier::{classify, Decision};

use crate::entities::PresenceEntity;

/// Result of atomically applying one sighting.
#[derive(Debug, Clone)]
pub struct AppliedSighting {
    pub outcome: SightingOutcome,
    pub record: PresenceRecord,
}

/// Repository for the per-(device, beacon) presence table.
#[derive(Clone)]
pub struct PresenceRepository {
    pool: PgPool,
}

impl PresenceRepository {
    /// Creates a new PresenceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current presence record for a key, if one exists.
    ///
    /// Read-only inspection for integration tests and operator diagnostics;
    /// the ingestion path never reads outside [`Self::apply_sighting`].
    pub async fn find_by_key(
        &self,
        device_uuid: &str,
        beacon_id: &str,
    ) -> Result<Option<PresenceEntity>, sqlx::Error> {
        sqlx::query_as::<_, PresenceEntity>(
            r#"
            SELECT id, device_uuid, beacon_id, state, last_event, last_seen,
                   last_rssi, created_at, updated_at
            FROM presence
            WHERE device_uuid = $1 AND beacon_id = $2
            "#,
        )
        .bind(device_uuid)
        .bind(beacon_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Classify one sighting and apply the resulting mutation, as a single
    /// serialized read-decide-write cycle for the key.
    ///
    /// Serialization uses a transaction-scoped advisory lock hashed from
    /// (device_uuid, beacon_id): concurrent sightings for the same key queue
    /// behind each other, while distinct keys proceed independently. Without
    /// the lock, two concurrent sightings against an `outside` record could
    /// both read `outside` and both classify as Entry.
    ///
    /// `last_seen` and `last_rssi` are refreshed on every call, including
    /// suppressed heartbeats.
    pub async fn apply_sighting(
        &self,
        device_uuid: &str,
        beacon_id: &str,
        rssi: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<AppliedSighting, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // chr(31) keeps "a|b" + "c" and "a" + "b|c" style keys distinct.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1 || chr(31) || $2, 0))")
            .bind(device_uuid)
            .bind(beacon_id)
            .execute(&mut *tx)
            .await?;

        let prior = sqlx::query_as::<_, PresenceEntity>(
            r#"
            SELECT id, device_uuid, beacon_id, state, last_event, last_seen,
                   last_rssi, created_at, updated_at
            FROM presence
            WHERE device_uuid = $1 AND beacon_id = $2
            "#,
        )
        .bind(device_uuid)
        .bind(beacon_id)
        .fetch_optional(&mut *tx)
        .await?;

        let snapshot = prior.as_ref().map(PresenceEntity::snapshot);
        let decision: Decision = classify(snapshot.as_ref(), now);

        let entity = sqlx::query_as::<_, PresenceEntity>(
            r#"
            INSERT INTO presence (device_uuid, beacon_id, state, last_event,
                                  last_seen, last_rssi, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (device_uuid, beacon_id) DO UPDATE SET
                state = EXCLUDED.state,
                last_event = EXCLUDED.last_event,
                last_seen = EXCLUDED.last_seen,
                last_rssi = EXCLUDED.last_rssi,
                updated_at = EXCLUDED.updated_at
            RETURNING id, device_uuid, beacon_id, state, last_event, last_seen,
                      last_rssi, created_at, updated_at
            "#,
        )
        .bind(device_uuid)
        .bind(beacon_id)
        .bind(decision.state.as_str())
        .bind(decision.last_event.as_str())
        .bind(now)
        .bind(rssi)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AppliedSighting {
            outcome: decision.outcome,
            record: entity.into(),
        })
    }
}
