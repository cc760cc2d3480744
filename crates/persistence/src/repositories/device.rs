//! Device registry repository.

use chrono::Utc;
use sqlx::PgPool;

use crate::entities::DeviceEntity;

/// Repository for the device identity collection.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register an identity if it is not already known.
    ///
    /// Returns `Some(entity)` when a new row was created and `None` when the
    /// identity was already registered. Registration is idempotent; the unique
    /// index on `uuid` enforces it under concurrent callers.
    pub async fn insert_if_absent(
        &self,
        uuid: &str,
        short_id: Option<&str>,
        metadata: Option<&serde_json::Value>,
    ) -> Result<Option<DeviceEntity>, sqlx::Error> {
        sqlx::query_as::<_, DeviceEntity>(
            r#"
            INSERT INTO devices (uuid, short_id, metadata, registered_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (uuid) DO NOTHING
            RETURNING id, uuid, short_id, metadata, registered_at
            "#,
        )
        .bind(uuid)
        .bind(short_id)
        .bind(metadata)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
    }

    /// Check whether an identity is registered.
    pub async fn exists(&self, uuid: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM devices WHERE uuid = $1)")
                .bind(uuid)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    /// All registered identities, oldest first.
    pub async fn list_all(&self) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, uuid, short_id, metadata, registered_at
            FROM devices
            ORDER BY registered_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
