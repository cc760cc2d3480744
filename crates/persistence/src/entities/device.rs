//! Device entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: i64,
    pub uuid: String,
    pub short_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub registered_at: DateTime<Utc>,
}

impl From<DeviceEntity> for domain::models::Device {
    fn from(entity: DeviceEntity) -> Self {
        // The internal row id stays internal.
        Self {
            uuid: entity.uuid,
            short_id: entity.short_id,
            metadata: entity.metadata,
            registered_at: entity.registered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_conversion_drops_row_id() {
        let entity = DeviceEntity {
            id: 42,
            uuid: "device-abc".to_string(),
            short_id: Some("pixel".to_string()),
            metadata: Some(serde_json::json!({"model": "Pixel 5"})),
            registered_at: Utc::now(),
        };
        let device: domain::models::Device = entity.into();
        let json = serde_json::to_string(&device).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("device-abc"));
    }
}
