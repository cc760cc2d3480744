//! Device identity models and DTOs.
//!
//! A device identity is an opaque token generated by the tracked client at
//! first launch. Registration is idempotent; identities are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Domain model for a registered device identity.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    /// Client-generated opaque identity token.
    pub uuid: String,
    /// Optional human-readable short identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    /// Free-form client metadata (model, OS version, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub registered_at: DateTime<Utc>,
}

/// Request to register a device identity.
/// POST /api/register_device
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterDeviceRequest {
    #[validate(required(message = "Missing uuid field"), length(min = 1, message = "uuid must not be empty"))]
    pub uuid: Option<String>,
    #[validate(length(max = 64, message = "short_id too long"))]
    pub short_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Response for device registration.
#[derive(Debug, Serialize)]
pub struct RegisterDeviceResponse {
    pub success: bool,
    pub message: String,
}

/// Request to check whether an identity is registered.
/// POST /api/check_device
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckDeviceRequest {
    #[validate(required(message = "Missing uuid field"), length(min = 1, message = "uuid must not be empty"))]
    pub uuid: Option<String>,
    /// Sent by beacon firmware, accepted and ignored.
    #[serde(default)]
    pub beacon_id: Option<String>,
}

/// Response for an existence check.
#[derive(Debug, Serialize)]
pub struct CheckDeviceResponse {
    pub exists: bool,
}
