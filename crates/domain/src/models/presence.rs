//! Presence models and sighting DTOs.
//!
//! A presence record holds the latest known inside/outside state for one
//! (device, beacon) pair. A sighting is one report from a beacon node that a
//! device was observed nearby.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Logical presence state for a (device, beacon) pair.
///
/// A missing record is equivalent to `Outside`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Inside,
    Outside,
}

impl PresenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Outside => "outside",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inside" => Some(Self::Inside),
            "outside" => Some(Self::Outside),
            _ => None,
        }
    }
}

impl std::fmt::Display for PresenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepted transition type recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Entry,
    Exit,
}

impl TransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(Self::Entry),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification result for one sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightingOutcome {
    Entry,
    Exit,
    HeartbeatSuppressed,
}

impl SightingOutcome {
    /// The transition to append to history, if any. Suppressed heartbeats
    /// produce no history record.
    pub fn transition(&self) -> Option<TransitionType> {
        match self {
            Self::Entry => Some(TransitionType::Entry),
            Self::Exit => Some(TransitionType::Exit),
            Self::HeartbeatSuppressed => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::HeartbeatSuppressed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::HeartbeatSuppressed => "heartbeat",
        }
    }
}

/// Domain model for the current presence of a device at a beacon.
#[derive(Debug, Clone)]
pub struct PresenceRecord {
    pub device_uuid: String,
    pub beacon_id: String,
    pub state: PresenceState,
    pub last_event: TransitionType,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_rssi: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for one beacon sighting.
/// POST /api/ble_event
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BleEventRequest {
    #[validate(required(message = "Missing uuid field"), length(min = 1, message = "uuid must not be empty"))]
    pub uuid: Option<String>,
    #[validate(required(message = "Missing beacon_id field"), length(min = 1, message = "beacon_id must not be empty"))]
    #[serde(default, deserialize_with = "string_or_number")]
    pub beacon_id: Option<String>,
    /// Received signal strength in dBm, informational.
    pub rssi: Option<i32>,
    /// Beacon-local timestamp, recorded on the history row but never used
    /// for classification.
    pub timestamp: Option<String>,
}

impl BleEventRequest {
    /// Parse the beacon-supplied timestamp, if present and well formed.
    ///
    /// Beacon firmware sends either RFC 3339 or a naive ISO 8601 instant;
    /// naive values are taken as UTC. Unparsable values are dropped rather
    /// than rejected.
    pub fn reported_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        tracing::warn!(timestamp = raw, "Dropping unparsable sighting timestamp");
        None
    }
}

/// Beacon firmware reports numeric beacon ids; treat them as opaque strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// Response body for an ingested sighting.
/// 201 `{success, type}` for accepted transitions,
/// 201 `{success, suppressed: true}` for heartbeats.
#[derive(Debug, Serialize)]
pub struct BleEventResponse {
    pub success: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppressed: Option<bool>,
}

impl BleEventResponse {
    pub fn from_outcome(outcome: SightingOutcome) -> Self {
        match outcome.transition() {
            Some(transition) => Self {
                success: true,
                transition: Some(transition),
                suppressed: None,
            },
            None => Self {
                success: true,
                transition: None,
                suppressed: Some(true),
            },
        }
    }
}
