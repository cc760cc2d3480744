//! Presence classifier: the debouncing state machine for beacon sightings.
//!
//! BLE signal strength is noisy; a device hovering at the edge of range
//! produces rapid appear/disappear flicker. The classifier folds that flicker
//! into a single logical presence session: any sighting landing inside the
//! guard window of the previous write is downgraded to a heartbeat that only
//! refreshes recency data. The guard is keyed off `last_seen`, not off the
//! last accepted transition, so repeated heartbeats keep extending the
//! window and a continuously-sighted device never exits.
//!
//! The function is pure; callers are responsible for applying the returned
//! decision to the store atomically per (device, beacon) key.

use chrono::{DateTime, Duration, Utc};

use crate::models::presence::{PresenceState, SightingOutcome, TransitionType};

/// Minimum elapsed time since `last_seen` before an exit is accepted.
pub const GUARD_WINDOW_SECS: i64 = 8;

/// The guard window as a duration.
pub fn guard_window() -> Duration {
    Duration::seconds(GUARD_WINDOW_SECS)
}

/// What the store currently holds for a (device, beacon) key.
///
/// `last_seen` is optional: a record whose timestamp was corrupted or cleared
/// is still classifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub state: PresenceState,
    pub last_event: TransitionType,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Classification of one sighting plus the record fields to write back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub outcome: SightingOutcome,
    /// State to store; unchanged from the snapshot for heartbeats.
    pub state: PresenceState,
    /// Last accepted transition to store; unchanged for heartbeats.
    pub last_event: TransitionType,
}

/// Classify one sighting against the current presence snapshot.
///
/// - No snapshot, or state `outside`: the device just appeared -> `Entry`.
/// - State `inside` with `last_seen` within the guard window: flicker or
///   periodic re-sighting -> `HeartbeatSuppressed`.
/// - State `inside` with the window elapsed: the device left and came back
///   (or this sighting is the stale edge of a departure) -> `Exit`.
///
/// A missing `last_seen` fails the guard check open: the sighting is treated
/// as a real transition rather than leaving the key stuck `inside` forever.
/// `last_seen` itself is always refreshed by the caller, whatever the outcome.
pub fn classify(prior: Option<&PresenceSnapshot>, now: DateTime<Utc>) -> Decision {
    let snapshot = match prior {
        Some(snapshot) if snapshot.state == PresenceState::Inside => snapshot,
        // Absent record or outside state: the sighting is an entry.
        _ => {
            return Decision {
                outcome: SightingOutcome::Entry,
                state: PresenceState::Inside,
                last_event: TransitionType::Entry,
            }
        }
    };

    let within_guard = match snapshot.last_seen {
        Some(last_seen) => now.signed_duration_since(last_seen) < guard_window(),
        None => {
            tracing::warn!("Presence record has no last_seen; allowing transition");
            false
        }
    };

    if within_guard {
        Decision {
            outcome: SightingOutcome::HeartbeatSuppressed,
            state: snapshot.state,
            last_event: snapshot.last_event,
        }
    } else {
        Decision {
            outcome: SightingOutcome::Exit,
            state: PresenceState::Outside,
            last_event: TransitionType::Exit,
        }
    }
}
