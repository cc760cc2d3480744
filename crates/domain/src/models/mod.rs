//! Domain models for the beacon presence service.

pub mod device;
pub mod presence;
pub mod transition_event;

pub use device::Device;
pub use presence::{PresenceRecord, PresenceState, SightingOutcome, TransitionType};
pub use transition_event::TransitionEvent;
