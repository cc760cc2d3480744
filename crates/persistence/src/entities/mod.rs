//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod device;
pub mod presence;
pub mod transition_event;

pub use device::DeviceEntity;
pub use presence::PresenceEntity;
pub use transition_event::TransitionEventEntity;
