//! Repository implementations for database operations.

pub mod device;
pub mod presence;
pub mod transition_event;

pub use device::DeviceRepository;
pub use presence::{AppliedSighting, PresenceRepository};
pub use transition_event::TransitionEventRepository;
