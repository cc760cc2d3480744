//! Domain layer for the beacon presence service.
//!
//! This crate contains:
//! - Domain models (Device, PresenceRecord, TransitionEvent)
//! - Request/response DTOs for the HTTP layer
//! - The presence classifier (debouncing state machine)

pub mod models;
pub mod services;
