//! Domain services.

pub mod classifier;
