//! Shared data models for the Vigil detection backend.
//!
//! These types are serialized both over the wire (API responses, FCM data
//! payloads) and into the database, so they live in their own crate with no
//! heavyweight dependencies.

pub mod alert;
pub mod clip;
pub mod prediction;

pub use alert::{AlertCategory, AlertMethod, AlertStatus};
pub use clip::ClipMetadata;
pub use prediction::Prediction;
