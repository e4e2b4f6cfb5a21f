//! HTTP request handlers.

pub mod alerts;
pub mod detect;
pub mod health;
pub mod media;

pub use health::health;
