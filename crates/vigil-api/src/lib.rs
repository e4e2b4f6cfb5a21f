//! Axum HTTP API server.
//!
//! This crate provides:
//! - Clip detection endpoint (multipart upload through the pipeline)
//! - Manual alert trigger and alert listing
//! - Alert media upload and presigned retrieval
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
