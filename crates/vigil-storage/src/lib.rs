//! S3 blob storage for alert media.
//!
//! The pipeline and API only ever hold opaque object keys; uploads go under
//! a folder prefix with a generated UUID name, and retrieval happens through
//! short-lived presigned URLs.

pub mod client;
pub mod error;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
