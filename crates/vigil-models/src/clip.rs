//! Clip metadata derived from container probing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Container-level metadata for a submitted clip.
///
/// Derived once by the validator and immutable afterwards. The duration is
/// always the computed `frame_count / fps`, not the container's own duration
/// field, so validation and sampling agree on the same number.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipMetadata {
    /// Total number of frames in the clip
    pub frame_count: i64,
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds (`frame_count / fps`)
    pub duration_seconds: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Video codec name
    pub codec: String,
}

impl ClipMetadata {
    /// Duration rounded to two decimals for API responses.
    pub fn duration_rounded(&self) -> f64 {
        (self.duration_seconds * 100.0).round() / 100.0
    }
}
