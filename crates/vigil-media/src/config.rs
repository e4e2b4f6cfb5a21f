//! Sampler configuration.

/// Configuration for clip validation and frame sampling.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Number of frames to sample per clip
    pub num_frames: usize,
    /// Minimum accepted clip duration in seconds
    pub min_duration_s: f64,
    /// Maximum accepted clip duration in seconds
    pub max_duration_s: f64,
    /// Maximum concurrent frame decodes
    pub max_parallel_decodes: usize,
    /// Per-frame decode timeout in seconds
    pub decode_timeout_secs: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_frames: 16,
            min_duration_s: 5.0,
            max_duration_s: 10.0,
            max_parallel_decodes: 4,
            decode_timeout_secs: 30,
        }
    }
}

impl SamplerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            num_frames: std::env::var("SAMPLER_NUM_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.num_frames),
            min_duration_s: std::env::var("CLIP_MIN_DURATION_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_duration_s),
            max_duration_s: std::env::var("CLIP_MAX_DURATION_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_duration_s),
            max_parallel_decodes: std::env::var("SAMPLER_MAX_PARALLEL_DECODES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_parallel_decodes),
            decode_timeout_secs: std::env::var("SAMPLER_DECODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.decode_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SamplerConfig::default();
        assert_eq!(config.num_frames, 16);
        assert!((config.min_duration_s - 5.0).abs() < f64::EPSILON);
        assert!((config.max_duration_s - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.max_parallel_decodes, 4);
    }
}
