//! FFmpeg CLI wrapper for clip handling.
//!
//! This crate provides:
//! - Container-level clip probing and duration validation
//! - Deterministic, evenly-spaced frame sampling with bounded-concurrency
//!   decoding
//! - Pure tensor preprocessing for the video classifier

pub mod command;
pub mod config;
pub mod error;
pub mod preprocess;
pub mod probe;
pub mod sampler;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::SamplerConfig;
pub use error::{MediaError, MediaResult};
pub use preprocess::{preprocess, ClipTensor, NORM_MEAN, NORM_STD, TARGET_SIZE};
pub use probe::{probe_clip, validate_clip, write_clip_tempfile};
pub use sampler::{extract_frames, sample_indices};
