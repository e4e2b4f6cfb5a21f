//! Deterministic frame sampling.
//!
//! Sampling picks `min(num_frames, frame_count)` evenly-spaced indices over
//! the clip, then decodes each selected frame with its own FFmpeg invocation.
//! Decodes run concurrently behind a semaphore and are reassembled in index
//! order. A corrupt frame is skipped rather than failing the whole clip; only
//! a clip where nothing decodes is rejected.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use metrics::{counter, histogram};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use vigil_models::ClipMetadata;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::SamplerConfig;
use crate::error::{MediaError, MediaResult};

/// Compute evenly-spaced sample indices over `[0, frame_count - 1]`.
///
/// Linear interpolation with truncation toward zero; the first index is
/// always 0 and, when more than one frame is sampled, the last is always
/// `frame_count - 1`. Indices are monotone non-decreasing, and strictly
/// increasing whenever `num_frames <= frame_count`.
pub fn sample_indices(frame_count: i64, num_frames: usize) -> MediaResult<Vec<i64>> {
    let k = (num_frames as i64).min(frame_count);
    if k <= 0 {
        return Err(MediaError::InsufficientFrames);
    }

    if k == 1 {
        return Ok(vec![0]);
    }

    // i * (n - 1) / (k - 1) in integer arithmetic truncates exactly like the
    // interpolate-then-floor formulation, with exact endpoints.
    let indices = (0..k)
        .map(|i| i * (frame_count - 1) / (k - 1))
        .collect();

    Ok(indices)
}

/// Decode the sampled frames of a validated clip.
///
/// Returns the successfully decoded frames in sample order. Per-frame decode
/// failures are logged and skipped; `DecodeFailure` is returned only when no
/// frame decodes at all.
pub async fn extract_frames(
    path: impl AsRef<Path>,
    metadata: &ClipMetadata,
    config: &SamplerConfig,
) -> MediaResult<Vec<RgbImage>> {
    let path = path.as_ref().to_path_buf();
    let indices = sample_indices(metadata.frame_count, config.num_frames)?;

    debug!(
        frame_count = metadata.frame_count,
        sampled = indices.len(),
        "Sampling frames"
    );

    let start = std::time::Instant::now();
    let tmp_dir = Arc::new(tempfile::tempdir()?);
    let semaphore = Arc::new(Semaphore::new(config.max_parallel_decodes.max(1)));
    let runner = FfmpegRunner::new().with_timeout(config.decode_timeout_secs);

    let mut handles = Vec::with_capacity(indices.len());
    for idx in indices {
        let path = path.clone();
        let tmp_dir = Arc::clone(&tmp_dir);
        let semaphore = Arc::clone(&semaphore);
        let runner = runner.clone();

        handles.push(tokio::spawn(async move {
            // Semaphore bounds concurrent FFmpeg processes.
            let _permit = semaphore.acquire_owned().await.ok()?;
            match decode_frame(&runner, &path, &tmp_dir, idx).await {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!(frame_index = idx, error = %e, "Skipping undecodable frame");
                    counter!("vigil_frame_decode_failures_total").increment(1);
                    None
                }
            }
        }));
    }

    // Await in spawn order so frames come back in index order.
    let mut frames = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Ok(Some(frame)) = handle.await {
            frames.push(frame);
        }
    }

    histogram!("vigil_frame_sampling_duration_seconds").record(start.elapsed().as_secs_f64());

    if frames.is_empty() {
        return Err(MediaError::DecodeFailure);
    }

    Ok(frames)
}

/// Decode a single frame by index to an RGB image.
async fn decode_frame(
    runner: &FfmpegRunner,
    clip_path: &Path,
    tmp_dir: &tempfile::TempDir,
    index: i64,
) -> MediaResult<RgbImage> {
    let frame_path = tmp_dir.path().join(format!("frame_{index}.png"));

    let cmd = FfmpegCommand::new(clip_path, &frame_path)
        .video_filter(format!("select=eq(n\\,{index})"))
        .passthrough_sync()
        .frames(1);

    runner.run(&cmd).await?;

    let image = image::open(&frame_path)
        .map_err(|e| MediaError::InvalidVideo(format!("Frame {index} decode: {e}")))?;

    Ok(image.to_rgb8())
}
