//! Clip probing and duration validation.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use vigil_models::ClipMetadata;

use crate::config::SamplerConfig;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

/// Write raw clip bytes to a temp file so FFmpeg tools can read them.
///
/// The file is deleted when the returned handle drops, so callers must keep
/// it alive for the whole validate/sample sequence.
pub async fn write_clip_tempfile(bytes: &[u8]) -> MediaResult<NamedTempFile> {
    let tmp = tempfile::Builder::new().suffix(".mp4").tempfile()?;
    tokio::fs::write(tmp.path(), bytes).await?;
    Ok(tmp)
}

/// Probe a clip file for container-level metadata.
///
/// Only metadata is decoded, never pixel data. Fails with `InvalidMetadata`
/// when the container reports a non-positive fps or frame count.
pub async fn probe_clip(path: impl AsRef<Path>) -> MediaResult<ClipMetadata> {
    let path = path.as_ref();

    crate::command::check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(0.0);

    // Prefer the stream's frame count; fall back to duration x fps when the
    // container omits nb_frames.
    let frame_count = video_stream
        .nb_frames
        .as_ref()
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .or_else(|| {
            probe
                .format
                .duration
                .as_ref()
                .and_then(|d| d.parse::<f64>().ok())
                .filter(|d| *d > 0.0 && fps > 0.0)
                .map(|d| (d * fps).round() as i64)
        })
        .unwrap_or(0);

    if fps <= 0.0 || frame_count <= 0 {
        return Err(MediaError::InvalidMetadata);
    }

    let metadata = ClipMetadata {
        frame_count,
        fps,
        duration_seconds: frame_count as f64 / fps,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        codec: video_stream.codec_name.clone().unwrap_or_default(),
    };

    debug!(
        frame_count = metadata.frame_count,
        fps = metadata.fps,
        duration_s = metadata.duration_seconds,
        "Probed clip"
    );

    Ok(metadata)
}

/// Validate a clip against the configured duration bounds.
///
/// The classifier is calibrated on short clips, so anything outside the
/// closed `[min_duration_s, max_duration_s]` interval is rejected rather
/// than silently degrading accuracy.
pub async fn validate_clip(
    path: impl AsRef<Path>,
    config: &SamplerConfig,
) -> MediaResult<ClipMetadata> {
    let metadata = probe_clip(path).await?;

    let duration = metadata.duration_seconds;
    if duration < config.min_duration_s || duration > config.max_duration_s {
        return Err(MediaError::DurationOutOfRange {
            min: config.min_duration_s,
            max: config.max_duration_s,
            actual: duration,
        });
    }

    Ok(metadata)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
    }

    #[tokio::test]
    async fn test_probe_rejects_garbage_bytes() {
        if crate::command::check_ffprobe().is_err() {
            return;
        }
        let tmp = write_clip_tempfile(b"not a video").await.unwrap();
        let result = probe_clip(tmp.path()).await;
        assert!(result.is_err());
    }
}
