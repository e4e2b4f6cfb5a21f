//! Tensor preprocessing for the video classifier.
//!
//! Converts sampled RGB frames into the `(batch, channel, time, height,
//! width)` layout the model expects. The transformation is pure and
//! deterministic; an empty frame list is a caller contract violation and
//! panics rather than producing a degenerate tensor.

use image::RgbImage;
use ndarray::Array5;

/// 5-dimensional input tensor: `(1, 3, T, 224, 224)`.
pub type ClipTensor = Array5<f32>;

/// Target spatial resolution, fixed regardless of source clip size.
pub const TARGET_SIZE: usize = 224;

/// Per-channel normalization mean (ImageNet statistics).
pub const NORM_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel normalization standard deviation (ImageNet statistics).
pub const NORM_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Preprocess sampled frames into a model input tensor.
///
/// Order-sensitive steps: stack time-major, rescale `[0,255] -> [0,1]`,
/// permute to channel-first, bilinearly resample each frame to 224x224 with
/// half-pixel centers, then apply `(x - mean_c) / std_c`. Resampling operates
/// on rescaled values and normalization comes last, so the learned statistics
/// still match. The temporal axis passes through unchanged.
///
/// # Panics
///
/// Panics if `frames` is empty.
pub fn preprocess(frames: &[RgbImage]) -> ClipTensor {
    assert!(!frames.is_empty(), "preprocess requires at least one frame");

    let time_len = frames.len();
    let mut tensor = Array5::<f32>::zeros((1, 3, time_len, TARGET_SIZE, TARGET_SIZE));

    for (t, frame) in frames.iter().enumerate() {
        let (width, height) = frame.dimensions();
        for oy in 0..TARGET_SIZE {
            for ox in 0..TARGET_SIZE {
                let rgb = bilinear_sample(frame, width, height, ox, oy);
                for c in 0..3 {
                    tensor[[0, c, t, oy, ox]] = (rgb[c] - NORM_MEAN[c]) / NORM_STD[c];
                }
            }
        }
    }

    tensor
}

/// Bilinearly sample one output pixel, returning rescaled `[0,1]` RGB.
///
/// Half-pixel centers (`align_corners=false` semantics): output pixel `o`
/// maps to source coordinate `(o + 0.5) * scale - 0.5`.
fn bilinear_sample(frame: &RgbImage, width: u32, height: u32, ox: usize, oy: usize) -> [f32; 3] {
    let scale_x = width as f32 / TARGET_SIZE as f32;
    let scale_y = height as f32 / TARGET_SIZE as f32;

    let sx = (ox as f32 + 0.5) * scale_x - 0.5;
    let sy = (oy as f32 + 0.5) * scale_y - 0.5;

    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;

    let clamp_x = |x: f32| (x.max(0.0) as u32).min(width - 1);
    let clamp_y = |y: f32| (y.max(0.0) as u32).min(height - 1);

    let (x0i, x1i) = (clamp_x(x0), clamp_x(x0 + 1.0));
    let (y0i, y1i) = (clamp_y(y0), clamp_y(y0 + 1.0));

    let p00 = frame.get_pixel(x0i, y0i).0;
    let p10 = frame.get_pixel(x1i, y0i).0;
    let p01 = frame.get_pixel(x0i, y1i).0;
    let p11 = frame.get_pixel(x1i, y1i).0;

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy) / 255.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    #[test]
    fn test_output_shape() {
        let frames = vec![solid_frame(320, 240, [0, 0, 0]); 16];
        let tensor = preprocess(&frames);
        assert_eq!(tensor.shape(), &[1, 3, 16, 224, 224]);
    }

    #[test]
    fn test_temporal_axis_preserved() {
        let frames = vec![solid_frame(64, 64, [10, 20, 30]); 5];
        let tensor = preprocess(&frames);
        assert_eq!(tensor.shape()[2], 5);
    }

    #[test]
    fn test_uniform_frame_normalizes_exactly() {
        // A solid white frame rescales to 1.0 everywhere, so every value in
        // channel c must equal (1 - mean_c) / std_c.
        let frames = vec![solid_frame(100, 80, [255, 255, 255])];
        let tensor = preprocess(&frames);
        for c in 0..3 {
            let expected = (1.0 - NORM_MEAN[c]) / NORM_STD[c];
            let value = tensor[[0, c, 0, 100, 100]];
            assert!((value - expected).abs() < 1e-5, "channel {c}: {value}");
        }
    }

    #[test]
    fn test_values_bounded_by_normalization_constants() {
        let mut frame = solid_frame(50, 50, [0, 0, 0]);
        for (i, pixel) in frame.pixels_mut().enumerate() {
            let v = (i % 256) as u8;
            *pixel = Rgb([v, v.wrapping_add(40), v.wrapping_add(80)]);
        }
        let tensor = preprocess(&[frame]);

        for c in 0..3 {
            let lo = (0.0 - NORM_MEAN[c]) / NORM_STD[c];
            let hi = (1.0 - NORM_MEAN[c]) / NORM_STD[c];
            for &value in tensor.index_axis(ndarray::Axis(1), c).iter() {
                assert!(value >= lo - 1e-5 && value <= hi + 1e-5);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let frames = vec![solid_frame(33, 47, [7, 130, 201]); 3];
        let a = preprocess(&frames);
        let b = preprocess(&frames);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "at least one frame")]
    fn test_empty_input_panics() {
        preprocess(&[]);
    }
}
