//! ONNX Runtime video classifier.
//!
//! The pipeline treats classification as a black box behind the
//! [`Classifier`] trait: a preprocessed clip tensor goes in, a probability
//! distribution over the label manifest comes out. Inference is synchronous
//! and blocking with no retry; any runtime failure propagates instead of
//! being defaulted to a label.

pub mod error;
pub mod labels;
pub mod onnx;

pub use error::{ClassifierError, ClassifierResult};
pub use labels::LabelSet;
pub use onnx::{ClassifierConfig, OnnxClassifier};

use vigil_media::ClipTensor;
use vigil_models::Prediction;

/// Synchronous classifier over a preprocessed clip tensor.
pub trait Classifier: Send + Sync {
    /// Run a single forward pass and return the probability distribution
    /// over the label set, in class-index order.
    fn infer(&self, tensor: &ClipTensor) -> ClassifierResult<Vec<f32>>;

    /// Output dimensionality the classifier produces.
    fn num_labels(&self) -> usize;
}

/// Pick the winning label from a probability distribution.
///
/// Arg-max with ties broken by the first-encountered index. The distribution
/// length must match the label set; a mismatch here means the startup
/// validation was bypassed.
pub fn predict(probs: &[f32], labels: &LabelSet) -> ClassifierResult<Prediction> {
    if probs.len() != labels.len() {
        return Err(ClassifierError::LabelCountMismatch {
            labels: labels.len(),
            outputs: probs.len(),
        });
    }

    let mut best_index = 0;
    let mut best_prob = probs[0];
    for (index, &prob) in probs.iter().enumerate().skip(1) {
        if prob > best_prob {
            best_index = index;
            best_prob = prob;
        }
    }

    let label = labels
        .get(best_index)
        .ok_or_else(|| ClassifierError::inference("Winning index out of label range"))?;

    Ok(Prediction {
        label: label.to_string(),
        confidence: best_prob.clamp(0.0, 1.0),
    })
}

/// Numerically stable softmax over raw logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_labels() -> LabelSet {
        LabelSet::from_json(
            r#"["burglary", "normal", "robbery", "shoplifting", "stealing", "violence"]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_predict_argmax() {
        let labels = six_labels();
        let probs = [0.05, 0.1, 0.6, 0.1, 0.1, 0.05];
        let prediction = predict(&probs, &labels).unwrap();
        assert_eq!(prediction.label, "robbery");
        assert!((prediction.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_predict_tie_breaks_to_first_index() {
        let labels = six_labels();
        let probs = [0.3, 0.1, 0.3, 0.1, 0.1, 0.1];
        let prediction = predict(&probs, &labels).unwrap();
        assert_eq!(prediction.label, "burglary");
    }

    #[test]
    fn test_predict_rejects_width_mismatch() {
        let labels = six_labels();
        let probs = [0.5, 0.5];
        assert!(matches!(
            predict(&probs, &labels),
            Err(ClassifierError::LabelCountMismatch {
                labels: 6,
                outputs: 2
            })
        ));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
}
