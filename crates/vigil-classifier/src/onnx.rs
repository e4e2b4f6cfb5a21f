//! ONNX Runtime classifier implementation.

use std::path::PathBuf;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::info;

use vigil_media::{ClipTensor, TARGET_SIZE};

use crate::error::{ClassifierError, ClassifierResult};
use crate::labels::LabelSet;
use crate::{softmax, Classifier};

/// Configuration for the ONNX classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Path to the exported model file
    pub model_path: PathBuf,
    /// Path to the label manifest
    pub labels_path: PathBuf,
    /// Name of the model's logits output
    pub output_name: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/crime_detector.onnx"),
            labels_path: PathBuf::from("models/classes.json"),
            output_name: "output".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            labels_path: std::env::var("LABELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.labels_path),
            output_name: std::env::var("MODEL_OUTPUT_NAME").unwrap_or(defaults.output_name),
        }
    }
}

/// ONNX Runtime-backed video classifier.
///
/// The session is serialized behind a mutex; concurrent requests queue for
/// the forward pass. Callers run inference off latency-sensitive paths via
/// `spawn_blocking`.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    num_labels: usize,
}

impl OnnxClassifier {
    /// Load the model and bind it to a label set.
    pub fn load(config: &ClassifierConfig, labels: &LabelSet) -> ClassifierResult<Self> {
        if !config.model_path.exists() {
            return Err(ClassifierError::ModelNotFound(config.model_path.clone()));
        }

        let model_bytes = std::fs::read(&config.model_path)
            .map_err(|e| ClassifierError::inference(format!("ORT read model file: {e}")))?;

        let session = Session::builder()
            .map_err(|e| ClassifierError::inference(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::inference(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| ClassifierError::inference(format!("ORT load model: {e}")))?;

        info!(
            model = %config.model_path.display(),
            labels = labels.len(),
            "Loaded ONNX classifier"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name: config.output_name.clone(),
            num_labels: labels.len(),
        })
    }

    /// Run a throwaway forward pass to validate the model's output width
    /// against the label manifest. Called once at startup; a mismatch here
    /// refuses to serve rather than misclassifying every request.
    pub fn warm_up(&self, num_frames: usize) -> ClassifierResult<()> {
        let tensor = ClipTensor::zeros((1, 3, num_frames.max(1), TARGET_SIZE, TARGET_SIZE));
        self.infer(&tensor)?;
        Ok(())
    }

    fn run_forward(&self, tensor: &ClipTensor) -> ClassifierResult<Vec<f32>> {
        let shape: Vec<usize> = tensor.shape().to_vec();
        let data: Box<[f32]> = tensor
            .as_slice()
            .map(|s| s.to_vec().into_boxed_slice())
            .unwrap_or_else(|| tensor.iter().copied().collect());

        let input: Value = Tensor::from_array((shape, data))
            .map(Value::from)
            .map_err(|e| ClassifierError::inference(format!("ORT tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::inference("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ClassifierError::inference(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| {
                ClassifierError::inference(format!(
                    "ORT returned no output named {}",
                    self.output_name
                ))
            })?;

        let (_, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::inference(format!("ORT extract: {e}")))?;

        Ok(logits.to_vec())
    }
}

impl Classifier for OnnxClassifier {
    fn infer(&self, tensor: &ClipTensor) -> ClassifierResult<Vec<f32>> {
        let logits = self.run_forward(tensor)?;

        if logits.len() != self.num_labels {
            return Err(ClassifierError::LabelCountMismatch {
                labels: self.num_labels,
                outputs: logits.len(),
            });
        }

        Ok(softmax(&logits))
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.model_path, PathBuf::from("models/crime_detector.onnx"));
        assert_eq!(config.labels_path, PathBuf::from("models/classes.json"));
        assert_eq!(config.output_name, "output");
    }

    #[test]
    fn test_load_missing_model() {
        let config = ClassifierConfig {
            model_path: PathBuf::from("/nonexistent/model.onnx"),
            ..Default::default()
        };
        let labels = LabelSet::from_json(r#"["normal", "violence"]"#).unwrap();
        assert!(matches!(
            OnnxClassifier::load(&config, &labels),
            Err(ClassifierError::ModelNotFound(_))
        ));
    }
}
