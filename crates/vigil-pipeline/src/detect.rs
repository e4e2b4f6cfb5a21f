//! The detection pipeline: validate, sample, classify, dispatch.

use std::sync::Arc;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, info};

use vigil_classifier::{predict, Classifier, ClassifierError, LabelSet};
use vigil_media::{extract_frames, preprocess, validate_clip, write_clip_tempfile, SamplerConfig};
use vigil_models::{AlertCategory, AlertMethod, ClipMetadata, Prediction};

use crate::dispatch::{AlertDispatcher, DispatchRequest};
use crate::error::PipelineResult;
use crate::store::AlertRecord;

/// Outcome of a clip detection.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub prediction: Prediction,
    pub category: AlertCategory,
    pub clip: ClipMetadata,
    /// Present only when the category was dispatchable.
    pub alert: Option<AlertRecord>,
}

/// An operator-submitted alert.
#[derive(Debug, Clone)]
pub struct ManualAlert {
    pub camera_id: i64,
    pub event_type: AlertCategory,
    pub confidence: Option<f32>,
    pub media_urls: Vec<String>,
}

/// The clip-to-alert pipeline.
///
/// Built once at startup with its dependencies injected, then shared
/// read-only across requests. Stages within one request run sequentially;
/// requests are independent of each other.
pub struct DetectionPipeline {
    classifier: Arc<dyn Classifier>,
    labels: Arc<LabelSet>,
    sampler: SamplerConfig,
    dispatcher: AlertDispatcher,
}

impl DetectionPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        labels: Arc<LabelSet>,
        sampler: SamplerConfig,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            classifier,
            labels,
            sampler,
            dispatcher,
        }
    }

    /// Run the full pipeline on a submitted clip.
    ///
    /// Validation and sampling errors abort before the model runs. A
    /// dispatchable category produces a persisted, notified alert; `Normal`
    /// short-circuits to a no-alert outcome.
    pub async fn detect(&self, clip_bytes: &[u8], camera_id: i64) -> PipelineResult<Detection> {
        let clip_file = write_clip_tempfile(clip_bytes).await?;

        let metadata = validate_clip(clip_file.path(), &self.sampler).await?;
        let frames = extract_frames(clip_file.path(), &metadata, &self.sampler).await?;

        debug!(
            camera_id,
            frames = frames.len(),
            duration_s = metadata.duration_seconds,
            "Clip accepted, running classifier"
        );

        // The forward pass blocks for its full duration; keep it off the
        // async executor.
        let classifier = Arc::clone(&self.classifier);
        let infer_start = std::time::Instant::now();
        let probs = tokio::task::spawn_blocking(move || {
            let tensor = preprocess(&frames);
            classifier.infer(&tensor)
        })
        .await
        .map_err(|e| ClassifierError::inference(format!("Inference task failed: {e}")))??;
        histogram!("vigil_inference_duration_seconds").record(infer_start.elapsed().as_secs_f64());

        let prediction = predict(&probs, &self.labels)?;
        let category = AlertCategory::from_label(&prediction.label);

        counter!(
            "vigil_detections_total",
            "label" => prediction.label.clone(),
            "category" => category.as_str(),
        )
        .increment(1);

        info!(
            camera_id,
            label = %prediction.label,
            confidence = prediction.confidence,
            category = %category,
            "Clip classified"
        );

        let alert = if category.is_dispatchable() {
            Some(
                self.dispatcher
                    .dispatch(DispatchRequest {
                        camera_id,
                        category,
                        confidence: Some(prediction.confidence),
                        media_urls: Vec::new(),
                        media_type: "video".to_string(),
                        method: AlertMethod::Model,
                    })
                    .await?,
            )
        } else {
            None
        };

        Ok(Detection {
            prediction,
            category,
            clip: metadata,
            alert,
        })
    }

    /// Handle an operator-submitted alert.
    ///
    /// `Normal` is accepted but produces no alert, only an acknowledgement
    /// (`Ok(None)`).
    pub async fn trigger(&self, manual: ManualAlert) -> PipelineResult<Option<AlertRecord>> {
        if !manual.event_type.is_dispatchable() {
            info!(
                camera_id = manual.camera_id,
                "Manual report of normal behavior, no alert triggered"
            );
            return Ok(None);
        }

        let alert = self
            .dispatcher
            .dispatch(DispatchRequest {
                camera_id: manual.camera_id,
                category: manual.event_type,
                confidence: manual.confidence,
                media_urls: manual.media_urls,
                media_type: "video".to_string(),
                method: AlertMethod::Manual,
            })
            .await?;

        Ok(Some(alert))
    }
}
