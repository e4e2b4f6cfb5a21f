//! Application state.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use vigil_classifier::{ClassifierConfig, LabelSet, OnnxClassifier};
use vigil_media::{check_ffmpeg, check_ffprobe, SamplerConfig};
use vigil_notify::{FcmClient, NotifyConfig};
use vigil_pipeline::{AlertDispatcher, DetectionPipeline, PgAlertStore, RecipientSelector};
use vigil_storage::S3Client;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pool: PgPool,
    pub storage: Arc<S3Client>,
    pub pipeline: Arc<DetectionPipeline>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Startup is fail-fast: a missing FFmpeg binary, an unloadable model, a
    /// label manifest that disagrees with the model's output width, or an
    /// unreachable database all refuse to serve rather than failing on the
    /// first request.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        check_ffmpeg().context("FFmpeg not available")?;
        check_ffprobe().context("ffprobe not available")?;

        let classifier_config = ClassifierConfig::from_env();
        let labels = LabelSet::load(&classifier_config.labels_path)
            .context("Failed to load label manifest")?;
        let classifier = OnnxClassifier::load(&classifier_config, &labels)
            .context("Failed to load classifier model")?;

        let sampler = SamplerConfig::from_env();
        classifier
            .warm_up(sampler.num_frames)
            .context("Model output does not match the label manifest")?;
        info!(labels = labels.len(), "Classifier ready");

        let db_config = vigil_db::DatabaseConfig::from_env();
        let pool = vigil_db::connect(&db_config)
            .await
            .context("Failed to connect to Postgres")?;
        vigil_db::migrate(&pool)
            .await
            .context("Failed to run migrations")?;

        let storage = S3Client::from_env()
            .await
            .context("Failed to create S3 client")?;

        let notify_config = NotifyConfig::from_env().context("FCM configuration invalid")?;
        let notifier = FcmClient::new(notify_config)
            .await
            .context("Failed to create FCM client")?;

        let dispatcher = AlertDispatcher::new(
            Arc::new(PgAlertStore::new(pool.clone())),
            Arc::new(notifier),
            RecipientSelector::from_env(),
        );
        let pipeline =
            DetectionPipeline::new(Arc::new(classifier), Arc::new(labels), sampler, dispatcher);

        Ok(Self {
            config,
            pool,
            storage: Arc::new(storage),
            pipeline: Arc::new(pipeline),
        })
    }
}
