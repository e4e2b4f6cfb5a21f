//! Router-level tests with stubbed pipeline collaborators.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, Utc};
use tower::ServiceExt;

use vigil_api::{create_router, ApiConfig, AppState};
use vigil_classifier::{Classifier, ClassifierResult, LabelSet};
use vigil_media::{ClipTensor, SamplerConfig};
use vigil_models::AlertStatus;
use vigil_notify::{DeliveryOutcome, Notifier, NotifyResult};
use vigil_pipeline::{
    AlertDispatcher, AlertRecord, AlertStore, CameraRecord, DetectionPipeline, NewAlertRecord,
    RecipientRecord, RecipientSelector, StoreError,
};
use vigil_storage::{S3Client, S3Config};

struct StubClassifier;

impl Classifier for StubClassifier {
    fn infer(&self, _tensor: &ClipTensor) -> ClassifierResult<Vec<f32>> {
        Ok(vec![0.0, 1.0])
    }

    fn num_labels(&self) -> usize {
        2
    }
}

struct StubStore;

#[async_trait::async_trait]
impl AlertStore for StubStore {
    async fn get_camera(&self, id: i64) -> Result<Option<CameraRecord>, StoreError> {
        Ok(Some(CameraRecord {
            id,
            location: "Entrance".to_string(),
        }))
    }

    async fn get_recipient(
        &self,
        _selector: &RecipientSelector,
    ) -> Result<Option<RecipientRecord>, StoreError> {
        Ok(Some(RecipientRecord {
            id: 1,
            fcm_token: Some("token".to_string()),
        }))
    }

    async fn create_alert(&self, record: NewAlertRecord) -> Result<AlertRecord, StoreError> {
        Ok(AlertRecord {
            id: 1,
            camera_id: record.camera_id,
            event_type: record.category.as_str().to_string(),
            confidence_score: record.confidence,
            status: AlertStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
            recipient_id: Some(record.recipient_id),
            media_urls: record.media_urls,
        })
    }

    async fn mark_result(
        &self,
        _alert_id: i64,
        _status: AlertStatus,
        _sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

struct StubNotifier;

#[async_trait::async_trait]
impl Notifier for StubNotifier {
    async fn send(
        &self,
        _token: &str,
        _title: &str,
        _body: &str,
        _data: &std::collections::HashMap<String, String>,
    ) -> NotifyResult<DeliveryOutcome> {
        Ok(DeliveryOutcome::Delivered)
    }
}

async fn test_state() -> AppState {
    let labels = LabelSet::from_json(r#"["normal", "violence"]"#).unwrap();
    let dispatcher = AlertDispatcher::new(
        Arc::new(StubStore),
        Arc::new(StubNotifier),
        RecipientSelector::Default,
    );
    let pipeline = DetectionPipeline::new(
        Arc::new(StubClassifier),
        Arc::new(labels),
        SamplerConfig::default(),
        dispatcher,
    );

    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/vigil_test")
        .unwrap();
    let storage = S3Client::new(S3Config {
        bucket_name: "vigil-test".to_string(),
        region: "us-east-1".to_string(),
        endpoint_url: Some("http://localhost:9000".to_string()),
    })
    .await
    .unwrap();

    AppState {
        config: ApiConfig::default(),
        pool,
        storage: Arc::new(storage),
        pipeline: Arc::new(pipeline),
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn detect_without_video_part_is_rejected() {
    let app = create_router(test_state().await, None);

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"camera_id\"\r\n\r\n1\r\n--{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/detect")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trigger_alert_rejects_out_of_range_confidence() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/trigger-alert")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"camera_id": 1, "event_type": "violence", "confidence": 1.5}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trigger_alert_acknowledges_normal_reports() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/trigger-alert")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"camera_id": 1, "event_type": "normal"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn manual_trigger_creates_alert() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/trigger-alert")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"camera_id": 1, "event_type": "manual_report"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}
