//! The clip-validation, frame-sampling and alert-dispatch pipeline.
//!
//! Data flow: raw clip bytes -> validate -> sample -> preprocess -> infer ->
//! map label to category -> dispatch. Each request runs the stages
//! sequentially; the pipeline object itself is immutable and shared across
//! requests.

pub mod detect;
pub mod dispatch;
pub mod error;
pub mod store;

pub use detect::{Detection, DetectionPipeline, ManualAlert};
pub use dispatch::{AlertDispatcher, DispatchRequest};
pub use error::{PipelineError, PipelineResult};
pub use store::{
    AlertRecord, AlertStore, CameraRecord, NewAlertRecord, PgAlertStore, RecipientRecord,
    RecipientSelector, StoreError,
};
