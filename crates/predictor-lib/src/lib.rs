//! Crime rate prediction library
//!
//! This crate provides the core functionality for:
//! - Loading the classifier, regressor and scaler artifacts
//! - Assembling fixed-layout feature vectors from user input
//! - Replaying the learned feature scaling
//! - Running inference and interpreting model outputs
//! - Metrics and structured logging for the pipeline

pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod reference;
pub mod store;


pub use error::{ArtifactKind, ArtifactLoadError, PredictError};
pub use models::*;
pub use observability::{PipelineMetrics, StructuredLogger};
pub use predictor::{forecast_crime_rate, forecast_crime_rate_with, predict_crime_prone};
pub use store::{ArtifactChecksums, ArtifactPaths, ModelStore};
