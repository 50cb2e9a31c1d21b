//! Observability infrastructure for the prediction pipeline
//!
//! Provides:
//! - Prometheus metrics (prediction counts, errors, latency, store state)
//! - Structured logging with tracing

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Operation label values
pub mod operations {
    pub const PREDICT_CRIME_PRONE: &str = "predict_crime_prone";
    pub const FORECAST_CRIME_RATE: &str = "forecast_crime_rate";
}

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PipelineMetricsInner> = OnceLock::new();

struct PipelineMetricsInner {
    predictions: IntCounterVec,
    prediction_errors: IntCounterVec,
    prediction_latency_seconds: HistogramVec,
    model_store_loaded: IntGauge,
}

impl PipelineMetricsInner {
    fn new() -> Self {
        Self {
            predictions: register_int_counter_vec!(
                "crime_predictor_predictions_total",
                "Total number of successful predictions",
                &["operation"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter_vec!(
                "crime_predictor_prediction_errors_total",
                "Total number of failed predictions",
                &["operation", "kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            prediction_latency_seconds: register_histogram_vec!(
                "crime_predictor_prediction_latency_seconds",
                "Time spent assembling features and running inference",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            model_store_loaded: register_int_gauge!(
                "crime_predictor_model_store_loaded",
                "Whether the model store has been loaded (1) or not (0)"
            )
            .expect("Failed to register model_store_loaded"),
        }
    }
}

/// Lightweight handle to the global pipeline metrics.
///
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PipelineMetrics {
    _private: (),
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PipelineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_latency(&self, operation: &str, duration_secs: f64) {
        self.inner()
            .prediction_latency_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn inc_predictions(&self, operation: &str) {
        self.inner().predictions.with_label_values(&[operation]).inc();
    }

    pub fn inc_errors(&self, operation: &str, kind: &str) {
        self.inner()
            .prediction_errors
            .with_label_values(&[operation, kind])
            .inc();
    }

    pub fn set_store_loaded(&self, loaded: bool) {
        self.inner().model_store_loaded.set(i64::from(loaded));
    }

    pub fn predictions(&self, operation: &str) -> u64 {
        self.inner().predictions.with_label_values(&[operation]).get()
    }

    pub fn errors(&self, operation: &str, kind: &str) -> u64 {
        self.inner()
            .prediction_errors
            .with_label_values(&[operation, kind])
            .get()
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for pipeline events
#[derive(Clone)]
pub struct StructuredLogger {
    session: String,
}

impl StructuredLogger {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "predictor_started",
            session = %self.session,
            version = %version,
            "Crime predictor started"
        );
    }

    pub fn log_classification(&self, label: &str, elapsed_us: u128) {
        info!(
            event = "classification_generated",
            session = %self.session,
            result = %label,
            elapsed_us = elapsed_us,
            "Generated crime-prone classification"
        );
    }

    pub fn log_forecast(&self, raw_estimate: f64, count: i64, elapsed_us: u128) {
        info!(
            event = "forecast_generated",
            session = %self.session,
            raw_estimate = raw_estimate,
            count = count,
            elapsed_us = elapsed_us,
            "Generated crime rate forecast"
        );
    }

    pub fn log_prediction_failure(&self, operation: &str, kind: &str, details: &str) {
        warn!(
            event = "prediction_failed",
            session = %self.session,
            operation = %operation,
            kind = %kind,
            details = %details,
            "Prediction failed"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "predictor_shutdown",
            session = %self.session,
            reason = %reason,
            "Crime predictor shutting down"
        );
    }
}
