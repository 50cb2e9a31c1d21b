//! Request-scoped prediction pipeline
//!
//! Input → feature assembly → scaling (classifier only) → inference →
//! interpretation. Each call is independent and only reads the store.

use super::features::{to_classification_features, to_regression_features};
use super::output::{ForecastPolicy, OutputFormatter};
use crate::error::PredictError;
use crate::models::{CrimeProneResult, RawInput, ScaledClassificationFeatures};
use crate::observability::{operations, PipelineMetrics, StructuredLogger};
use crate::store::ModelStore;
use std::time::Instant;

/// Classify whether the area described by `input` is crime-prone
pub fn predict_crime_prone(
    input: &RawInput,
    store: &ModelStore,
) -> Result<CrimeProneResult, PredictError> {
    let label = classify_raw(input, store)?;
    OutputFormatter::new().crime_prone(label)
}

/// Forecast the crime count, passing negative estimates through
pub fn forecast_crime_rate(input: &RawInput, store: &ModelStore) -> Result<i64, PredictError> {
    forecast_crime_rate_with(input, store, ForecastPolicy::PassThrough)
}

/// Forecast the crime count with an explicit policy for negative estimates
pub fn forecast_crime_rate_with(
    input: &RawInput,
    store: &ModelStore,
    policy: ForecastPolicy,
) -> Result<i64, PredictError> {
    let estimate = regress_raw(input, store)?;
    OutputFormatter::with_policy(policy).forecast(estimate)
}

fn classify_raw(input: &RawInput, store: &ModelStore) -> Result<i64, PredictError> {
    let features = to_classification_features(input);
    let scaled = super::scaling::apply(&features.0, store.scaler_parameters())?;
    store.classify(&ScaledClassificationFeatures(scaled))
}

fn regress_raw(input: &RawInput, store: &ModelStore) -> Result<f64, PredictError> {
    let features = to_regression_features(input);
    store.regress(&features)
}

/// Pipeline handle that records metrics and structured log events
pub struct Pipeline<'a> {
    store: &'a ModelStore,
    formatter: OutputFormatter,
    metrics: PipelineMetrics,
    logger: StructuredLogger,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a ModelStore, logger: StructuredLogger) -> Self {
        Self {
            store,
            formatter: OutputFormatter::new(),
            metrics: PipelineMetrics::new(),
            logger,
        }
    }

    pub fn with_policy(mut self, policy: ForecastPolicy) -> Self {
        self.formatter = OutputFormatter::with_policy(policy);
        self
    }

    pub fn policy(&self) -> ForecastPolicy {
        self.formatter.policy()
    }

    pub fn predict_crime_prone(&self, input: &RawInput) -> Result<CrimeProneResult, PredictError> {
        let start = Instant::now();
        let result = classify_raw(input, self.store).and_then(|label| self.formatter.crime_prone(label));
        let elapsed = start.elapsed();

        self.record(operations::PREDICT_CRIME_PRONE, elapsed.as_secs_f64(), &result);
        if let Ok(outcome) = &result {
            self.logger.log_classification(outcome.label(), elapsed.as_micros());
        }
        result
    }

    pub fn forecast_crime_rate(&self, input: &RawInput) -> Result<i64, PredictError> {
        let start = Instant::now();
        let result = regress_raw(input, self.store)
            .and_then(|estimate| Ok((estimate, self.formatter.forecast(estimate)?)));
        let elapsed = start.elapsed();

        self.record(operations::FORECAST_CRIME_RATE, elapsed.as_secs_f64(), &result);
        let (estimate, count) = result?;
        self.logger.log_forecast(estimate, count, elapsed.as_micros());
        Ok(count)
    }

    fn record<T>(&self, operation: &str, elapsed_secs: f64, result: &Result<T, PredictError>) {
        self.metrics.observe_latency(operation, elapsed_secs);
        match result {
            Ok(_) => self.metrics.inc_predictions(operation),
            Err(e) => {
                self.metrics.inc_errors(operation, e.kind());
                self.logger.log_prediction_failure(operation, e.kind(), &e.to_string());
            }
        }
    }
}
