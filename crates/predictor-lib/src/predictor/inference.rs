//! ONNX inference using tract
//!
//! Runs classifier and regressor graphs built from standard ONNX operators
//! (for example scikit-learn models compiled to tensor operations) with
//! tract-onnx. Each graph is specialised to a single `f32 [1, N]` input when
//! it is loaded, so a graph that cannot accept the fixed feature layout is
//! rejected at startup instead of on the first request.

use super::{Classifier, Regressor};
use crate::error::PredictError;
use crate::models::{
    RegressionFeatures, ScaledClassificationFeatures, CLASSIFICATION_FEATURES,
    REGRESSION_FEATURES,
};
use std::any::Any;
use std::panic;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A runnable ONNX graph with a fixed input width
pub struct OnnxModel {
    plan: TractModel,
    width: usize,
}

impl OnnxModel {
    /// Parse and optimise an ONNX graph for a `[1, width]` input
    pub fn from_bytes(model_bytes: &[u8], width: usize) -> Result<Self, String> {
        let plan = Self::load_model(model_bytes, width)?;
        Ok(Self { plan, width })
    }

    /// tract panics on some malformed graphs (untyped inputs among them), so
    /// a panic while loading is reported like any other load failure.
    fn load_model(model_bytes: &[u8], width: usize) -> Result<TractModel, String> {
        panic::catch_unwind(|| Self::build_plan(model_bytes, width)).unwrap_or_else(|payload| {
            Err(format!("ONNX loader panicked: {}", panic_message(payload.as_ref())))
        })
    }

    fn build_plan(model_bytes: &[u8], width: usize) -> Result<TractModel, String> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .map_err(|e| format!("failed to parse ONNX model: {e}"))?
            .with_input_fact(0, f32::fact([1, width]).into())
            .map_err(|e| format!("failed to set input shape [1, {width}]: {e}"))?
            .into_optimized()
            .map_err(|e| format!("failed to optimize model: {e:#}"))?
            .into_runnable()
            .map_err(|e| format!("failed to create runnable model: {e}"))
    }

    /// Run the graph on one row and return its first output
    pub fn run(&self, row: &[f64]) -> Result<Tensor, PredictError> {
        check_width(self.width, row.len())?;
        let start = Instant::now();

        let data: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, self.width], &data)
            .map_err(|e| PredictError::Inference(e.to_string()))?;

        let mut outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        if outputs.is_empty() {
            return Err(PredictError::Inference("no output from model".to_string()));
        }
        let output = outputs.remove(0).into_tensor();

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(output)
    }
}

fn panic_message<'a>(payload: &'a (dyn Any + Send + 'static)) -> &'a str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Binary classifier backed by an ONNX graph whose first output is the label
pub struct OnnxClassifier {
    model: OnnxModel,
}

impl OnnxClassifier {
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, String> {
        Ok(Self {
            model: OnnxModel::from_bytes(model_bytes, CLASSIFICATION_FEATURES)?,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, features: &ScaledClassificationFeatures) -> Result<i64, PredictError> {
        let output = self.model.run(features.as_slice())?;
        label_from_tensor(&output)
    }
}

/// Regressor backed by an ONNX graph whose first output holds the estimate
pub struct OnnxRegressor {
    model: OnnxModel,
}

impl OnnxRegressor {
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, String> {
        Ok(Self {
            model: OnnxModel::from_bytes(model_bytes, REGRESSION_FEATURES)?,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn regress(&self, features: &RegressionFeatures) -> Result<f64, PredictError> {
        let output = self.model.run(features.as_slice())?;
        value_from_tensor(&output)
    }
}

fn check_width(expected: usize, actual: usize) -> Result<(), PredictError> {
    if expected != actual {
        return Err(PredictError::Inference(format!(
            "model expects {expected} features, got {actual}"
        )));
    }
    Ok(())
}

fn first<T: Datum + Copy>(tensor: &Tensor) -> Result<T, PredictError> {
    tensor
        .as_slice::<T>()
        .map_err(|e| PredictError::Inference(e.to_string()))?
        .first()
        .copied()
        .ok_or_else(|| PredictError::UnexpectedModelOutput("empty output tensor".to_string()))
}

/// Extract a class label. Float labels are accepted only when integral.
fn label_from_tensor(tensor: &Tensor) -> Result<i64, PredictError> {
    let value = match tensor.datum_type() {
        // tract carries ONNX int64 casts as symbolic dims
        DatumType::I64 | DatumType::I32 | DatumType::TDim => {
            let labels = tensor
                .cast_to::<i64>()
                .map_err(|e| PredictError::UnexpectedModelOutput(e.to_string()))?;
            return first::<i64>(&labels);
        }
        DatumType::F32 => f64::from(first::<f32>(tensor)?),
        DatumType::F64 => first::<f64>(tensor)?,
        other => {
            return Err(PredictError::UnexpectedModelOutput(format!(
                "unsupported label type {other:?}"
            )))
        }
    };

    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(PredictError::UnexpectedModelOutput(format!("label {value}")))
    }
}

/// Extract the first regression estimate
fn value_from_tensor(tensor: &Tensor) -> Result<f64, PredictError> {
    match tensor.datum_type() {
        DatumType::F32 => first::<f32>(tensor).map(f64::from),
        DatumType::F64 => first::<f64>(tensor),
        other => Err(PredictError::UnexpectedModelOutput(format!(
            "unsupported regression output type {other:?}"
        ))),
    }
}
