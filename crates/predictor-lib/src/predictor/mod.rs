//! ML prediction engine

mod estimators;
mod features;
mod inference;
mod output;
mod pipeline;
mod scaling;

pub use estimators::{ForestRegressor, Kernel, SvmClassifier};
pub use features::{to_classification_features, to_regression_features};
pub use inference::{OnnxClassifier, OnnxModel, OnnxRegressor};
pub use output::{ForecastPolicy, OutputFormatter, HIGH_CRIME_LABEL, LOW_CRIME_LABEL};
pub use pipeline::{
    forecast_crime_rate, forecast_crime_rate_with, predict_crime_prone, Pipeline,
};
pub use scaling::{apply, ScaleParam, StandardScaler};

use crate::error::PredictError;
use crate::models::{RegressionFeatures, ScaledClassificationFeatures};
use std::path::Path;

/// Serialization of a classifier or regressor artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Graph of standard ONNX operators, run with tract
    Onnx,
    /// Fitted estimator parameters, evaluated in-process
    Json,
}

impl ModelFormat {
    /// `.json` files hold fitted parameters; anything else is read as ONNX
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Onnx,
        }
    }

    pub fn load_classifier(self, bytes: &[u8]) -> Result<Box<dyn Classifier>, String> {
        let classifier: Box<dyn Classifier> = match self {
            ModelFormat::Onnx => Box::new(OnnxClassifier::from_bytes(bytes)?),
            ModelFormat::Json => Box::new(SvmClassifier::from_json(bytes)?),
        };
        Ok(classifier)
    }

    pub fn load_regressor(self, bytes: &[u8]) -> Result<Box<dyn Regressor>, String> {
        let regressor: Box<dyn Regressor> = match self {
            ModelFormat::Onnx => Box::new(OnnxRegressor::from_bytes(bytes)?),
            ModelFormat::Json => Box::new(ForestRegressor::from_json(bytes)?),
        };
        Ok(regressor)
    }
}

/// Binary classifier over the scaled five-feature layout
pub trait Classifier: Send + Sync {
    /// Raw class label; the pipeline decides which labels are meaningful
    fn classify(&self, features: &ScaledClassificationFeatures) -> Result<i64, PredictError>;
}

/// Regressor over the unscaled three-feature layout
pub trait Regressor: Send + Sync {
    /// Raw real-valued estimate
    fn regress(&self, features: &RegressionFeatures) -> Result<f64, PredictError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ModelFormat::from_path(Path::new("svm_crime_model.json")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("models/RF.JSON")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("rf_crime_model.onnx")), ModelFormat::Onnx);
        assert_eq!(ModelFormat::from_path(Path::new("model")), ModelFormat::Onnx);
    }
}
