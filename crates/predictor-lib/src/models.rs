//! Core data models for crime rate prediction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of features consumed by the classifier
pub const CLASSIFICATION_FEATURES: usize = 5;

/// Number of features consumed by the regressor
pub const REGRESSION_FEATURES: usize = 3;

/// Five scalar fields entered by the user for a single interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    pub city_code: u32,
    pub crime_code: u32,
    pub victim_age: u32,
    pub police_deployed: u32,
    pub year: i32,
}

/// Classifier input in the order `[city, crime, age, police, year]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationFeatures(pub [f64; CLASSIFICATION_FEATURES]);

/// Classifier input after the learned per-feature scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledClassificationFeatures(pub [f64; CLASSIFICATION_FEATURES]);

/// Regressor input in the order `[city, year, police]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionFeatures(pub [f64; REGRESSION_FEATURES]);

impl ScaledClassificationFeatures {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl RegressionFeatures {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Interpreted classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrimeProneResult {
    HighCrimeProne,
    LowCrime,
}

impl CrimeProneResult {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::HighCrimeProne)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighCrimeProne => "High Crime-Prone Area",
            Self::LowCrime => "Low Crime Area",
        }
    }
}

impl fmt::Display for CrimeProneResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
