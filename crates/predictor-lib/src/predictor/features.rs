//! Feature assembly for ML inference
//!
//! Maps a [`RawInput`] onto the two fixed feature layouts the models were
//! trained on. No validation happens here; whatever reaches these functions
//! is passed through unchanged.

use crate::models::{ClassificationFeatures, RawInput, RegressionFeatures};

/// Build the classifier input `[city, crime, age, police, year]`
pub fn to_classification_features(input: &RawInput) -> ClassificationFeatures {
    ClassificationFeatures([
        f64::from(input.city_code),
        f64::from(input.crime_code),
        f64::from(input.victim_age),
        f64::from(input.police_deployed),
        f64::from(input.year),
    ])
}

/// Build the regressor input `[city, year, police]`
pub fn to_regression_features(input: &RawInput) -> RegressionFeatures {
    RegressionFeatures([
        f64::from(input.city_code),
        f64::from(input.year),
        f64::from(input.police_deployed),
    ])
}
