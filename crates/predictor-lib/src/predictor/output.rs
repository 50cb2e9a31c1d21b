//! Interpretation of raw model outputs
//!
//! Turns the classifier label into a [`CrimeProneResult`] and the regressor
//! estimate into an integer crime count.

use crate::error::PredictError;
use crate::models::CrimeProneResult;
use serde::{Deserialize, Serialize};

/// Label the classifier emits for a high crime-prone area
pub const HIGH_CRIME_LABEL: i64 = 1;

/// Label the classifier emits for a low crime area
pub const LOW_CRIME_LABEL: i64 = 0;

/// 2^63: truncated estimates must lie in `[-2^63, 2^63)` to fit an `i64`
const I64_RANGE_END: f64 = 9_223_372_036_854_775_808.0;

/// Handling of negative regression estimates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastPolicy {
    /// Report the truncated estimate as-is, negative or not
    #[default]
    PassThrough,
    /// Report negative estimates as zero
    ClampToZero,
}

/// Formats raw model outputs into domain results
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    policy: ForecastPolicy,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ForecastPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ForecastPolicy {
        self.policy
    }

    /// Map the classifier label: 1 is high crime-prone, 0 is low crime
    pub fn crime_prone(&self, label: i64) -> Result<CrimeProneResult, PredictError> {
        match label {
            HIGH_CRIME_LABEL => Ok(CrimeProneResult::HighCrimeProne),
            LOW_CRIME_LABEL => Ok(CrimeProneResult::LowCrime),
            other => Err(PredictError::UnexpectedModelOutput(format!(
                "classifier label {other} is not 0 or 1"
            ))),
        }
    }

    /// Truncate the regression estimate toward zero
    pub fn forecast(&self, estimate: f64) -> Result<i64, PredictError> {
        if !estimate.is_finite() {
            return Err(PredictError::UnexpectedModelOutput(format!(
                "regression estimate {estimate}"
            )));
        }

        let truncated = estimate.trunc();
        if !(-I64_RANGE_END..I64_RANGE_END).contains(&truncated) {
            return Err(PredictError::UnexpectedModelOutput(format!(
                "regression estimate {estimate} does not fit a count"
            )));
        }

        let count = truncated as i64;
        match self.policy {
            ForecastPolicy::PassThrough => Ok(count),
            ForecastPolicy::ClampToZero => Ok(count.max(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        let formatter = OutputFormatter::new();
        assert_eq!(formatter.crime_prone(1).unwrap(), CrimeProneResult::HighCrimeProne);
        assert_eq!(formatter.crime_prone(0).unwrap(), CrimeProneResult::LowCrime);
    }

    #[test]
    fn test_unexpected_labels() {
        let formatter = OutputFormatter::new();
        for label in [-1, 2, 42, i64::MAX] {
            let err = formatter.crime_prone(label).unwrap_err();
            assert!(matches!(err, PredictError::UnexpectedModelOutput(_)), "label {label}");
        }
    }

    #[test]
    fn test_truncates_toward_zero() {
        let formatter = OutputFormatter::new();
        assert_eq!(formatter.forecast(7.9).unwrap(), 7);
        assert_eq!(formatter.forecast(-2.3).unwrap(), -2);
        assert_eq!(formatter.forecast(42.0).unwrap(), 42);
        assert_eq!(formatter.forecast(-0.4).unwrap(), 0);
    }

    #[test]
    fn test_clamp_policy() {
        let formatter = OutputFormatter::with_policy(ForecastPolicy::ClampToZero);
        assert_eq!(formatter.forecast(-2.3).unwrap(), 0);
        assert_eq!(formatter.forecast(7.9).unwrap(), 7);
    }

    #[test]
    fn test_non_finite_estimate() {
        let formatter = OutputFormatter::new();
        for estimate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                formatter.forecast(estimate),
                Err(PredictError::UnexpectedModelOutput(_))
            ));
        }
    }

    #[test]
    fn test_estimate_beyond_i64_rejected() {
        let formatter = OutputFormatter::new();
        for estimate in [1e19, -1e19, 9_223_372_036_854_775_808.0] {
            let err = formatter.forecast(estimate).unwrap_err();
            assert!(matches!(err, PredictError::UnexpectedModelOutput(_)), "{estimate}");
        }
        assert_eq!(formatter.forecast(-9_223_372_036_854_775_808.0).unwrap(), i64::MIN);
        assert_eq!(formatter.forecast(1e15 + 0.5).unwrap(), 1_000_000_000_000_000);
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let policy: ForecastPolicy = serde_json::from_str("\"clamp_to_zero\"").unwrap();
        assert_eq!(policy, ForecastPolicy::ClampToZero);
        assert_eq!(ForecastPolicy::default(), ForecastPolicy::PassThrough);
    }
}
