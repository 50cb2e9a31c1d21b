//! Learned per-feature scaling
//!
//! Replays the standardisation fitted at training time:
//! `(x - mean) / std_dev` for each feature.

use crate::error::PredictError;
use serde::{Deserialize, Serialize};

/// Mean and standard deviation of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleParam {
    pub mean: f64,
    pub std_dev: f64,
}

impl ScaleParam {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// On-disk layout of a fitted standard scaler
#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Fitted scaler parameters, one pair per feature
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    params: Vec<ScaleParam>,
}

impl StandardScaler {
    pub fn new(params: Vec<ScaleParam>) -> Self {
        Self { params }
    }

    /// Scaler that leaves every one of `n` features unchanged
    pub fn identity(n: usize) -> Self {
        Self::new(vec![ScaleParam::new(0.0, 1.0); n])
    }

    /// Parse a `{"mean": [..], "scale": [..]}` document
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let artifact: ScalerArtifact =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid scaler JSON: {e}"))?;

        if artifact.mean.len() != artifact.scale.len() {
            return Err(format!(
                "mean has {} values but scale has {}",
                artifact.mean.len(),
                artifact.scale.len()
            ));
        }

        let params = artifact
            .mean
            .into_iter()
            .zip(artifact.scale)
            .map(|(mean, std_dev)| ScaleParam { mean, std_dev })
            .collect();
        Ok(Self { params })
    }

    pub fn params(&self) -> &[ScaleParam] {
        &self.params
    }
}

/// Apply `(v[i] - mean_i) / std_dev_i` to every element.
///
/// Fails before any arithmetic if the lengths differ or a standard deviation
/// is exactly zero or not finite.
pub fn apply<const N: usize>(
    values: &[f64; N],
    params: &[ScaleParam],
) -> Result<[f64; N], PredictError> {
    if params.len() != N {
        return Err(PredictError::ShapeMismatch {
            expected: params.len(),
            actual: N,
        });
    }
    if let Some(index) = params
        .iter()
        .position(|p| p.std_dev == 0.0 || !p.std_dev.is_finite())
    {
        return Err(PredictError::DegenerateScale { index });
    }

    let mut scaled = [0.0; N];
    for (i, (value, param)) in values.iter().zip(params).enumerate() {
        scaled[i] = (value - param.mean) / param.std_dev;
    }
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(f64, f64)]) -> Vec<ScaleParam> {
        pairs.iter().map(|&(m, s)| ScaleParam::new(m, s)).collect()
    }

    #[test]
    fn test_affine_map_is_exact() {
        let values = [1.0, 3.0, 30.0, 5.0, 2023.0];
        let p = params(&[(6.1, 3.7), (4.9, 3.2), (44.3, 20.1), (9.8, 5.9), (2021.4, 1.6)]);
        let scaled = apply(&values, &p).unwrap();
        for i in 0..5 {
            assert_eq!(scaled[i], (values[i] - p[i].mean) / p[i].std_dev);
        }
    }

    #[test]
    fn test_identity_parameters() {
        let values = [1.0, 3.0, 30.0, 5.0, 2023.0];
        let scaler = StandardScaler::identity(5);
        assert_eq!(apply(&values, scaler.params()).unwrap(), values);
    }

    #[test]
    fn test_length_mismatch() {
        let err = apply(&[1.0, 2.0, 3.0], &params(&[(0.0, 1.0); 5])).unwrap_err();
        assert_eq!(err, PredictError::ShapeMismatch { expected: 5, actual: 3 });
    }

    #[test]
    fn test_zero_std_dev_rejected() {
        let p = params(&[(0.0, 1.0), (0.0, 1.0), (0.0, 0.0), (0.0, 1.0), (0.0, 1.0)]);
        let err = apply(&[1.0; 5], &p).unwrap_err();
        assert_eq!(err, PredictError::DegenerateScale { index: 2 });
    }

    #[test]
    fn test_non_finite_std_dev_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut p = params(&[(0.0, 1.0); 5]);
            p[3].std_dev = bad;
            let err = apply(&[1.0; 5], &p).unwrap_err();
            assert_eq!(err, PredictError::DegenerateScale { index: 3 });
        }
    }

    #[test]
    fn test_shape_checked_before_scale() {
        let err = apply(&[1.0; 5], &params(&[(0.0, 0.0); 4])).unwrap_err();
        assert!(matches!(err, PredictError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_json() {
        let json = br#"{"mean": [1.0, 2.0], "scale": [0.5, 4.0]}"#;
        let scaler = StandardScaler::from_json(json).unwrap();
        assert_eq!(scaler.params(), &params(&[(1.0, 0.5), (2.0, 4.0)])[..]);
    }

    #[test]
    fn test_from_json_rejects_unequal_lengths() {
        let json = br#"{"mean": [1.0, 2.0], "scale": [0.5]}"#;
        let err = StandardScaler::from_json(json).unwrap_err();
        assert!(err.contains("mean has 2 values"), "{err}");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(StandardScaler::from_json(b"not json").is_err());
        assert!(StandardScaler::from_json(br#"{"mean": [1.0]}"#).is_err());
    }
}
