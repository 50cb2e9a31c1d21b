//! Immutable holder of the learned artifacts
//!
//! The store is built once at startup from three files and then shared by
//! reference. Nothing mutates it afterwards, so concurrent readers need no
//! locking.

use crate::error::{ArtifactKind, ArtifactLoadError, PredictError};
use crate::models::{RegressionFeatures, ScaledClassificationFeatures};
use crate::predictor::{Classifier, ModelFormat, Regressor, ScaleParam, StandardScaler};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locations of the three artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub regressor: PathBuf,
    pub scaler: PathBuf,
}

/// Optional SHA-256 hex digests the artifact bytes must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArtifactChecksums {
    pub classifier: Option<String>,
    pub regressor: Option<String>,
    pub scaler: Option<String>,
}

/// Classifier, regressor and scaler parameters, loaded once
pub struct ModelStore {
    classifier: Box<dyn Classifier>,
    regressor: Box<dyn Regressor>,
    scaler: StandardScaler,
}

impl ModelStore {
    /// Load the classifier, regressor and JSON scaler from disk.
    ///
    /// Model files ending in `.json` hold fitted estimator parameters; any
    /// other model file is read as an ONNX graph.
    pub fn load(
        classifier_path: impl AsRef<Path>,
        regressor_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, ArtifactLoadError> {
        let paths = ArtifactPaths {
            classifier: classifier_path.as_ref().to_path_buf(),
            regressor: regressor_path.as_ref().to_path_buf(),
            scaler: scaler_path.as_ref().to_path_buf(),
        };
        Self::load_verified(&paths, &ArtifactChecksums::default())
    }

    /// Load all artifacts, checking any configured digests first.
    ///
    /// Every file is read before any of them is parsed, so a missing file is
    /// reported without paying for graph optimisation.
    pub fn load_verified(
        paths: &ArtifactPaths,
        checksums: &ArtifactChecksums,
    ) -> Result<Self, ArtifactLoadError> {
        let classifier_bytes = read_artifact(
            ArtifactKind::Classifier,
            &paths.classifier,
            checksums.classifier.as_deref(),
        )?;
        let regressor_bytes = read_artifact(
            ArtifactKind::Regressor,
            &paths.regressor,
            checksums.regressor.as_deref(),
        )?;
        let scaler_bytes =
            read_artifact(ArtifactKind::Scaler, &paths.scaler, checksums.scaler.as_deref())?;

        let scaler = StandardScaler::from_json(&scaler_bytes)
            .map_err(|reason| corrupt(ArtifactKind::Scaler, &paths.scaler, reason))?;
        let classifier_format = ModelFormat::from_path(&paths.classifier);
        let classifier = classifier_format
            .load_classifier(&classifier_bytes)
            .map_err(|reason| corrupt(ArtifactKind::Classifier, &paths.classifier, reason))?;
        let regressor_format = ModelFormat::from_path(&paths.regressor);
        let regressor = regressor_format
            .load_regressor(&regressor_bytes)
            .map_err(|reason| corrupt(ArtifactKind::Regressor, &paths.regressor, reason))?;

        info!(
            classifier = %paths.classifier.display(),
            regressor = %paths.regressor.display(),
            scaler = %paths.scaler.display(),
            classifier_format = ?classifier_format,
            regressor_format = ?regressor_format,
            scaler_features = scaler.params().len(),
            "Model store loaded"
        );

        Ok(Self {
            classifier,
            regressor,
            scaler,
        })
    }

    /// Assemble a store from already constructed models
    pub fn from_parts(
        classifier: impl Classifier + 'static,
        regressor: impl Regressor + 'static,
        scaler: StandardScaler,
    ) -> Self {
        Self {
            classifier: Box::new(classifier),
            regressor: Box::new(regressor),
            scaler,
        }
    }

    pub fn classify(&self, features: &ScaledClassificationFeatures) -> Result<i64, PredictError> {
        self.classifier.classify(features)
    }

    pub fn regress(&self, features: &RegressionFeatures) -> Result<f64, PredictError> {
        self.regressor.regress(features)
    }

    pub fn scaler_parameters(&self) -> &[ScaleParam] {
        self.scaler.params()
    }
}

impl fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelStore")
            .field("scaler", &self.scaler)
            .finish_non_exhaustive()
    }
}

fn read_artifact(
    artifact: ArtifactKind,
    path: &Path,
    expected_checksum: Option<&str>,
) -> Result<Vec<u8>, ArtifactLoadError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ArtifactLoadError::Missing {
            artifact,
            path: path.to_path_buf(),
        },
        _ => ArtifactLoadError::Unreadable {
            artifact,
            path: path.to_path_buf(),
            source,
        },
    })?;

    if let Some(expected) = expected_checksum {
        let actual = compute_checksum(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ArtifactLoadError::ChecksumMismatch {
                artifact,
                path: path.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
        debug!(artifact = %artifact, checksum = %actual, "Artifact checksum validated");
    }

    Ok(bytes)
}

fn corrupt(artifact: ArtifactKind, path: &Path, reason: String) -> ArtifactLoadError {
    ArtifactLoadError::Corrupt {
        artifact,
        path: path.to_path_buf(),
        reason,
    }
}

/// SHA-256 of `data` as lowercase hex
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_hex_sha256() {
        assert_eq!(
            compute_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_read_missing_artifact() {
        let err = read_artifact(ArtifactKind::Regressor, Path::new("/nonexistent/rf.onnx"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ArtifactLoadError::Missing { artifact: ArtifactKind::Regressor, .. }
        ));
    }

    #[test]
    fn test_read_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact(ArtifactKind::Scaler, dir.path(), None).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Unreadable { .. }), "{err:?}");
    }
}
