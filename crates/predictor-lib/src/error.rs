//! Error types for artifact loading and prediction requests

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The three artifacts held by a [`crate::ModelStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    Regressor,
    Scaler,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classifier => "classifier",
            Self::Regressor => "regressor",
            Self::Scaler => "scaler",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup failure while reading a model or scaler artifact.
///
/// Fatal: no store is produced and no prediction can be served.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("{artifact} artifact not found at {}", path.display())]
    Missing { artifact: ArtifactKind, path: PathBuf },

    #[error("failed to read {artifact} artifact at {}: {source}", path.display())]
    Unreadable {
        artifact: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{artifact} artifact at {} is corrupt or incompatible: {reason}", path.display())]
    Corrupt {
        artifact: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    #[error("checksum mismatch for {artifact} artifact at {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        artifact: ArtifactKind,
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl ArtifactLoadError {
    pub fn artifact(&self) -> ArtifactKind {
        match self {
            Self::Missing { artifact, .. }
            | Self::Unreadable { artifact, .. }
            | Self::Corrupt { artifact, .. }
            | Self::ChecksumMismatch { artifact, .. } => *artifact,
        }
    }
}

/// Request-scoped failure of a single prediction.
///
/// Never invalidates the store; the next request starts clean.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("degenerate scale: standard deviation of feature {index} is zero")]
    DegenerateScale { index: usize },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    UnexpectedModelOutput(String),
}

impl PredictError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::DegenerateScale { .. } => "degenerate_scale",
            Self::Inference(_) => "inference",
            Self::UnexpectedModelOutput(_) => "unexpected_output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_names_artifact_and_path() {
        let err = ArtifactLoadError::Missing {
            artifact: ArtifactKind::Scaler,
            path: PathBuf::from("/models/scaler.json"),
        };
        assert_eq!(err.artifact(), ArtifactKind::Scaler);
        assert_eq!(err.to_string(), "scaler artifact not found at /models/scaler.json");
    }

    #[test]
    fn test_predict_error_kinds() {
        assert_eq!(PredictError::DegenerateScale { index: 2 }.kind(), "degenerate_scale");
        assert_eq!(
            PredictError::ShapeMismatch { expected: 5, actual: 3 }.to_string(),
            "shape mismatch: expected 5 values, got 3"
        );
    }
}
