//! Configuration management for the CLI
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file,
//! `CRIME_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use predictor_lib::predictor::ForecastPolicy;
use predictor_lib::{ArtifactChecksums, ArtifactPaths};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CLASSIFIER: &str = "svm_crime_model.json";
pub const DEFAULT_REGRESSOR: &str = "rf_crime_model.json";
pub const DEFAULT_SCALER: &str = "scaler.json";

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// Artifact locations and optional integrity digests
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    pub classifier: PathBuf,
    pub regressor: PathBuf,
    pub scaler: PathBuf,
    #[serde(default)]
    pub checksums: ArtifactChecksums,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastConfig {
    /// What to do with negative regression estimates
    #[serde(default)]
    pub negative: ForecastPolicy,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub classifier: Option<PathBuf>,
    pub regressor: Option<PathBuf>,
    pub scaler: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from defaults, file, environment and overrides
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("artifacts.classifier", DEFAULT_CLASSIFIER)?
            .set_default("artifacts.regressor", DEFAULT_REGRESSOR)?
            .set_default("artifacts.scaler", DEFAULT_SCALER)?;

        match &overrides.config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path.as_path()).required(true));
            }
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix("CRIME")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("artifacts.classifier", path_value(&overrides.classifier))?
            .set_override_option("artifacts.regressor", path_value(&overrides.regressor))?
            .set_override_option("artifacts.scaler", path_value(&overrides.scaler))?
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            classifier: self.artifacts.classifier.clone(),
            regressor: self.artifacts.regressor.clone(),
            scaler: self.artifacts.scaler.clone(),
        }
    }
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_deref().map(|p| p.display().to_string())
}

/// `~/.config/crime-predictor/config.toml`, if a home directory exists
fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| config_path_in(&home))
}

fn config_path_in(home: &Path) -> PathBuf {
    home.join(".config").join("crime-predictor").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_file_values_and_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[artifacts]
scaler = "/models/scaler.json"

[artifacts.checksums]
scaler = "abc123"

[forecast]
negative = "clamp_to_zero"
"#,
        );
        let config = AppConfig::load(&Overrides {
            config_file: Some(path),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.artifacts.classifier, PathBuf::from(DEFAULT_CLASSIFIER));
        assert_eq!(config.artifacts.regressor, PathBuf::from(DEFAULT_REGRESSOR));
        assert_eq!(config.artifacts.scaler, PathBuf::from("/models/scaler.json"));
        assert_eq!(config.artifacts.checksums.scaler.as_deref(), Some("abc123"));
        assert_eq!(config.artifacts.checksums.classifier, None);
        assert_eq!(config.forecast.negative, ForecastPolicy::ClampToZero);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[artifacts]\nclassifier = \"/from/file.onnx\"\n");
        let config = AppConfig::load(&Overrides {
            config_file: Some(path),
            classifier: Some(PathBuf::from("/from/flag.onnx")),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.artifacts.classifier, PathBuf::from("/from/flag.onnx"));
        assert_eq!(config.forecast.negative, ForecastPolicy::PassThrough);
        assert_eq!(config.artifact_paths().classifier, PathBuf::from("/from/flag.onnx"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load(&Overrides {
            config_file: Some(dir.path().join("absent.toml")),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[forecast]\nnegative = \"round_up\"\n");
        let result = AppConfig::load(&Overrides {
            config_file: Some(path),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_config_path_layout() {
        assert_eq!(
            config_path_in(Path::new("/home/analyst")),
            PathBuf::from("/home/analyst/.config/crime-predictor/config.toml")
        );
    }
}
