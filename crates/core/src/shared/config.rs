use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_ANGLE_SMOOTHING, DEFAULT_ASSET_ID, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_MIN_FACE_WIDTH,
    DEFAULT_POSITION_SMOOTHING,
};
use crate::tracking::domain::landmark_smoother::SmoothingFactors;
use crate::tracking::landmark_tracker::{LossPolicy, TrackerConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for one try-on session, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TryOnConfig {
    pub position_smoothing: f64,
    pub angle_smoothing: f64,
    pub min_face_width: f64,
    pub loss_policy: LossPolicy,
    pub frame_interval_ms: u64,
    pub default_asset: String,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            position_smoothing: DEFAULT_POSITION_SMOOTHING,
            angle_smoothing: DEFAULT_ANGLE_SMOOTHING,
            min_face_width: DEFAULT_MIN_FACE_WIDTH,
            loss_policy: LossPolicy::Retain,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            default_asset: DEFAULT_ASSET_ID.to_string(),
        }
    }
}

impl TryOnConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("TryOn").join("settings.json"))
    }

    /// Loads from the user config dir, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("position_smoothing", self.position_smoothing),
            ("angle_smoothing", self.angle_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if !(self.min_face_width >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_face_width must be non-negative, got {}",
                self.min_face_width
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            smoothing: SmoothingFactors {
                position: self.position_smoothing,
                angle: self.angle_smoothing,
            },
            min_face_width: self.min_face_width,
            loss_policy: self.loss_policy,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_tracking_constants() {
        let config = TryOnConfig::default();
        assert_relative_eq!(config.position_smoothing, 0.3);
        assert_relative_eq!(config.angle_smoothing, 0.2);
        assert_eq!(config.loss_policy, LossPolicy::Retain);
        assert_eq!(config.default_asset, "aviator");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let config = TryOnConfig {
            loss_policy: LossPolicy::Reset,
            default_asset: "round".into(),
            ..TryOnConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = TryOnConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"loss_policy": "reset"}"#).unwrap();

        let loaded = TryOnConfig::load_from(&path).unwrap();
        assert_eq!(loaded.loss_policy, LossPolicy::Reset);
        assert_relative_eq!(loaded.position_smoothing, 0.3);
    }

    #[test]
    fn test_load_from_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TryOnConfig::load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_from_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            TryOnConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[rstest]
    #[case::zero_position(0.0, 0.2, 0.02)]
    #[case::position_above_one(1.5, 0.2, 0.02)]
    #[case::zero_angle(0.3, 0.0, 0.02)]
    #[case::nan_angle(0.3, f64::NAN, 0.02)]
    #[case::negative_width(0.3, 0.2, -0.1)]
    fn test_validate_rejects(#[case] position: f64, #[case] angle: f64, #[case] min_width: f64) {
        let config = TryOnConfig {
            position_smoothing: position,
            angle_smoothing: angle,
            min_face_width: min_width,
            ..TryOnConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_tracker_config_carries_values() {
        let config = TryOnConfig {
            position_smoothing: 0.5,
            angle_smoothing: 0.1,
            min_face_width: 0.05,
            loss_policy: LossPolicy::Reset,
            ..TryOnConfig::default()
        };
        let tc = config.tracker_config();
        assert_relative_eq!(tc.smoothing.position, 0.5);
        assert_relative_eq!(tc.smoothing.angle, 0.1);
        assert_relative_eq!(tc.min_face_width, 0.05);
        assert_eq!(tc.loss_policy, LossPolicy::Reset);
    }
}
