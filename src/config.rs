//! Detector configuration
//!
//! The configuration is fixed for the whole run. It can come from defaults,
//! a JSON file, command line flags, or a mix of the three.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Motion score above which a frame counts as motion
pub const DEFAULT_THRESHOLD: u64 = 200_000;

/// Frames kept after motion stops
pub const DEFAULT_HOLD_OVER_FRAMES: u32 = 15;

/// Where recordings go when nothing else is configured
pub const DEFAULT_OUTPUT_DIR: &str = "output_files";

/// Default source: the first camera
pub const DEFAULT_SOURCE: &str = "0";

/// Frame rate every recording is encoded at
pub const RECORDING_FPS: u32 = 30;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Everything the detector needs to know before it starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Camera index or video file/URL
    pub source: String,

    /// Motion score above which motion is declared (strictly greater)
    pub threshold: u64,

    /// Frames to keep recording after motion stops
    pub hold_over_frames: u32,

    /// Directory that receives the recordings
    pub output_dir: PathBuf,

    /// Whether to show the live preview
    pub preview: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            threshold: DEFAULT_THRESHOLD,
            hold_over_frames: DEFAULT_HOLD_OVER_FRAMES,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            preview: true,
        }
    }
}

impl DetectorConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DetectorConfig = serde_json::from_str(&content)?;

        tracing::debug!("Loaded detector config from {:?}", path);

        Ok(config)
    }

    /// Reject values the detector cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "source",
                reason: "must not be empty".to_string(),
            });
        }

        // With zero hold-over frames a triggered recording would never receive a frame
        if self.hold_over_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "holdOverFrames",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "outputDir",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.source, "0");
        assert_eq!(config.threshold, 200_000);
        assert_eq!(config.hold_over_frames, 15);
        assert_eq!(config.output_dir, PathBuf::from("output_files"));
        assert!(config.preview);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detector.json");
        fs::write(&path, r#"{ "threshold": 1000, "preview": false }"#).unwrap();

        let config = DetectorConfig::load(&path).unwrap();

        assert_eq!(config.threshold, 1000);
        assert!(!config.preview);
        assert_eq!(config.hold_over_frames, DEFAULT_HOLD_OVER_FRAMES);
        assert_eq!(config.source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = DetectorConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ threshold: ").unwrap();

        let err = DetectorConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_validate_rejects_zero_hold_over() {
        let config = DetectorConfig {
            hold_over_frames: 0,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "holdOverFrames", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_source() {
        let config = DetectorConfig {
            source: "  ".to_string(),
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
