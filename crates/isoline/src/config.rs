//! Configuration for the marching squares pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarchError, Result};

/// Tunable constants shared by every pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchConfig {
    /// Distance in pixels between grid sample points, on both axes.
    pub step: usize,

    /// Luminance at or below which a sample counts as inside the contour.
    pub threshold: u8,

    /// Working image width for sources that exceed the target bounds.
    pub rescale_width: usize,

    /// Working image height for sources that exceed the target bounds.
    pub rescale_height: usize,

    /// Directory holding the 16 contour tiles.
    pub contour_dir: PathBuf,

    /// File extension of the contour tiles.
    pub tile_extension: String,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            step: 8,
            threshold: 200,
            rescale_width: 2048,
            rescale_height: 2048,
            contour_dir: PathBuf::from("./contours"),
            tile_extension: "ppm".to_string(),
        }
    }
}

impl MarchConfig {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration from a YAML file. Missing fields keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Override fields from `MARCH_*` environment variables.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("MARCH_STEP") {
            if let Ok(step) = val.parse() {
                self.step = step;
            }
        }

        if let Ok(val) = std::env::var("MARCH_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("MARCH_RESCALE_WIDTH") {
            if let Ok(width) = val.parse() {
                self.rescale_width = width;
            }
        }

        if let Ok(val) = std::env::var("MARCH_RESCALE_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.rescale_height = height;
            }
        }

        if let Ok(val) = std::env::var("MARCH_CONTOUR_DIR") {
            self.contour_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("MARCH_TILE_EXTENSION") {
            self.tile_extension = val;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(MarchError::config("step must be > 0"));
        }

        if self.rescale_width == 0 || self.rescale_height == 0 {
            return Err(MarchError::config("rescale dimensions must be > 0"));
        }

        if self.tile_extension.is_empty() {
            return Err(MarchError::config("tile_extension must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarchConfig::default();
        assert_eq!(config.step, 8);
        assert_eq!(config.threshold, 200);
        assert_eq!(config.rescale_width, 2048);
        assert_eq!(config.rescale_height, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = MarchConfig {
            step: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MarchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_rescale() {
        let config = MarchConfig {
            rescale_height: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_document() {
        let config = MarchConfig::from_yaml_str("step: 4\nthreshold: 90\n").unwrap();
        assert_eq!(config.step, 4);
        assert_eq!(config.threshold, 90);
        // Unspecified fields fall back to defaults
        assert_eq!(config.rescale_width, 2048);
        assert_eq!(config.tile_extension, "ppm");
    }

    #[test]
    fn test_yaml_invalid_document() {
        let result = MarchConfig::from_yaml_str("step: [not, a, number]");
        assert!(matches!(result, Err(MarchError::Yaml(_))));
    }

    #[test]
    fn test_env_overrides() {
        // Only test in this binary that touches MARCH_* variables
        std::env::set_var("MARCH_STEP", "16");
        std::env::set_var("MARCH_THRESHOLD", "not-a-number");
        std::env::set_var("MARCH_CONTOUR_DIR", "/tmp/tiles");

        let config = MarchConfig::from_env();

        std::env::remove_var("MARCH_STEP");
        std::env::remove_var("MARCH_THRESHOLD");
        std::env::remove_var("MARCH_CONTOUR_DIR");

        assert_eq!(config.step, 16);
        assert_eq!(config.threshold, 200);
        assert_eq!(config.contour_dir, PathBuf::from("/tmp/tiles"));
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("march.yaml");
        std::fs::write(&path, "rescale_width: 64\nrescale_height: 32\n").unwrap();

        let config = MarchConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.rescale_width, 64);
        assert_eq!(config.rescale_height, 32);
    }
}
