//! Viewer configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ViewerError};
use crate::navigation::round_scale;

const CONFIG_DIR_NAME: &str = "pdfpager";
const CONFIG_FILENAME: &str = "config.toml";

/// Zoom bounds and step
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Factor applied once per zoom tick
    pub step: f32,
    pub initial_scale: f32,
}

impl ZoomSettings {
    pub const DEFAULT_MIN_SCALE: f32 = 0.25;
    pub const DEFAULT_MAX_SCALE: f32 = 5.0;
    pub const DEFAULT_STEP: f32 = 1.1;

    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_scale, self.max_scale, self.step, self.initial_scale]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ViewerError::Config("zoom values must be finite".into()));
        }
        if self.min_scale <= 0.0 {
            return Err(ViewerError::Config(format!(
                "min_scale must be positive, got {}",
                self.min_scale
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(ViewerError::Config(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.initial_scale) {
            return Err(ViewerError::Config(format!(
                "initial_scale {} is outside {}..={}",
                self.initial_scale, self.min_scale, self.max_scale
            )));
        }
        if self.step <= 1.0 {
            return Err(ViewerError::Config(format!(
                "zoom step must be greater than 1, got {}",
                self.step
            )));
        }
        // Scales are rounded to two decimals per tick. A step that rounds back
        // to min_scale would leave zoom-in stuck at the lower bound.
        if round_scale(self.min_scale * self.step) <= round_scale(self.min_scale) {
            return Err(ViewerError::Config(format!(
                "zoom step {} is too small to move past min_scale {} at two-decimal precision",
                self.step, self.min_scale
            )));
        }
        Ok(())
    }
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min_scale: Self::DEFAULT_MIN_SCALE,
            max_scale: Self::DEFAULT_MAX_SCALE,
            step: Self::DEFAULT_STEP,
            initial_scale: 1.0,
        }
    }
}

/// Configuration for the PDF viewer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub initial_window_width: f32,
    pub initial_window_height: f32,
    /// Render resolution multiplier applied on top of the zoom factor
    pub base_render_scale: f32,
    pub log_level: String,
    pub zoom: ZoomSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_window_width: 800.0,
            initial_window_height: 600.0,
            base_render_scale: 1.5,
            log_level: "info".to_string(),
            zoom: ZoomSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ViewerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load `explicit` if given, else the per-user config file if it exists,
    /// else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_render_scale.is_finite() && self.base_render_scale > 0.0) {
            return Err(ViewerError::Config(format!(
                "base_render_scale must be positive, got {}",
                self.base_render_scale
            )));
        }
        if self.initial_window_width <= 0.0 || self.initial_window_height <= 0.0 {
            return Err(ViewerError::Config("window size must be positive".into()));
        }
        self.zoom.validate()
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.zoom.min_scale, 0.25);
        assert_eq!(config.zoom.max_scale, 5.0);
        assert_eq!(config.zoom.step, 1.1);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = ViewerConfig::from_toml(
            r#"
            log_level = "debug"

            [zoom]
            max_scale = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.zoom.max_scale, 3.0);
        assert_eq!(config.zoom.min_scale, 0.25);
        assert_eq!(config.base_render_scale, 1.5);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = ViewerConfig::from_toml(
            r#"
            [zoom]
            min_scale = 2.0
            max_scale = 1.0
            initial_scale = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn rejects_initial_scale_out_of_bounds() {
        let zoom = ZoomSettings {
            initial_scale: 9.0,
            ..ZoomSettings::default()
        };
        assert!(zoom.validate().is_err());
    }

    #[test]
    fn rejects_non_growing_step() {
        let zoom = ZoomSettings {
            step: 1.0,
            ..ZoomSettings::default()
        };
        assert!(zoom.validate().is_err());
    }

    #[test]
    fn rejects_step_lost_to_rounding() {
        // 0.25 * 1.01 = 0.2525, rounds back to 0.25
        let zoom = ZoomSettings {
            step: 1.01,
            ..ZoomSettings::default()
        };
        assert!(matches!(zoom.validate(), Err(ViewerError::Config(_))));

        // 0.25 * 1.03 = 0.2575, rounds to 0.26
        let zoom = ZoomSettings {
            step: 1.03,
            ..ZoomSettings::default()
        };
        assert!(zoom.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(ViewerConfig::from_toml("zoom = 3").is_err());
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_render_scale = 2.0").unwrap();

        let config = ViewerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.base_render_scale, 2.0);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(ViewerConfig::load(Some(&path)).is_err());
    }
}
