//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! wants to change. Files ending in `.toml` are read as TOML, anything
//! else as JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Workspace size for a new, empty document.
    pub workspace_width: f64,
    pub workspace_height: f64,
    /// Quiet period after a continuous gesture before it is recorded.
    pub debounce_ms: u64,
    /// History cap; the oldest entries are dropped beyond it.
    pub max_history: usize,
    /// Offset applied to each successive paste.
    pub paste_offset: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fraction of the container kept free on each side when fitting.
    pub fit_margin: f64,
    pub brush_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            workspace_width: 900.0,
            workspace_height: 1200.0,
            debounce_ms: 500,
            max_history: 200,
            paste_offset: 10.0,
            zoom_step: 0.05,
            min_zoom: 0.2,
            max_zoom: 1.0,
            fit_margin: 0.05,
            brush_width: 4.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl EditorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the viewport and history cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.workspace_width) || !positive(self.workspace_height) {
            return invalid(format!(
                "workspace size must be positive, got {}x{}",
                self.workspace_width, self.workspace_height
            ));
        }
        if !positive(self.min_zoom) || !positive(self.max_zoom) || self.min_zoom > self.max_zoom {
            return invalid(format!(
                "zoom bounds must satisfy 0 < min_zoom <= max_zoom, got {}..{}",
                self.min_zoom, self.max_zoom
            ));
        }
        if !positive(self.zoom_step) {
            return invalid(format!("zoom_step must be positive, got {}", self.zoom_step));
        }
        if !(0.0..0.5).contains(&self.fit_margin) {
            return invalid(format!(
                "fit_margin must be in [0, 0.5), got {}",
                self.fit_margin
            ));
        }
        if self.max_history == 0 {
            return invalid("max_history must be at least 1".to_string());
        }
        if !self.paste_offset.is_finite() || !positive(self.brush_width) {
            return invalid(format!(
                "paste_offset must be finite and brush_width positive, got {} and {}",
                self.paste_offset, self.brush_width
            ));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml_str(&s)
        } else {
            Self::from_json_str(&s)
        }
    }
}
