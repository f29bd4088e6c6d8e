//! Runtime settings.

use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Background grid drawn behind the objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStyle {
    /// No grid.
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only dots at intersections.
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Lines,
            GridStyle::Lines => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }
}

/// Tunables for the canvas, grid, history, solve client and model import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied per zoom step (wheel notch).
    pub zoom_step: f64,
    pub grid_style: GridStyle,
    /// Base grid spacing in world units.
    pub grid_spacing: f64,
    /// The adaptive grid keeps its on-screen spacing inside this band.
    pub grid_min_px: f64,
    pub grid_max_px: f64,
    pub background: SerializableColor,
    pub stroke_color: SerializableColor,
    pub line_width: f64,
    pub eraser_size: f64,
    pub font_size: f64,
    /// Vertex count for the polygon stamp.
    pub polygon_sides: usize,
    /// Maximum number of undo snapshots kept.
    pub history_limit: usize,
    pub solve_endpoint: String,
    pub model_load_timeout_secs: u64,
    pub max_model_bytes: u64,
    /// Divisor mapping canvas units to scene units.
    pub scene_scale_factor: f64,
    /// Ground-plane distance under which a 3D node counts as picked.
    pub scene_pick_radius: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_step: 1.1,
            grid_style: GridStyle::Lines,
            grid_spacing: 50.0,
            grid_min_px: 12.0,
            grid_max_px: 96.0,
            background: SerializableColor::white(),
            stroke_color: SerializableColor::black(),
            line_width: 3.0,
            eraser_size: 20.0,
            font_size: 20.0,
            polygon_sides: 5,
            history_limit: 100,
            solve_endpoint: "http://localhost:8900/calculate".to_string(),
            model_load_timeout_secs: 30,
            max_model_bytes: 50 * 1024 * 1024,
            scene_scale_factor: 50.0,
            scene_pick_radius: 1.0,
        }
    }
}

/// Finite and greater than zero.
pub fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0) || self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom band [{}, {}] must be positive and ordered",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.zoom_step > 0.0) {
            return Err(ConfigError::Invalid("zoom_step must be positive".into()));
        }
        let grid = [self.grid_spacing, self.grid_min_px, self.grid_max_px];
        if grid.iter().any(|v| !v.is_finite() || *v <= 0.0) || self.grid_max_px < self.grid_min_px * 2.0 {
            return Err(ConfigError::Invalid(
                "grid spacing and band must be positive and finite, with grid_max_px at least twice grid_min_px"
                    .into(),
            ));
        }
        if !is_positive(self.line_width) || !is_positive(self.eraser_size) {
            return Err(ConfigError::Invalid("stroke widths must be positive".into()));
        }
        if !is_positive(self.font_size) {
            return Err(ConfigError::Invalid("font_size must be positive".into()));
        }
        if self.polygon_sides < 3 {
            return Err(ConfigError::Invalid("polygon_sides must be at least 3".into()));
        }
        if self.scene_scale_factor == 0.0 || !self.scene_scale_factor.is_finite() {
            return Err(ConfigError::Invalid("scene_scale_factor must be non-zero".into()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "max_zoom": 4.0, "eraser_size": 8 }"#).unwrap();
        assert!((settings.max_zoom - 4.0).abs() < f64::EPSILON);
        assert!((settings.eraser_size - 8.0).abs() < f64::EPSILON);
        assert_eq!(settings.history_limit, 100);
    }

    #[test]
    fn test_rejects_inverted_zoom_band() {
        let err = Settings::from_json(r#"{ "min_zoom": 5.0, "max_zoom": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Settings::from_json(r#"{ "min_zoom": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_scene_scale() {
        let err = Settings::from_json(r#"{ "scene_scale_factor": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    fn rejected(json: &str) -> bool {
        matches!(Settings::from_json(json), Err(ConfigError::Invalid(_)))
    }

    #[test]
    fn test_rejects_degenerate_grid_band() {
        assert!(rejected(r#"{ "grid_min_px": 0.0, "grid_max_px": 0.001 }"#));
        assert!(rejected(r#"{ "grid_min_px": -4.0 }"#));
        assert!(rejected(r#"{ "grid_min_px": 50.0, "grid_max_px": 60.0 }"#));
        assert!(rejected(r#"{ "grid_spacing": 0.0 }"#));
        let settings = Settings {
            grid_max_px: f64::INFINITY,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_text_and_polygon_settings() {
        assert!(rejected(r#"{ "font_size": 0.0 }"#));
        assert!(rejected(r#"{ "font_size": -12.0 }"#));
        assert!(rejected(r#"{ "polygon_sides": 2 }"#));
        assert!(Settings::from_json(r#"{ "polygon_sides": 3 }"#).is_ok());
    }

    #[test]
    fn test_grid_style_setting() {
        let settings = Settings::from_json(r#"{ "grid_style": "dots" }"#).unwrap();
        assert_eq!(settings.grid_style, GridStyle::Dots);
        assert_eq!(GridStyle::None.next().next().next(), GridStyle::None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "background": {{ "r": 1, "g": 2, "b": 3, "a": 255 }} }}"#).unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.background, SerializableColor::rgb(1, 2, 3));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
