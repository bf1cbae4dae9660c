/// Start-up configuration for the viewer and the chart
///
/// Every field has a built-in default, so a configuration file only needs the
/// values it overrides:
///
/// ```json
/// { "viewer": { "camera": { "focal_length": 600 } }, "chart": { "step": "0.5" } }
/// ```
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::chart::{BoundsPolicy, FunctionSpec, Rgb};
use crate::geometry::Dimensions;
use crate::projection::Viewport;
use crate::transform::RotationState;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub chart: ChartConfig,
}

impl AppConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// 3D letter viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub viewport: Viewport,
    pub show_axes: bool,
    pub camera: CameraConfig,
    pub shapes: Vec<ShapeConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            show_axes: true,
            camera: CameraConfig::default(),
            shapes: vec![
                ShapeConfig {
                    tag: 'Ч',
                    size: Dimensions::new(80.0, 120.0, 20.0),
                    position: Vector3::new(-100.0, 0.0, 0.0),
                    rotation: RotationState::zero(),
                },
                ShapeConfig {
                    tag: 'Ф',
                    size: Dimensions::new(100.0, 120.0, 20.0),
                    position: Vector3::new(100.0, 0.0, 0.0),
                    rotation: RotationState::zero(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vector3<f64>,
    pub rotation: RotationState,
    pub focal_length: f64,
    pub rotate_sensitivity: f64,
    pub zoom_divisor: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 500.0),
            rotation: RotationState::zero(),
            focal_length: 800.0,
            rotate_sensitivity: 0.5,
            zoom_divisor: 2.0,
            zoom_min: 100.0,
            zoom_max: 1000.0,
        }
    }
}

/// Initial (and reset) state of one glyph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub tag: char,
    pub size: Dimensions,
    #[serde(default = "zero_vector")]
    pub position: Vector3<f64>,
    #[serde(default)]
    pub rotation: RotationState,
}

fn zero_vector() -> Vector3<f64> {
    Vector3::zeros()
}

/// Function bar chart configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Comma-separated sample X values as typed by the user
    pub points: String,
    /// Y grid step as typed by the user
    pub step: String,
    pub policy: BoundsPolicy,
    pub functions: Vec<FunctionSpec>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            points: "1, 2, 3".to_string(),
            step: "1".to_string(),
            policy: BoundsPolicy::default(),
            functions: vec![
                FunctionSpec::new("sin(x)", Rgb::new(220, 50, 47), "sin(x)"),
                FunctionSpec::new("4/(1-x)", Rgb::new(38, 139, 210), "4/(1-x)"),
                FunctionSpec::new("x^2 - 3", Rgb::new(133, 153, 0), "x²-3"),
                FunctionSpec::new("sqrt(x)", Rgb::new(211, 54, 130), "√x"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.viewer.shapes.len(), 2);
        assert_eq!(config.viewer.shapes[0].tag, 'Ч');
        assert_eq!(config.viewer.camera.zoom_max, 1000.0);
        assert_eq!(config.chart.functions.len(), 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "viewer": { "camera": { "focal_length": 600 } }, "chart": { "step": "0.5", "policy": "step_rounded" } }"#,
        )
        .unwrap();
        assert_eq!(config.viewer.camera.focal_length, 600.0);
        assert_eq!(config.viewer.camera.position, Vector3::new(0.0, 0.0, 500.0));
        assert_eq!(config.viewer.shapes.len(), 2);
        assert_eq!(config.chart.step, "0.5");
        assert_eq!(config.chart.policy, BoundsPolicy::StepRounded);
        assert_eq!(config.chart.points, "1, 2, 3");
    }

    #[test]
    fn test_custom_shapes() {
        let config = AppConfig::from_json_str(
            r#"{ "viewer": { "shapes": [ { "tag": "Ф", "size": { "width": 10, "height": 20, "depth": 5 } } ] } }"#,
        )
        .unwrap();
        assert_eq!(config.viewer.shapes.len(), 1);
        assert_eq!(config.viewer.shapes[0].position, Vector3::zeros());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AppConfig::from_json_str("{ viewer"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
