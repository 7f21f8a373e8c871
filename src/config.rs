//! Backdrop configuration, loadable from JSON.
//!
//! Every section is `#[serde(default)]`, so a file only lists what it
//! overrides.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ConfigError, Result, SceneError};
use crate::interaction::InteractionConfig;
use crate::math::Color;
use crate::particles::ParticleConfig;
use crate::scene::{Camera, DirectionalLight};
use crate::theme::Theme;
use crate::tree::TreeProfile;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 3.0, 8.0),
            target: Vec3::new(0.0, 3.0, 0.0),
        }
    }
}

impl CameraConfig {
    pub fn camera(&self, aspect: f32) -> Camera {
        Camera::new(self.position, self.target, self.fov_y_degrees, aspect, self.near, self.far)
    }

    fn validate(&self) -> Result<()> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(SceneError::invalid(
                "camera.fov_y_degrees",
                format!("{} is outside (0, 180)", self.fov_y_degrees),
            ));
        }
        ensure_non_negative("camera.near", self.near)?;
        if self.near <= 0.0 || self.far <= self.near {
            return Err(SceneError::invalid(
                "camera.far",
                format!("expected 0 < near < far, got near {} far {}", self.near, self.far),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl From<LightConfig> for DirectionalLight {
    fn from(light: LightConfig) -> Self {
        DirectionalLight::new(light.color, light.intensity, light.position)
    }
}

/// Key light plus a cool fill from the opposite side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub directional: Vec<LightConfig>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            directional: vec![
                LightConfig {
                    color: Color::WHITE,
                    intensity: 0.8,
                    position: Vec3::new(5.0, 10.0, 5.0),
                },
                LightConfig {
                    color: Color::from_hex(0x88ccff),
                    intensity: 0.3,
                    position: Vec3::new(-5.0, 5.0, -5.0),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Seed for every random draw; a fresh one is picked when absent
    pub seed: Option<u64>,
    /// Theme used when the host provides no theme attribute
    pub theme: Theme,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub tree: TreeProfile,
    pub leaves: ParticleConfig,
    pub interaction: InteractionConfig,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            seed: None,
            theme: Theme::Light,
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            tree: TreeProfile::default(),
            leaves: ParticleConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl BackdropConfig {
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json_pretty(&self) -> String {
        // plain data with string keys, serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Check every section; the first offending field is reported
    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        for (i, light) in self.lighting.directional.iter().enumerate() {
            ensure_non_negative(&format!("lighting.directional[{i}].intensity"), light.intensity)?;
        }
        self.tree.validate()?;
        self.leaves.validate()?;
        self.interaction.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: BackdropConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BackdropConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = r##"{
            "seed": 7,
            "theme": "dark",
            "leaves": { "count": 12, "palette": ["#ff9800"] },
            "interaction": { "enabled": false }
        }"##;
        let config: BackdropConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.leaves.count, 12);
        assert_eq!(config.leaves.opacity, 0.8);
        assert!(!config.interaction.enabled);
        assert_eq!(config.interaction.sensitivity, 0.01);
        assert_eq!(config.tree.layers.len(), 5);
    }

    #[test]
    fn crown_layers_round_trip_with_optional_phase() {
        let json = r##"{ "tree": { "layers": [
            { "radius": 1.0, "base_height": 4.0, "color": "#2d5016" },
            { "radius": 0.8, "base_height": 4.6, "color": "#4a8229", "phase": 1.5 }
        ] } }"##;
        let config: BackdropConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.tree.layers[0].phase, None);
        assert_eq!(config.tree.layers[1].phase, Some(1.5));
    }

    #[test]
    fn bad_color_is_a_parse_error() {
        let json = r#"{ "tree": { "trunk": { "color": "brown" } } }"#;
        assert!(serde_json::from_str::<BackdropConfig>(json).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = BackdropConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn load_reads_json_file() {
        let path = std::env::temp_dir().join(format!("tree-backdrop-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "seed": 99 }"#).unwrap();
        let config = BackdropConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn validate_rejects_bad_camera() {
        let mut config = BackdropConfig::default();
        config.camera.far = 0.05;
        assert!(config.validate().is_err());
    }

    #[test]
    fn pretty_json_parses_back() {
        let config = BackdropConfig::default();
        let back: BackdropConfig = serde_json::from_str(&config.to_json_pretty()).unwrap();
        assert_eq!(back, config);
    }
}
