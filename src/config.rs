use std::path::{Path, PathBuf};

use bevy::prelude::*;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lighting::{LightKind, MAX_LIGHTS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid scene config: {0}")]
    Invalid(String),
}

/// Which of the two scenes to build
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Board and piece on a fabric-covered table
    #[default]
    Table,
    /// Bare floor with a reference grid
    Grid,
}

impl SceneKind {
    pub fn draws_props(&self) -> bool {
        matches!(self, SceneKind::Table)
    }

    pub fn draws_grid(&self) -> bool {
        matches!(self, SceneKind::Grid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// 0 disables the frame limiter
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            title: "burako".to_string(),
            target_fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fovy: f32,
    /// Orbit speed in radians per second
    pub orbit_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 10.0, 10.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fovy: 45.0,
            orbit_speed: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    pub kind: LightKind,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub color: [f32; 4],
    pub enabled: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            position: [0.0, 15.0, -15.0],
            target: [0.0, 0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FloorConfig {
    pub size: f32,
    /// Falls back to the procedural fabric when unset
    pub texture: Option<String>,
    pub tint: [f32; 4],
    pub fabric_seed: u32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            size: 40.0,
            texture: None,
            tint: [1.0, 1.0, 1.0, 1.0],
            fabric_seed: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropConfig {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default = "white")]
    pub tint: [f32; 4],
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn unit_scale() -> f32 {
    1.0
}

/// Full description of the scene the viewer draws
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub scene: SceneKind,
    pub camera: CameraConfig,
    pub ambient: [f32; 4],
    pub lights: Vec<LightConfig>,
    pub floor: FloorConfig,
    pub props: Vec<PropConfig>,
    pub log_filter: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scene: SceneKind::default(),
            camera: CameraConfig::default(),
            ambient: [0.1, 0.1, 0.1, 1.0],
            lights: vec![LightConfig::default()],
            floor: FloorConfig::default(),
            props: vec![
                PropConfig {
                    name: "board".to_string(),
                    model: "models/obj/board.obj".to_string(),
                    texture: None,
                    tint: [0.08, 0.08, 0.08, 1.0],
                    position: [0.0, 0.0, 0.0],
                    scale: 1.0,
                },
                PropConfig {
                    name: "piece".to_string(),
                    model: "models/obj/1.obj".to_string(),
                    texture: None,
                    tint: [0.9, 0.16, 0.22, 1.0],
                    position: [0.0, 0.0, 0.0],
                    scale: 1.0,
                },
            ],
            log_filter: "info,wgpu=error,naga=warn".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.camera.fovy > 0.0 && self.camera.fovy < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fovy must be in (0, 180) degrees, got {}",
                self.camera.fovy
            )));
        }
        if Vec3::from(self.camera.position) == Vec3::from(self.camera.target) {
            return Err(ConfigError::Invalid(
                "camera position and target coincide".to_string(),
            ));
        }
        if self.lights.len() > MAX_LIGHTS {
            return Err(ConfigError::Invalid(format!(
                "at most {MAX_LIGHTS} lights are supported, got {}",
                self.lights.len()
            )));
        }
        if self.floor.size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "floor size must be positive, got {}",
                self.floor.size
            )));
        }
        for prop in &self.props {
            if prop.model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "prop '{}' has no model path",
                    prop.name
                )));
            }
            if prop.scale <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "prop '{}' scale must be positive, got {}",
                    prop.name, prop.scale
                )));
            }
        }
        Ok(())
    }

    /// Apply command line overrides on top of the file (or default) config
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(scene) = args.scene {
            self.scene = scene;
        }
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if let Some(filter) = &args.log_filter {
            self.log_filter = filter.clone();
        }
    }
}

/// Tabletop scene viewer
#[derive(Parser, Debug)]
#[command(version)]
pub struct CliArgs {
    /// JSON scene description; built-in defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scene variant to draw
    #[arg(long, value_enum)]
    pub scene: Option<SceneKind>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Directory the models, textures and shaders are loaded from
    #[arg(long, default_value = "assets")]
    pub assets: String,

    /// tracing filter directive, e.g. "info,burako=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl CliArgs {
    pub fn resolve(&self) -> Result<SceneConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        config.apply_overrides(self);
        config.validate()?;
        Ok(config)
    }
}
