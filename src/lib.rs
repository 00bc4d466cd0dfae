//! Tabletop scene viewer: a lit board and piece (or a bare grid floor)
//! under an orbiting camera.

use bevy::prelude::*;

pub mod assets;
pub mod camera;
pub mod config;
pub mod hud;
pub mod lighting;
pub mod pacing;
pub mod rendering;
pub mod scenes;

use assets::ObjLoaderPlugin;
use camera::OrbitCameraPlugin;
use config::SceneConfig;
use hud::HudPlugin;
use lighting::SceneLightingPlugin;
use pacing::FramePacingPlugin;
use rendering::LitMaterialPlugin;
use scenes::TabletopScenePlugin;

/// Everything the viewer adds on top of `DefaultPlugins`
pub struct BurakoPlugin {
    pub config: SceneConfig,
}

impl BurakoPlugin {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }
}

impl Plugin for BurakoPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone()).add_plugins((
            LitMaterialPlugin,
            ObjLoaderPlugin,
            OrbitCameraPlugin,
            SceneLightingPlugin,
            TabletopScenePlugin,
            HudPlugin,
            FramePacingPlugin {
                target_fps: self.config.window.target_fps,
            },
        ));
    }
}
