//! Asset loading for the scene: OBJ models and the generated floor cloth

pub mod fabric;
pub mod obj_loader;

pub use fabric::*;
pub use obj_loader::*;

use bevy::prelude::*;

/// Registers the `.obj` mesh loader
pub struct ObjLoaderPlugin;

impl Plugin for ObjLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset_loader::<ObjLoader>();
    }
}
