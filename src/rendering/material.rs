use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::render_resource::{AsBindGroup, ShaderRef};

use crate::lighting::LightingUniform;

/// Per-pixel Blinn-Phong material shared by the floor, the board and the pieces.
///
/// Without a diffuse texture the shader samples bevy's white fallback image,
/// so `tint` alone colours the surface.
#[derive(AsBindGroup, Debug, Clone, Asset, TypePath)]
pub struct LitMaterial {
    #[uniform(0)]
    pub tint: LinearRgba,

    #[texture(1)]
    #[sampler(2)]
    pub diffuse_texture: Option<Handle<Image>>,

    #[uniform(3)]
    pub lighting: LightingUniform,
}

impl LitMaterial {
    pub fn new(tint: LinearRgba, diffuse_texture: Option<Handle<Image>>) -> Self {
        Self {
            tint,
            diffuse_texture,
            lighting: LightingUniform::default(),
        }
    }
}

impl Material for LitMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/lighting.wgsl".into()
    }
}

/// Plugin for the lit material
pub struct LitMaterialPlugin;

impl Plugin for LitMaterialPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<LitMaterial>::default());
    }
}
