use bevy::prelude::*;
use bevy::color::ColorToComponents;
use bevy::render::render_resource::ShaderType;
use serde::{Deserialize, Serialize};

use crate::camera::OrbitCamera;
use crate::config::SceneConfig;
use crate::rendering::LitMaterial;

/// Number of light slots the lighting shader reserves
pub const MAX_LIGHTS: usize = 4;

const MARKER_RADIUS: f32 = 0.2;
const MARKER_RESOLUTION: u32 = 8;
const DISABLED_MARKER_ALPHA: f32 = 0.3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Directional,
    #[default]
    Point,
}

impl LightKind {
    /// Value the shader switches on; keep in sync with `lighting.wgsl`
    pub fn shader_code(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
        }
    }
}

/// A light feeding the lit material. Its position is the entity's `Transform`.
#[derive(Component, Debug, Clone)]
pub struct SceneLight {
    pub kind: LightKind,
    pub target: Vec3,
    pub color: Color,
    pub enabled: bool,
}

impl Default for SceneLight {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            target: Vec3::ZERO,
            color: Color::WHITE,
            enabled: true,
        }
    }
}

/// Ambient term added to every lit fragment
#[derive(Resource, Debug, Clone, Copy)]
pub struct AmbientLevel(pub LinearRgba);

impl Default for AmbientLevel {
    fn default() -> Self {
        Self(LinearRgba::new(0.1, 0.1, 0.1, 1.0))
    }
}

#[derive(ShaderType, Debug, Clone, Copy, Default, PartialEq)]
pub struct GpuLight {
    pub position: Vec3,
    pub kind: u32,
    pub target: Vec3,
    pub enabled: u32,
    pub color: LinearRgba,
}

#[derive(ShaderType, Debug, Clone, Copy, Default, PartialEq)]
pub struct LightingUniform {
    pub view_pos: Vec3,
    pub light_count: u32,
    pub ambient: LinearRgba,
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl LightingUniform {
    /// Pack the camera position, ambient level and up to `MAX_LIGHTS` lights.
    /// Extra lights are dropped.
    pub fn pack<'a>(
        view_pos: Vec3,
        ambient: LinearRgba,
        lights: impl IntoIterator<Item = (Vec3, &'a SceneLight)>,
    ) -> Self {
        let mut uniform = Self {
            view_pos,
            light_count: 0,
            ambient,
            lights: [GpuLight::default(); MAX_LIGHTS],
        };

        for (slot, (position, light)) in uniform.lights.iter_mut().zip(lights) {
            *slot = GpuLight {
                position,
                kind: light.kind.shader_code(),
                target: light.target,
                enabled: light.enabled as u32,
                color: LinearRgba::from(light.color),
            };
            uniform.light_count += 1;
        }

        uniform
    }
}

pub struct SceneLightingPlugin;

impl Plugin for SceneLightingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AmbientLevel>()
            .add_systems(Startup, spawn_lights)
            .add_systems(
                Update,
                (
                    sync_marker_visibility,
                    draw_disabled_light_markers,
                    update_material_light_info.after(crate::camera::CameraSet),
                ),
            );
    }
}

fn spawn_lights(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(AmbientLevel(LinearRgba::from_f32_array(config.ambient)));

    let marker_mesh = meshes.add(
        Sphere::new(MARKER_RADIUS)
            .mesh()
            .uv(MARKER_RESOLUTION, MARKER_RESOLUTION),
    );

    for light in config.lights.iter().take(MAX_LIGHTS) {
        let color = Color::LinearRgba(LinearRgba::from_f32_array(light.color));
        let visibility = if light.enabled {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        commands.spawn((
            SceneLight {
                kind: light.kind,
                target: Vec3::from(light.target),
                color,
                enabled: light.enabled,
            },
            Transform::from_translation(Vec3::from(light.position)),
            Mesh3d(marker_mesh.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..default()
            })),
            visibility,
        ));
    }

    info!("Spawned {} scene light(s)", config.lights.len().min(MAX_LIGHTS));
}

/// Enabled lights show a solid marker, disabled ones fall back to a wire sphere
fn sync_marker_visibility(
    mut lights: Query<(&SceneLight, &mut Visibility), Changed<SceneLight>>,
) {
    for (light, mut visibility) in lights.iter_mut() {
        visibility.set_if_neq(if light.enabled {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}

fn draw_disabled_light_markers(mut gizmos: Gizmos, lights: Query<(&Transform, &SceneLight)>) {
    for (transform, light) in lights.iter() {
        if light.enabled {
            continue;
        }
        gizmos
            .sphere(
                Isometry3d::from_translation(transform.translation),
                MARKER_RADIUS,
                light.color.with_alpha(DISABLED_MARKER_ALPHA),
            )
            .resolution(MARKER_RESOLUTION);
    }
}

/// Push the camera position and light state into every lit material.
/// Only materials holding a stale uniform are touched, so an idle scene
/// does not re-upload its bind groups every frame.
fn update_material_light_info(
    camera: Query<&Transform, With<OrbitCamera>>,
    lights: Query<(&Transform, &SceneLight)>,
    ambient: Res<AmbientLevel>,
    mut materials: ResMut<Assets<LitMaterial>>,
) {
    let Ok(camera_transform) = camera.single() else {
        return;
    };

    let uniform = LightingUniform::pack(
        camera_transform.translation,
        ambient.0,
        lights.iter().map(|(transform, light)| (transform.translation, light)),
    );

    let stale: Vec<AssetId<LitMaterial>> = materials
        .iter()
        .filter(|(_, material)| material.lighting != uniform)
        .map(|(id, _)| id)
        .collect();

    for id in stale {
        if let Some(material) = materials.get_mut(id) {
            material.lighting = uniform;
        }
    }
}
