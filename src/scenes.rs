use std::f32::consts::FRAC_PI_2;

use bevy::asset::AssetLoadFailedEvent;
use bevy::color::ColorToComponents;
use bevy::prelude::*;

use crate::assets::{fabric_texture, FabricParams};
use crate::config::SceneConfig;
use crate::rendering::LitMaterial;

const GRID_CELLS: u32 = 40;
const GRID_SPACING: f32 = 1.0;
/// Lifts the grid off the floor so the lines don't z-fight with it
const GRID_LIFT: f32 = 0.01;

// Marker components for scene entities
#[derive(Component)]
pub struct Floor;

#[derive(Component, Debug)]
pub struct Prop {
    pub name: String,
}

/// Builds the floor, the props and the per-frame scene extras
pub struct TabletopScenePlugin;

impl Plugin for TabletopScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, (spawn_floor, spawn_props))
            .add_systems(
                Update,
                (
                    draw_floor_grid,
                    close_on_escape,
                    report_failed_loads::<Mesh>,
                    report_failed_loads::<Image>,
                ),
            );
    }
}

fn spawn_floor(
    mut commands: Commands,
    config: Res<SceneConfig>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<LitMaterial>>,
) {
    let floor = &config.floor;
    let texture = match &floor.texture {
        Some(path) => asset_server.load::<Image>(path.as_str()),
        None => {
            debug!("No floor texture configured, generating fabric");
            images.add(fabric_texture(&FabricParams {
                seed: floor.fabric_seed,
                ..default()
            }))
        }
    };

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(floor.size, floor.size))),
        MeshMaterial3d(materials.add(LitMaterial::new(
            LinearRgba::from_f32_array(floor.tint),
            Some(texture),
        ))),
        Transform::IDENTITY,
        Floor,
    ));
}

fn spawn_props(
    mut commands: Commands,
    config: Res<SceneConfig>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<LitMaterial>>,
) {
    if !config.scene.draws_props() {
        return;
    }

    for prop in &config.props {
        info!("Loading prop '{}' from {}", prop.name, prop.model);

        let mesh: Handle<Mesh> = asset_server.load(prop.model.as_str());
        let texture = prop
            .texture
            .as_ref()
            .map(|path| asset_server.load::<Image>(path.as_str()));

        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(LitMaterial::new(
                LinearRgba::from_f32_array(prop.tint),
                texture,
            ))),
            Transform::from_translation(Vec3::from(prop.position))
                .with_scale(Vec3::splat(prop.scale)),
            Prop {
                name: prop.name.clone(),
            },
        ));
    }
}

fn draw_floor_grid(mut gizmos: Gizmos, config: Res<SceneConfig>) {
    if !config.scene.draws_grid() {
        return;
    }

    gizmos.grid(
        Isometry3d::new(
            Vec3::new(0.0, GRID_LIFT, 0.0),
            Quat::from_rotation_x(FRAC_PI_2),
        ),
        UVec2::splat(GRID_CELLS),
        Vec2::splat(GRID_SPACING),
        Color::srgb(0.5, 0.5, 0.5),
    );
}

fn close_on_escape(keyboard_input: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keyboard_input.just_pressed(KeyCode::Escape) {
        info!("Escape pressed, closing");
        exit.write(AppExit::Success);
    }
}

/// A missing model or texture leaves the prop invisible; say which one
fn report_failed_loads<A: Asset>(mut failures: EventReader<AssetLoadFailedEvent<A>>) {
    for failure in failures.read() {
        warn!("Failed to load {}: {}", failure.path, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ObjLoaderPlugin;
    use crate::config::SceneKind;

    #[test]
    fn test_escape_requests_exit() {
        let mut app = App::new();
        app.add_event::<AppExit>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, close_on_escape);

        app.update();
        assert!(app.world().resource::<Events<AppExit>>().is_empty());

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();

        let exits: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<AppExit>>()
            .drain()
            .collect();
        assert_eq!(exits, vec![AppExit::Success]);
    }

    #[test]
    fn test_other_keys_do_not_exit() {
        let mut app = App::new();
        app.add_event::<AppExit>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, close_on_escape);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Space);
        app.update();

        assert!(app.world().resource::<Events<AppExit>>().is_empty());
    }

    fn props_app(scene: SceneKind) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), ObjLoaderPlugin))
            .init_asset::<Mesh>()
            .init_asset::<Image>()
            .init_asset::<LitMaterial>()
            .insert_resource(SceneConfig {
                scene,
                ..default()
            })
            .add_systems(Startup, spawn_props);
        app
    }

    fn prop_names(app: &mut App) -> Vec<String> {
        let world = app.world_mut();
        let mut names: Vec<String> = world
            .query::<&Prop>()
            .iter(world)
            .map(|prop| prop.name.clone())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_table_spawns_board_and_piece() {
        let mut app = props_app(SceneKind::Table);
        app.update();

        assert_eq!(prop_names(&mut app), vec!["board", "piece"]);
        assert_eq!(app.world().resource::<Assets<LitMaterial>>().len(), 2);
    }

    #[test]
    fn test_grid_spawns_no_props() {
        let mut app = props_app(SceneKind::Grid);
        app.update();

        assert!(prop_names(&mut app).is_empty());
        assert_eq!(app.world().resource::<Assets<LitMaterial>>().len(), 0);
    }
}
