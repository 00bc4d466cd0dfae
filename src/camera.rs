use bevy::{
    input::mouse::{AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
};

use crate::config::SceneConfig;

/// Closest the camera may get to its target
pub const MIN_DISTANCE: f32 = 0.001;

/// Distance moved per keypad +/- press
const KEYPAD_ZOOM_STEP: f32 = 2.0;

/// Pixel scroll deltas are roughly this many pixels per wheel notch
const PIXELS_PER_LINE: f32 = 20.0;

/// Camera that circles its target at a constant angular speed
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub up: Vec3,
    /// Radians per second
    pub speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            up: Vec3::Y,
            speed: 0.5,
        }
    }
}

/// Systems that move the camera; lighting reads the result
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraSet;

pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (orbit_camera, zoom_camera).chain().in_set(CameraSet),
        );
    }
}

/// Rotate `position` around the axis `up` passing through `target`
pub fn orbit_position(position: Vec3, target: Vec3, up: Vec3, angle: f32) -> Vec3 {
    let axis = up.try_normalize().unwrap_or(Vec3::Y);
    let view = position - target;
    target + Quat::from_axis_angle(axis, angle) * view
}

/// Move along the view ray by `delta` (positive moves away), never reaching the target
pub fn move_to_target(position: Vec3, target: Vec3, delta: f32) -> Vec3 {
    let offset = position - target;
    let distance = (offset.length() + delta).max(MIN_DISTANCE);
    let backward = offset.try_normalize().unwrap_or(Vec3::Z);
    target + backward * distance
}

fn spawn_camera(mut commands: Commands, config: Res<SceneConfig>) {
    let camera = &config.camera;
    let target = Vec3::from(camera.target);
    let up = Vec3::from(camera.up);

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fovy.to_radians(),
            ..default()
        }),
        Transform::from_translation(Vec3::from(camera.position)).looking_at(target, up),
        OrbitCamera {
            target,
            up,
            speed: camera.orbit_speed,
        },
    ));

    debug!(
        "Orbit camera at {:?} looking at {:?}",
        camera.position, camera.target
    );
}

fn orbit_camera(time: Res<Time>, mut query: Query<(&OrbitCamera, &mut Transform)>) {
    let dt = time.delta_secs();
    for (orbit, mut transform) in query.iter_mut() {
        transform.translation =
            orbit_position(transform.translation, orbit.target, orbit.up, orbit.speed * dt);
        transform.look_at(orbit.target, orbit.up);
    }
}

fn zoom_camera(
    mouse_scroll: Res<AccumulatedMouseScroll>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&OrbitCamera, &mut Transform)>,
) {
    let wheel = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
    };

    // Wheel up pulls the camera in
    let mut delta = -wheel;
    if keyboard_input.just_pressed(KeyCode::NumpadSubtract) {
        delta += KEYPAD_ZOOM_STEP;
    }
    if keyboard_input.just_pressed(KeyCode::NumpadAdd) {
        delta -= KEYPAD_ZOOM_STEP;
    }
    if delta == 0.0 {
        return;
    }

    for (orbit, mut transform) in query.iter_mut() {
        transform.translation = move_to_target(transform.translation, orbit.target, delta);
        transform.look_at(orbit.target, orbit.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_orbit_preserves_distance_and_height() {
        let start = Vec3::new(0.0, 10.0, 10.0);
        let mut position = start;
        for _ in 0..240 {
            position = orbit_position(position, Vec3::ZERO, Vec3::Y, 0.5 / 60.0);
        }

        assert!((position.length() - start.length()).abs() < EPSILON);
        assert!((position.y - start.y).abs() < EPSILON);
        assert!(position.distance(start) > 1.0);
    }

    #[test]
    fn test_quarter_orbit() {
        let position = orbit_position(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO, Vec3::Y, FRAC_PI_2);
        assert!(position.abs_diff_eq(Vec3::new(10.0, 10.0, 0.0), EPSILON));
    }

    #[test]
    fn test_orbit_around_offset_target() {
        let target = Vec3::new(5.0, 0.0, 5.0);
        let position = orbit_position(Vec3::new(5.0, 2.0, 8.0), target, Vec3::Y, FRAC_PI_2);
        assert!(position.abs_diff_eq(Vec3::new(8.0, 2.0, 5.0), EPSILON));
    }

    #[test]
    fn test_move_to_target() {
        let position = Vec3::new(0.0, 0.0, 10.0);

        let closer = move_to_target(position, Vec3::ZERO, -2.0);
        assert!(closer.abs_diff_eq(Vec3::new(0.0, 0.0, 8.0), EPSILON));

        let farther = move_to_target(position, Vec3::ZERO, 2.0);
        assert!(farther.abs_diff_eq(Vec3::new(0.0, 0.0, 12.0), EPSILON));
    }

    #[test]
    fn test_move_to_target_never_reaches_target() {
        let position = move_to_target(Vec3::new(3.0, 4.0, 0.0), Vec3::ZERO, -50.0);
        assert!((position.length() - MIN_DISTANCE).abs() < EPSILON);
        assert!(position.x > 0.0 && position.y > 0.0);
    }
}
