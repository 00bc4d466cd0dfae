use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

const WELCOME: &str = "Welcome to the third dimension!";
const FONT_SIZE: f32 = 20.0;

/// Marker component for the FPS readout
#[derive(Component)]
pub struct FpsText;

/// Marker component for the welcome banner
#[derive(Component)]
pub struct WelcomeText;

/// Screen-space overlay: welcome banner and FPS counter
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
            app.add_plugins(FrameTimeDiagnosticsPlugin::default());
        }
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, update_fps_text);
    }
}

/// Colour of the FPS readout: lime when smooth, orange when struggling, red below 15
pub fn fps_color(fps: f64) -> Color {
    if fps < 15.0 {
        Color::srgb_u8(230, 41, 55)
    } else if fps < 30.0 {
        Color::srgb_u8(255, 161, 0)
    } else {
        Color::srgb_u8(0, 158, 47)
    }
}

pub fn format_fps(fps: f64) -> String {
    format!("{} FPS", fps.max(0.0).round() as u32)
}

fn spawn_hud(mut commands: Commands) {
    let text_font = TextFont {
        font_size: FONT_SIZE,
        ..default()
    };

    commands.spawn((
        Text::new(format_fps(0.0)),
        text_font.clone(),
        TextColor(fps_color(0.0)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        FpsText,
    ));

    commands.spawn((
        Text::new(WELCOME),
        text_font,
        TextColor(Color::srgb_u8(80, 80, 80)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(40.0),
            left: Val::Px(10.0),
            ..default()
        },
        WelcomeText,
    ));
}

fn update_fps_text(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<(&mut Text, &mut TextColor), With<FpsText>>,
) {
    let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
    else {
        return;
    };

    for (mut text, mut color) in query.iter_mut() {
        text.0 = format_fps(fps);
        color.0 = fps_color(fps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_color_thresholds() {
        let lime = Color::srgb_u8(0, 158, 47);
        let orange = Color::srgb_u8(255, 161, 0);
        let red = Color::srgb_u8(230, 41, 55);

        assert_eq!(fps_color(60.0), lime);
        assert_eq!(fps_color(30.0), lime);
        assert_eq!(fps_color(29.9), orange);
        assert_eq!(fps_color(15.0), orange);
        assert_eq!(fps_color(14.9), red);
        assert_eq!(fps_color(0.0), red);
    }

    #[test]
    fn test_format_fps() {
        assert_eq!(format_fps(59.6), "60 FPS");
        assert_eq!(format_fps(0.0), "0 FPS");
        assert_eq!(format_fps(-3.0), "0 FPS");
    }
}
