use anyhow::bail;
use bevy::{log::LogPlugin, prelude::*, window::WindowResolution};
use clap::Parser;

use burako::{config::CliArgs, BurakoPlugin};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.resolve()?;

    let window = Window {
        title: config.window.title.clone(),
        resolution: WindowResolution::new(
            config.window.width as f32,
            config.window.height as f32,
        ),
        // Only used by the browser build
        canvas: Some("#burako".to_string()),
        ..default()
    };

    let exit = App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(window),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: args.assets.clone(),
                    ..default()
                })
                .set(LogPlugin {
                    filter: config.log_filter.clone(),
                    ..default()
                }),
        )
        .add_plugins(BurakoPlugin::new(config))
        .run();

    if let AppExit::Error(code) = exit {
        bail!("viewer exited with code {code}");
    }
    Ok(())
}
