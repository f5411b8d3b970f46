use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use desktop_mate::config::Settings;
use desktop_mate::shell::{self, ShellPlugin};
use desktop_mate::view::ViewPlugin;

fn main() -> AppExit {
    let settings = Settings::parse();
    let passthrough = settings.passthrough();

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(shell::window_plugin(passthrough))
            .set(LogPlugin {
                level: Level::INFO,
                filter: settings.log_filter.clone(),
                ..default()
            }),
    )
    .insert_resource(ClearColor(Color::srgba(0.0, 0.0, 0.0, 0.0)))
    .add_plugins(ShellPlugin { passthrough })
    .add_plugins(ViewPlugin {
        species: settings.character,
        mode: settings.controls,
    });

    info!(
        "desktop-mate {} starting (passthrough {})",
        env!("CARGO_PKG_VERSION"),
        if passthrough { "on" } else { "off" }
    );
    app.run()
}
