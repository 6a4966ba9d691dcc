// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

mod config;
#[cfg(feature = "dev")]
mod dev_tools;
mod game;
mod menus;
mod screens;
mod theme;

use bevy::prelude::*;

use crate::{config::GameConfig, game::geometry::SCREEN_SIZE};

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        // Tuning has to be known before any state transition runs.
        let config = GameConfig::load();
        let tick_hz = config.movement.tick_hz;

        // Add Bevy plugins.
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Honey Bomber".to_string(),
                resolution: (SCREEN_SIZE.x as u32, SCREEN_SIZE.y as u32).into(),
                resizable: false,
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.insert_resource(config);
        app.insert_resource(Time::<Fixed>::from_hz(tick_hz));

        // Add other plugins.
        app.add_plugins((
            #[cfg(feature = "dev")]
            dev_tools::plugin,
            game::plugin,
            menus::plugin,
            screens::plugin,
            theme::plugin,
        ));

        // Order new `AppSystems` variants by adding them here:
        app.configure_sets(
            Update,
            (
                AppSystems::TickTimers,
                AppSystems::RecordInput,
                AppSystems::Update,
            )
                .chain(),
        );

        // Set up the `Pause` state. Movement runs on the fixed clock, so it
        // has to honour the pause as well.
        app.init_state::<Pause>();
        app.configure_sets(Update, PausableSystems.run_if(in_state(Pause(false))));
        app.configure_sets(
            FixedUpdate,
            PausableSystems.run_if(in_state(Pause(false))),
        );

        // Spawn the main camera.
        app.add_systems(Startup, spawn_camera);
    }
}

/// High-level groupings of systems for the app in the `Update` schedule.
/// When adding a new variant, make sure to order it in the `configure_sets`
/// call above.
#[derive(SystemSet, Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
enum AppSystems {
    /// Tick timers.
    TickTimers,
    /// Record player input.
    RecordInput,
    /// Do everything else (consider splitting this into further variants).
    Update,
}

/// Whether or not the game is paused.
#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
struct Pause(pub bool);

/// A system set for systems that shouldn't run while the game is paused.
#[derive(SystemSet, Copy, Clone, Eq, PartialEq, Hash, Debug)]
struct PausableSystems;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("Camera"), Camera2d));
}
