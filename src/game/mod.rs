//! The main game module for the bomber game.
//!
//! This module contains all the gameplay logic including:
//! - The block grid and level layouts
//! - The avatar, its animation strip and collision-aware movement
//! - Virtual thumbsticks and the on-screen controls
//! - Bombs and blasts
//! - Level flow: countdown, clock, outcome and high scores

pub mod animation;
pub mod bomb;
pub mod bomberman;
mod debug;
pub mod geometry;
pub mod highscore;
pub mod hud;
pub mod level;
pub mod movement;
mod polish;
pub mod session;
pub mod sprites;
pub mod thumbstick;

use bevy::{prelude::*, sprite::Anchor};

use crate::{screens::Screen, theme::palette};
use geometry::{Rect, SCREEN_SIZE, to_world};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        animation::plugin,
        sprites::plugin,
        level::plugin,
        thumbstick::plugin,
        bomberman::plugin,
        movement::plugin,
        bomb::plugin,
        session::plugin,
        highscore::plugin,
        hud::plugin,
        polish::plugin,
        debug::plugin,
    ));
}

/// System to spawn the game backdrop when entering gameplay.
/// Called from `screens/gameplay.rs` on `OnEnter(Screen::Gameplay)`.
pub fn spawn_game(mut commands: Commands) {
    let screen = Rect::from_position(Vec2::ZERO, SCREEN_SIZE.x as i32, SCREEN_SIZE.y as i32);
    commands.spawn((
        Name::new("Backdrop"),
        Sprite {
            color: palette::BACKDROP,
            custom_size: Some(screen.size()),
            ..default()
        },
        Anchor::TOP_LEFT,
        Transform::from_translation(to_world(screen.position(), -2.0)),
        DespawnOnExit(Screen::Gameplay),
    ));

    info!("Game spawned - bomber ready!");
}
