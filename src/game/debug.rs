//! Debug visualization for the level grid and collision rectangles.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - Grid cell outlines
//! - Solid tiles
//! - The avatar's body and collision area
//! - The thumbstick and its outer touch area
//! - Cells covered by active blasts

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    bomb::{Bomb, Explosion},
    bomberman::Bomberman,
    geometry::{Rect, to_world},
    level::{CurrentLevel, LEVEL_HEIGHT, LEVEL_WIDTH, Level},
    thumbstick::ControlPad,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugOverlayVisible>();

    app.add_systems(
        Update,
        toggle_debug
            .run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    app.add_systems(
        Update,
        (draw_grid, draw_actors, draw_controls)
            .run_if(in_state(Screen::Gameplay).and(debug_visible)),
    );
}

/// Resource to track if the debug overlay is visible.
#[derive(Resource, Default)]
pub struct DebugOverlayVisible(pub bool);

fn debug_visible(debug: Res<DebugOverlayVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugOverlayVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug overlay: {}", state);
}

/// Outline a screen-space rectangle.
fn draw_rect(gizmos: &mut Gizmos, rect: Rect, color: impl Into<Color>) {
    let center = to_world(rect.center(), 0.0).truncate();
    gizmos.rect_2d(Isometry2d::from_translation(center), rect.size(), color);
}

fn draw_grid(mut gizmos: Gizmos, level: Res<CurrentLevel>) {
    let bounds = Level::pixel_bounds();
    let line_color = css::WHITE.with_alpha(0.15);

    for x in 0..=LEVEL_WIDTH as i32 {
        let top = Level::cell_bounds(UVec2::new(x as u32, 0)).position();
        gizmos.line_2d(
            to_world(top, 0.0).truncate(),
            to_world(top.with_y(bounds.bottom() as f32), 0.0).truncate(),
            line_color,
        );
    }
    for y in 0..=LEVEL_HEIGHT as i32 {
        let left = Level::cell_bounds(UVec2::new(0, y as u32)).position();
        gizmos.line_2d(
            to_world(left, 0.0).truncate(),
            to_world(left.with_x(bounds.right() as f32), 0.0).truncate(),
            line_color,
        );
    }

    for solid in level.0.solid_rects() {
        draw_rect(&mut gizmos, solid, css::INDIAN_RED.with_alpha(0.6));
    }
    draw_rect(
        &mut gizmos,
        Level::cell_bounds(level.0.exit()),
        css::AQUA.with_alpha(0.8),
    );
    draw_rect(&mut gizmos, bounds, css::ORANGE.with_alpha(0.8));
}

fn draw_actors(
    mut gizmos: Gizmos,
    bombermen: Query<&Bomberman>,
    bombs: Query<&Bomb>,
    explosions: Query<&Explosion>,
) {
    for bomberman in &bombermen {
        draw_rect(&mut gizmos, bomberman.body_rect(), css::GOLD.with_alpha(0.6));
        draw_rect(&mut gizmos, bomberman.collision_area(), css::LIMEGREEN);
    }

    for bomb in &bombs {
        draw_rect(&mut gizmos, bomb.body_rect(), css::VIOLET.with_alpha(0.6));
        draw_rect(&mut gizmos, Level::cell_bounds(bomb.cell), css::VIOLET.with_alpha(0.3));
    }

    for explosion in &explosions {
        for &cell in &explosion.cells {
            draw_rect(&mut gizmos, Level::cell_bounds(cell), css::RED);
        }
    }
}

fn draw_controls(mut gizmos: Gizmos) {
    draw_rect(&mut gizmos, ControlPad::thumbstick_area(), css::WHITE.with_alpha(0.6));
    draw_rect(&mut gizmos, ControlPad::outer_area(), css::WHITE.with_alpha(0.3));
    draw_rect(&mut gizmos, ControlPad::bomb_button(), css::WHITE.with_alpha(0.6));
}
