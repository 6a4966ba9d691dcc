//! Collision-aware movement of the avatar.
//!
//! Movement runs on the fixed clock so the avatar covers the same distance
//! per second whatever the frame rate.

use bevy::prelude::*;

use super::{
    bomberman::{Bomberman, WalkingDirection},
    geometry::Rect,
    level::{CurrentLevel, Level},
    session::is_playing,
    thumbstick::PlayerInput,
};
use crate::{PausableSystems, config::GameConfig, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        move_bomberman
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay).and(is_playing)),
    );
}

/// Work out how far a collision area moves for a stick deflection.
///
/// Components that would leave `bounds` are dropped. If the target overlaps
/// a solid tile, the component along the facing axis is dropped so the
/// avatar slides along the obstacle. Returns `None` when nothing is left
/// or the adjusted target still collides.
pub fn resolve_motion(
    area: Rect,
    stick: Vec2,
    facing: WalkingDirection,
    level: &Level,
    bounds: Rect,
    speed: f32,
) -> Option<Vec2> {
    let mut stick = stick;
    let target = area.position() + stick * speed;

    if target.x < bounds.left() as f32 || target.x + area.width as f32 > bounds.right() as f32 {
        stick.x = 0.0;
    }
    if target.y < bounds.top() as f32 || target.y + area.height as f32 > bounds.bottom() as f32 {
        stick.y = 0.0;
    }

    if stick == Vec2::ZERO {
        return None;
    }

    if level.collides(&area.moved_to(target)) {
        if facing.is_vertical() {
            stick.y = 0.0;
        } else {
            stick.x = 0.0;
        }
    }

    let target = area.position() + stick * speed;
    (stick != Vec2::ZERO && !level.collides(&area.moved_to(target))).then_some(stick * speed)
}

fn move_bomberman(
    input: Res<PlayerInput>,
    level: Res<CurrentLevel>,
    config: Res<GameConfig>,
    mut query: Query<&mut Bomberman>,
) {
    let Ok(mut bomberman) = query.single_mut() else {
        return;
    };

    let motion = resolve_motion(
        bomberman.collision_area(),
        input.movement(),
        bomberman.direction,
        &level.0,
        Level::pixel_bounds(),
        config.movement.speed,
    );

    match motion {
        Some(motion) => {
            bomberman.set_movement(motion);
            bomberman.in_motion = true;
        }
        None => {
            // Avoid change detection churn while standing still.
            if bomberman.in_motion {
                bomberman.in_motion = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEED: f32 = 12.0;

    fn start_area() -> Rect {
        Rect::new(23, 46, 33, 23)
    }

    fn resolve(area: Rect, stick: Vec2, facing: WalkingDirection) -> Option<Vec2> {
        resolve_motion(
            area,
            stick,
            facing,
            &Level::default(),
            Level::pixel_bounds(),
            SPEED,
        )
    }

    #[test]
    fn test_free_motion() {
        let motion = resolve(start_area(), Vec2::new(1.0, 0.0), WalkingDirection::Right);
        assert_eq!(motion, Some(Vec2::new(12.0, 0.0)));
    }

    #[test]
    fn test_bounds_drop_component() {
        // Moving up from the top row would leave the grid.
        let motion = resolve(start_area(), Vec2::new(0.0, -1.0), WalkingDirection::Up);
        assert_eq!(motion, None);

        // Diagonal keeps the component that stays inside.
        let motion = resolve(start_area(), Vec2::new(0.5, -0.8), WalkingDirection::Up);
        assert_eq!(motion, Some(Vec2::new(6.0, 0.0)));
    }

    #[test]
    fn test_blocked_by_block() {
        // Straight down from the start cell runs into nothing; from (1, 0)
        // the block at (1, 1) is in the way.
        let area = Rect::new(63, 46, 33, 23);
        let motion = resolve(area, Vec2::new(0.0, 1.0), WalkingDirection::Down);
        assert_eq!(motion, None);
    }

    #[test]
    fn test_slides_along_obstacle() {
        let area = Rect::new(63, 46, 33, 23);
        let motion = resolve(area, Vec2::new(0.4, 0.9), WalkingDirection::Down);
        assert_eq!(motion, Some(Vec2::new(0.4 * SPEED, 0.0)));
    }

    #[test]
    fn test_zero_stick_does_not_move() {
        assert_eq!(resolve(start_area(), Vec2::ZERO, WalkingDirection::Up), None);
    }

    #[test]
    fn test_crates_block_like_blocks() {
        // Cell (13, 0) sits left of the crate at (14, 0).
        let area = Rect::new(543, 46, 33, 23);
        let motion = resolve(area, Vec2::new(1.0, 0.0), WalkingDirection::Right);
        assert_eq!(motion, None);
    }
}
