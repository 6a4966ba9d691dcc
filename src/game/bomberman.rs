//! The player's avatar.

use bevy::{prelude::*, sprite::Anchor};

use super::{
    animation::Animation,
    geometry::{Rect, draw_depth, to_world},
    level::{CurrentLevel, Level},
    session::is_playing,
    sprites::SpriteSheets,
    thumbstick::PlayerInput,
};
use crate::{AppSystems, PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bomberman>();

    app.add_systems(
        Update,
        (
            update_facing
                .in_set(AppSystems::Update)
                .in_set(PausableSystems)
                .run_if(is_playing),
            sync_bomberman_transform.in_set(AppSystems::Update),
        )
            .chain()
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Size of the avatar's body.
pub const BODY_SIZE: IVec2 = IVec2::new(43, 63);

/// Where the collision area sits inside the start cell.
const SPAWN_OFFSET: Vec2 = Vec2::new(3.0, 6.0);

/// Frames between two restarts of the walk animation.
const WALK_CYCLE_FRAMES: u32 = 10;

/// Which way the avatar faces. The value is the first frame of that
/// direction's row in the avatar sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum WalkingDirection {
    Down = 0,
    #[default]
    Up = 10,
    Left = 20,
    Right = 30,
}

impl WalkingDirection {
    /// Facing for a stick deflection. Screen y points down.
    pub fn from_stick(stick: Vec2) -> Self {
        if stick.x.abs() > stick.y.abs() {
            if stick.x > 0.0 {
                WalkingDirection::Right
            } else {
                WalkingDirection::Left
            }
        } else if stick.y > 0.0 {
            WalkingDirection::Down
        } else {
            WalkingDirection::Up
        }
    }

    pub fn first_frame(self) -> u32 {
        self as u32
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, WalkingDirection::Up | WalkingDirection::Down)
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Bomberman {
    /// Top-left corner of the animation frame, in screen space.
    pub position: Vec2,
    pub direction: WalkingDirection,
    pub in_motion: bool,
    walk_counter: u32,
}

impl Bomberman {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            direction: WalkingDirection::default(),
            in_motion: false,
            walk_counter: 0,
        }
    }

    /// Place the avatar so its collision area starts at a fixed offset
    /// inside the given cell.
    pub fn at_cell(cell: UVec2) -> Self {
        let area = Level::cell_bounds(cell).position() + SPAWN_OFFSET;
        Self::new(area - Vec2::new(0.0, 40.0))
    }

    pub fn body_rect(&self) -> Rect {
        Rect::new(
            self.position.x as i32 - 5,
            self.position.y as i32 + 5,
            BODY_SIZE.x,
            BODY_SIZE.y,
        )
    }

    /// The feet: the part that collides with tiles.
    pub fn collision_area(&self) -> Rect {
        Rect::new(
            self.position.x as i32,
            self.position.y as i32 + 40,
            BODY_SIZE.x - 10,
            BODY_SIZE.y - 40,
        )
    }

    /// Move along the dominant axis of `movement` only.
    pub fn set_movement(&mut self, movement: Vec2) {
        if movement.x.abs() > movement.y.abs() {
            self.position.x += movement.x;
        } else {
            self.position.y += movement.y;
        }
    }

    pub fn feet_y(&self) -> i32 {
        self.position.y as i32 + BODY_SIZE.y - 2
    }

    /// Turn toward `direction` and step the walk cycle.
    ///
    /// Returns the frame to restart the animation from, if it has to.
    pub fn advance_walk(&mut self, direction: WalkingDirection) -> Option<u32> {
        if direction != self.direction {
            self.direction = direction;
            self.walk_counter = 0;
            return Some(direction.first_frame());
        }

        if self.walk_counter == WALK_CYCLE_FRAMES {
            self.walk_counter = 0;
            Some(direction.first_frame())
        } else {
            self.walk_counter += 1;
            None
        }
    }
}

/// Draw order for something whose feet are at `feet_y`: above every solid
/// tile that sits mostly behind it.
pub fn draw_order(feet_y: i32, solids: impl IntoIterator<Item = Rect>) -> i32 {
    solids
        .into_iter()
        .filter(|tile| tile.top() < feet_y && tile.top() + tile.height / 2 < feet_y)
        .fold(1, |order, tile| order.max(tile.top() + 1))
}

pub fn spawn_bomberman(
    mut commands: Commands,
    level: Res<CurrentLevel>,
    sheets: Res<SpriteSheets>,
) {
    let bomberman = Bomberman::at_cell(level.0.start());
    let mut animation = Animation::bomber();
    if let Err(e) = animation.play_from_frame_index(bomberman.direction.first_frame()) {
        warn!("Bomber animation not started: {}", e);
    }

    info!(
        "Bomberman spawned at {:?}, collision area {}",
        bomberman.position,
        bomberman.collision_area()
    );

    commands.spawn((
        Name::new("Bomberman"),
        Transform::from_translation(to_world(bomberman.position + animation.offset(), draw_depth(1))),
        bomberman,
        animation,
        sheets.bomber_sprite(),
        Anchor::TOP_LEFT,
        DespawnOnExit(Screen::Gameplay),
    ));
}

fn update_facing(input: Res<PlayerInput>, mut query: Query<(&mut Bomberman, &mut Animation)>) {
    let Ok((mut bomberman, mut animation)) = query.single_mut() else {
        return;
    };

    let direction = if input.steers_facing() {
        WalkingDirection::from_stick(input.stick)
    } else {
        bomberman.direction
    };

    if let Some(frame) = bomberman.advance_walk(direction)
        && let Err(e) = animation.play_from_frame_index(frame)
    {
        warn!("Bomber animation not restarted: {}", e);
    }
}

fn sync_bomberman_transform(
    level: Res<CurrentLevel>,
    mut query: Query<(&Bomberman, &Animation, &mut Transform)>,
) {
    for (bomberman, animation, mut transform) in &mut query {
        let order = draw_order(bomberman.feet_y(), level.0.solid_rects());
        transform.translation = to_world(bomberman.position + animation.offset(), draw_depth(order));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_stick() {
        assert_eq!(WalkingDirection::from_stick(Vec2::new(0.8, 0.3)), WalkingDirection::Right);
        assert_eq!(WalkingDirection::from_stick(Vec2::new(-0.8, 0.3)), WalkingDirection::Left);
        assert_eq!(WalkingDirection::from_stick(Vec2::new(0.3, 0.8)), WalkingDirection::Down);
        assert_eq!(WalkingDirection::from_stick(Vec2::new(0.5, -0.5)), WalkingDirection::Up);
        assert_eq!(WalkingDirection::Left.first_frame(), 20);
    }

    #[test]
    fn test_rects_follow_position() {
        let bomberman = Bomberman::new(Vec2::new(100.0, 50.0));
        assert_eq!(bomberman.body_rect(), Rect::new(95, 55, 43, 63));
        assert_eq!(bomberman.collision_area(), Rect::new(100, 90, 33, 23));
        assert_eq!(bomberman.feet_y(), 111);
    }

    #[test]
    fn test_spawns_inside_start_cell() {
        let bomberman = Bomberman::at_cell(UVec2::new(0, 0));
        assert_eq!(bomberman.collision_area(), Rect::new(23, 46, 33, 23));
        assert!(Level::cell_bounds(UVec2::new(0, 0)).contains(&bomberman.collision_area()));
    }

    #[test]
    fn test_set_movement_uses_dominant_axis() {
        let mut bomberman = Bomberman::new(Vec2::new(100.0, 100.0));
        bomberman.set_movement(Vec2::new(12.0, 0.0));
        assert_eq!(bomberman.position, Vec2::new(112.0, 100.0));
        bomberman.set_movement(Vec2::new(6.0, -6.0));
        assert_eq!(bomberman.position, Vec2::new(112.0, 94.0));
    }

    #[test]
    fn test_walk_cycle_restarts_every_ten_frames() {
        let mut bomberman = Bomberman::new(Vec2::ZERO);
        for _ in 0..10 {
            assert_eq!(bomberman.advance_walk(WalkingDirection::Up), None);
        }
        assert_eq!(bomberman.advance_walk(WalkingDirection::Up), Some(10));
        assert_eq!(bomberman.advance_walk(WalkingDirection::Up), None);
    }

    #[test]
    fn test_turning_restarts_walk() {
        let mut bomberman = Bomberman::new(Vec2::ZERO);
        bomberman.advance_walk(WalkingDirection::Up);
        assert_eq!(bomberman.advance_walk(WalkingDirection::Right), Some(30));
        assert_eq!(bomberman.direction, WalkingDirection::Right);
        assert_eq!(bomberman.advance_walk(WalkingDirection::Right), None);
    }

    #[test]
    fn test_draw_order_over_tiles_behind() {
        let behind = Rect::new(60, 40, 40, 36);
        let level_with_feet = Rect::new(60, 76, 40, 36);
        let in_front = Rect::new(60, 112, 40, 36);

        assert_eq!(draw_order(100, [behind, in_front]), 41);
        assert_eq!(draw_order(100, [behind, level_with_feet, in_front]), 77);
        // Feet past the second tile's midpoint.
        assert_eq!(draw_order(95, [level_with_feet]), 77);
        assert_eq!(draw_order(94, [level_with_feet]), 1);
        assert_eq!(draw_order(10, [behind]), 1);
    }
}
