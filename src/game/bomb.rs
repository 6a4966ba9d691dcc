//! Bombs: dropping, fuses, and blasts.

use std::time::Duration;

use bevy::{prelude::*, sprite::Anchor};

use super::{
    animation::{Animation, BOMB_FRAME_SIZE},
    bomberman::Bomberman,
    geometry::{Rect, draw_depth, to_world},
    level::{Blast, CrateDestroyed, CurrentLevel, Level},
    session::is_playing,
    sprites::SpriteSheets,
    thumbstick::PlayerInput,
};
use crate::{
    AppSystems, PausableSystems,
    config::{GameConfig, secs_to_duration},
    screens::Screen,
    theme::palette,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<BombBag>();
    app.add_message::<BombExploded>();

    app.add_systems(
        Update,
        (
            drop_bomb.run_if(is_playing),
            tick_bombs,
            fade_explosions,
        )
            .chain()
            .in_set(AppSystems::Update)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Bombs are dropped this far above the avatar's feet.
const DROP_LIFT: f32 = 10.0;

/// Explosions draw above everything on the playfield.
const EXPLOSION_DEPTH: f32 = 0.9;

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Bomb {
    /// Top-left corner in screen space.
    pub position: Vec2,
    pub cell: UVec2,
    pub fuse: Duration,
}

impl Bomb {
    /// Arm a bomb at the feet of an avatar with the given collision area.
    pub fn dropped_at(collision_area: Rect, fuse: Duration) -> Option<Self> {
        let position = collision_area.position() - Vec2::new(0.0, DROP_LIFT);
        let body = Rect::from_position(position, BOMB_FRAME_SIZE.x as i32, BOMB_FRAME_SIZE.y as i32);
        let cell = Level::cell_at(body.center())?;
        Some(Self {
            position,
            cell,
            fuse,
        })
    }

    pub fn body_rect(&self) -> Rect {
        Rect::from_position(self.position, BOMB_FRAME_SIZE.x as i32, BOMB_FRAME_SIZE.y as i32)
    }

    /// Burn the fuse. Returns true once it has burnt down.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.fuse = self.fuse.saturating_sub(delta);
        self.fuse.is_zero()
    }
}

/// Bombs the player can still drop.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct BombBag {
    pub capacity: u32,
    pub in_play: u32,
}

impl Default for BombBag {
    fn default() -> Self {
        Self::new(1)
    }
}

impl BombBag {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            in_play: 0,
        }
    }

    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.in_play)
    }

    /// Take a bomb out of the bag, if one is left.
    pub fn try_take(&mut self) -> bool {
        if self.available() == 0 {
            return false;
        }
        self.in_play += 1;
        true
    }

    pub fn give_back(&mut self) {
        self.in_play = self.in_play.saturating_sub(1);
    }
}

/// Sent when a bomb goes off.
#[derive(Message, Debug, Clone)]
pub struct BombExploded {
    pub cell: UVec2,
    pub blast: Blast,
}

/// A blast still on screen.
#[derive(Component, Debug, Clone)]
pub struct Explosion {
    pub cells: Vec<UVec2>,
    pub remaining: Duration,
}

/// Arm a bomb at the avatar's feet, taking it from the bag.
///
/// Nothing is dropped when the bag is empty, when the feet are off the grid,
/// or when a bomb already sits in one of the `occupied` cells.
pub fn try_drop_bomb(
    bag: &mut BombBag,
    collision_area: Rect,
    fuse: Duration,
    mut occupied: impl Iterator<Item = UVec2>,
) -> Option<Bomb> {
    let bomb = Bomb::dropped_at(collision_area, fuse)?;
    if occupied.any(|cell| cell == bomb.cell) {
        debug!("A bomb already sits in cell {}", bomb.cell);
        return None;
    }
    if !bag.try_take() {
        debug!("No bombs left");
        return None;
    }
    Some(bomb)
}

/// Set off `bomb`: clear the crates its blast reaches and return the bomb to
/// the bag. The returned blast lists the crates that were destroyed.
pub fn detonate(level: &mut Level, bag: &mut BombBag, bomb: &Bomb, range: u32) -> Blast {
    let mut blast = level.blast_cells(bomb.cell, range);
    blast.crates.retain(|&cell| level.destroy_crate(cell));
    bag.give_back();
    blast
}

pub fn reset_bomb_bag(mut bag: ResMut<BombBag>, config: Res<GameConfig>) {
    *bag = BombBag::new(config.bombs.capacity);
}

fn drop_bomb(
    mut commands: Commands,
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    sheets: Res<SpriteSheets>,
    mut bag: ResMut<BombBag>,
    bomberman: Query<&Bomberman>,
    bombs: Query<&Bomb>,
) {
    if !input.bomb_pressed {
        return;
    }
    let Ok(bomberman) = bomberman.single() else {
        return;
    };

    let fuse = secs_to_duration(config.bombs.fuse_secs);
    let occupied = bombs.iter().map(|other| other.cell);
    let Some(bomb) = try_drop_bomb(&mut bag, bomberman.collision_area(), fuse, occupied) else {
        return;
    };

    let mut animation = Animation::bomb();
    if let Err(e) = animation.play_from_frame_index(0) {
        warn!("Bomb animation not started: {}", e);
    }

    info!("Bomb dropped in cell {} ({} left)", bomb.cell, bag.available());
    commands.spawn((
        Name::new("Bomb"),
        Transform::from_translation(to_world(
            bomb.position,
            draw_depth(bomb.position.y as i32),
        )),
        bomb,
        animation,
        sheets.bomb_sprite(),
        Anchor::TOP_LEFT,
        DespawnOnExit(Screen::Gameplay),
    ));
}

fn tick_bombs(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut level: ResMut<CurrentLevel>,
    mut bag: ResMut<BombBag>,
    mut bombs: Query<(Entity, &mut Bomb)>,
    mut destroyed: MessageWriter<CrateDestroyed>,
    mut exploded: MessageWriter<BombExploded>,
) {
    for (entity, mut bomb) in &mut bombs {
        if !bomb.tick(time.delta()) {
            continue;
        }

        let blast = detonate(&mut level.0, &mut bag, &bomb, config.bombs.blast_range);
        for &cell in &blast.crates {
            destroyed.write(CrateDestroyed { cell });
        }

        info!(
            "Bomb exploded in cell {}: {} cells, {} crates",
            bomb.cell,
            blast.cells.len(),
            blast.crates.len()
        );

        commands.entity(entity).despawn();
        spawn_explosion(
            &mut commands,
            &blast,
            secs_to_duration(config.bombs.blast_linger_secs),
        );
        exploded.write(BombExploded {
            cell: bomb.cell,
            blast,
        });
    }
}

fn spawn_explosion(commands: &mut Commands, blast: &Blast, linger: Duration) {
    commands
        .spawn((
            Name::new("Explosion"),
            Explosion {
                cells: blast.cells.clone(),
                remaining: linger,
            },
            Transform::default(),
            Visibility::default(),
            DespawnOnExit(Screen::Gameplay),
        ))
        .with_children(|parent| {
            for (i, &cell) in blast.cells.iter().enumerate() {
                let bounds = Level::cell_bounds(cell);
                let color = if i == 0 {
                    palette::BLAST_CORE
                } else {
                    palette::BLAST
                };
                parent.spawn((
                    Sprite {
                        color,
                        custom_size: Some(bounds.size()),
                        ..default()
                    },
                    Anchor::TOP_LEFT,
                    Transform::from_translation(to_world(bounds.position(), EXPLOSION_DEPTH)),
                ));
            }
        });
}

fn fade_explosions(
    mut commands: Commands,
    time: Res<Time>,
    mut explosions: Query<(Entity, &mut Explosion)>,
) {
    for (entity, mut explosion) in &mut explosions {
        explosion.remaining = explosion.remaining.saturating_sub(time.delta());
        if explosion.remaining.is_zero() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::level::Tile;

    #[test]
    fn test_dropped_at_avatar_feet() {
        let bomb = Bomb::dropped_at(Rect::new(23, 46, 33, 23), Duration::from_secs(3)).unwrap();
        assert_eq!(bomb.position, Vec2::new(23.0, 36.0));
        assert_eq!(bomb.cell, UVec2::new(0, 0));
        assert_eq!(bomb.body_rect(), Rect::new(23, 36, 36, 37));
    }

    #[test]
    fn test_fuse_burns_down() {
        let mut bomb = Bomb::dropped_at(Rect::new(23, 46, 33, 23), Duration::from_secs(3)).unwrap();
        assert!(!bomb.tick(Duration::from_secs(2)));
        assert!(!bomb.tick(Duration::from_millis(999)));
        assert!(bomb.tick(Duration::from_millis(1)));
        // Stays spent.
        assert!(bomb.tick(Duration::from_millis(16)));
    }

    #[test]
    fn test_bag_limits_bombs_in_play() {
        let mut bag = BombBag::new(2);
        assert!(bag.try_take());
        assert!(bag.try_take());
        assert!(!bag.try_take());
        assert_eq!(bag.available(), 0);

        bag.give_back();
        assert_eq!(bag.available(), 1);
        bag.give_back();
        bag.give_back();
        assert_eq!(bag.in_play, 0);
    }

    #[test]
    fn test_drop_refuses_occupied_cell_and_empty_bag() {
        let feet = Rect::new(23, 46, 33, 23);
        let fuse = Duration::from_secs(3);
        let mut bag = BombBag::new(2);

        let blocked = try_drop_bomb(&mut bag, feet, fuse, [UVec2::new(0, 0)].into_iter());
        assert_eq!(blocked, None);
        assert_eq!(bag.in_play, 0);

        let bomb = try_drop_bomb(&mut bag, feet, fuse, [UVec2::new(3, 5)].into_iter()).unwrap();
        assert_eq!(bomb.cell, UVec2::new(0, 0));
        assert_eq!(bag.in_play, 1);

        let mut empty = BombBag::new(0);
        assert_eq!(try_drop_bomb(&mut empty, feet, fuse, std::iter::empty()), None);

        let off_grid = Rect::new(-200, -200, 33, 23);
        assert_eq!(try_drop_bomb(&mut bag, off_grid, fuse, std::iter::empty()), None);
        assert_eq!(bag.in_play, 1);
    }

    #[test]
    fn test_detonate_clears_crates_and_refills_bag() {
        let mut level = Level::default();
        let mut bag = BombBag::new(1);
        assert!(bag.try_take());
        let bomb = Bomb {
            position: Vec2::ZERO,
            cell: UVec2::new(7, 1),
            fuse: Duration::ZERO,
        };

        let blast = detonate(&mut level, &mut bag, &bomb, 1);
        assert_eq!(
            blast.cells,
            vec![UVec2::new(7, 1), UVec2::new(7, 2), UVec2::new(7, 0)]
        );
        assert_eq!(blast.crates, vec![UVec2::new(7, 2)]);
        assert_eq!(level.tile(UVec2::new(7, 2)), Some(Tile::Empty));
        assert_eq!(bag.available(), 1);

        // The crate is gone, so a second blast reaches past it.
        let blast = detonate(&mut level, &mut bag, &bomb, 1);
        assert!(blast.crates.is_empty());
        assert!(blast.cells.contains(&UVec2::new(7, 2)));
        assert_eq!(bag.in_play, 0);
    }
}
