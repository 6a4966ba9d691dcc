//! Frame-strip animation over a sprite sheet laid out as a grid of equal frames.

use std::time::Duration;

use bevy::prelude::*;

use super::bomberman::Bomberman;
use crate::{AppSystems, PausableSystems};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Animation>();

    app.add_systems(
        Update,
        (
            tick_animations.in_set(PausableSystems),
            sync_animation_frames,
        )
            .chain()
            .in_set(AppSystems::Update),
    );
}

/// Avatar sheet: one row of ten frames per walking direction.
pub const BOMBER_FRAME_SIZE: UVec2 = UVec2::new(48, 64);
pub const BOMBER_SHEET_SIZE: UVec2 = UVec2::new(10, 4);
pub const BOMBER_FRAME_INTERVAL: Duration = Duration::from_millis(60);
/// The sheet is drawn this far from the avatar's position.
pub const BOMBER_DRAW_OFFSET: Vec2 = Vec2::new(-8.0, 0.0);

/// Bomb sheet: a single row with the fuse burning down.
pub const BOMB_FRAME_SIZE: UVec2 = UVec2::new(36, 37);
pub const BOMB_SHEET_SIZE: UVec2 = UVec2::new(4, 1);
pub const BOMB_FRAME_INTERVAL: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    FrameOutOfRange { index: u32, frame_count: u32 },
}

impl std::fmt::Display for AnimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationError::FrameOutOfRange { index, frame_count } => write!(
                f,
                "frame index {} is out of range for a sheet of {} frames",
                index, frame_count
            ),
        }
    }
}

impl std::error::Error for AnimationError {}

/// Which frame of a sheet is shown, and when it last changed.
///
/// Frames only advance after the current one has been drawn at least once,
/// so a freshly restarted animation always shows its first frame.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Animation {
    frame_size: UVec2,
    /// Columns and rows of frames in the sheet.
    sheet_size: UVec2,
    column: u32,
    row: u32,
    interval: Duration,
    last_change: Duration,
    active: bool,
    drawn_once: bool,
    offset: Vec2,
}

impl Animation {
    pub fn new(frame_size: UVec2, sheet_size: UVec2) -> Self {
        Self {
            frame_size,
            sheet_size: sheet_size.max(UVec2::ONE),
            column: 0,
            row: 0,
            interval: Duration::ZERO,
            last_change: Duration::ZERO,
            active: false,
            drawn_once: false,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn bomber() -> Self {
        Self::new(BOMBER_FRAME_SIZE, BOMBER_SHEET_SIZE)
            .with_interval(BOMBER_FRAME_INTERVAL)
            .with_offset(BOMBER_DRAW_OFFSET)
    }

    pub fn bomb() -> Self {
        Self::new(BOMB_FRAME_SIZE, BOMB_SHEET_SIZE).with_interval(BOMB_FRAME_INTERVAL)
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn frame_count(&self) -> u32 {
        self.sheet_size.x * self.sheet_size.y
    }

    pub fn frame_index(&self) -> u32 {
        self.sheet_size.x * self.row + self.column
    }

    pub fn set_frame_index(&mut self, index: u32) -> Result<(), AnimationError> {
        let frame_count = self.frame_count();
        if index >= frame_count {
            return Err(AnimationError::FrameOutOfRange { index, frame_count });
        }
        self.row = index / self.sheet_size.x;
        self.column = index % self.sheet_size.x;
        Ok(())
    }

    /// Restart the animation from `index`.
    pub fn play_from_frame_index(&mut self, index: u32) -> Result<(), AnimationError> {
        self.set_frame_index(index)?;
        self.active = true;
        self.drawn_once = false;
        Ok(())
    }

    /// Advance by one frame if the interval has passed.
    ///
    /// `total` is the total elapsed game time. The change time is recorded
    /// even when `in_motion` is false, so a standing avatar holds its frame.
    pub fn update(&mut self, total: Duration, in_motion: bool) {
        if !self.active || total == self.last_change {
            return;
        }
        if !self.interval.is_zero() && total.saturating_sub(self.last_change) < self.interval {
            return;
        }

        self.last_change = total;
        if !(in_motion && self.drawn_once) {
            return;
        }

        self.column += 1;
        if self.column >= self.sheet_size.x {
            self.column = 0;
            self.row += 1;
            if self.row >= self.sheet_size.y {
                self.row = 0;
            }
        }
    }

    pub fn mark_drawn(&mut self) {
        self.drawn_once = true;
    }

    /// Pixel rectangle of the current frame inside the sheet.
    pub fn source_rect(&self) -> URect {
        let min = UVec2::new(self.column, self.row) * self.frame_size;
        URect::from_corners(min, min + self.frame_size)
    }
}

fn tick_animations(time: Res<Time>, mut query: Query<(&mut Animation, Option<&Bomberman>)>) {
    let total = time.elapsed();
    for (mut animation, bomberman) in &mut query {
        let in_motion = bomberman.is_none_or(|bomberman| bomberman.in_motion);
        animation.update(total, in_motion);
    }
}

/// Show the current frame and record that it has been drawn.
fn sync_animation_frames(mut query: Query<(&mut Animation, &mut Sprite)>) {
    for (mut animation, mut sprite) in &mut query {
        let frame = Some(animation.source_rect().as_rect());
        if sprite.rect != frame {
            sprite.rect = frame;
        }
        animation.mark_drawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_frame_index_bounds() {
        let mut animation = Animation::bomber();
        assert_eq!(animation.frame_count(), 40);
        assert!(animation.set_frame_index(39).is_ok());
        assert_eq!(animation.frame_index(), 39);
        assert_eq!(
            animation.set_frame_index(40),
            Err(AnimationError::FrameOutOfRange {
                index: 40,
                frame_count: 40
            })
        );
        assert_eq!(animation.frame_index(), 39);
    }

    #[test]
    fn test_waits_for_first_draw() {
        let mut animation = Animation::bomber();
        animation.play_from_frame_index(10).unwrap();

        animation.update(ms(100), true);
        assert_eq!(animation.frame_index(), 10);

        animation.mark_drawn();
        animation.update(ms(200), true);
        assert_eq!(animation.frame_index(), 11);
    }

    #[test]
    fn test_respects_interval() {
        let mut animation = Animation::bomber();
        animation.play_from_frame_index(0).unwrap();
        animation.mark_drawn();

        animation.update(ms(60), true);
        assert_eq!(animation.frame_index(), 1);
        animation.update(ms(100), true);
        assert_eq!(animation.frame_index(), 1);
        animation.update(ms(120), true);
        assert_eq!(animation.frame_index(), 2);
    }

    #[test]
    fn test_standing_still_holds_frame() {
        let mut animation = Animation::bomber();
        animation.play_from_frame_index(20).unwrap();
        animation.mark_drawn();

        animation.update(ms(60), false);
        animation.update(ms(120), false);
        assert_eq!(animation.frame_index(), 20);
    }

    #[test]
    fn test_inactive_does_nothing() {
        let mut animation = Animation::bomb();
        animation.mark_drawn();
        animation.update(ms(500), true);
        assert_eq!(animation.frame_index(), 0);
    }

    #[test]
    fn test_wraps_rows_and_sheet() {
        let mut animation = Animation::new(UVec2::new(10, 10), UVec2::new(2, 2));
        animation.play_from_frame_index(1).unwrap();
        animation.mark_drawn();

        animation.update(ms(1), true);
        assert_eq!(animation.frame_index(), 2);
        animation.update(ms(2), true);
        animation.update(ms(3), true);
        assert_eq!(animation.frame_index(), 0);
    }

    #[test]
    fn test_source_rect() {
        let mut animation = Animation::bomber();
        animation.set_frame_index(13).unwrap();
        let rect = animation.source_rect();
        assert_eq!(rect.min, UVec2::new(144, 64));
        assert_eq!(rect.max, UVec2::new(192, 128));
    }
}
