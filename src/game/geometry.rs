//! Screen-space rectangles and the screen/world coordinate mapping.
//!
//! All gameplay runs in screen space: pixels, origin at the top-left corner,
//! y growing downward, on a fixed 800x480 viewport. Rendering converts to
//! Bevy's world space (origin at the centre, y growing upward) at the last
//! moment.

use bevy::prelude::*;

/// Logical size of the viewport in pixels.
pub const SCREEN_SIZE: Vec2 = Vec2::new(800.0, 480.0);

/// Integer rectangle in screen space.
///
/// Overlap is strict (shared edges don't count) while containment is
/// inclusive, which is what the collision rules expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle at a float position, truncating toward zero.
    pub fn from_position(position: Vec2, width: i32, height: i32) -> Self {
        Self::new(position.x as i32, position.y as i32, width, height)
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn center(&self) -> Vec2 {
        self.position() + self.size() / 2.0
    }

    /// True when the two rectangles share interior area.
    pub const fn intersects(&self, other: &Rect) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() < self.bottom()
            && self.top() < other.bottom()
    }

    /// True when `other` lies entirely inside this rectangle (edges included).
    pub const fn contains(&self, other: &Rect) -> bool {
        self.left() <= other.left()
            && other.right() <= self.right()
            && self.top() <= other.top()
            && other.bottom() <= self.bottom()
    }

    /// True when the 1x1 pixel at `point` lies inside this rectangle.
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.contains(&Rect::from_position(point, 1, 1))
    }

    /// The same rectangle with its origin moved to `position` (truncated).
    pub fn moved_to(&self, position: Vec2) -> Rect {
        Rect::from_position(position, self.width, self.height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {} {}x{}]", self.x, self.y, self.width, self.height)
    }
}

/// World z spacing between two adjacent draw orders.
const DEPTH_SCALE: f32 = 0.001;

/// Map a draw order (larger draws on top) to a world z value.
pub fn draw_depth(order: i32) -> f32 {
    order as f32 * DEPTH_SCALE
}

/// Convert a screen-space point to a world-space translation.
pub fn to_world(screen: Vec2, z: f32) -> Vec3 {
    Vec3::new(
        screen.x - SCREEN_SIZE.x / 2.0,
        SCREEN_SIZE.y / 2.0 - screen.y,
        z,
    )
}

/// Convert a world-space point back to screen space.
pub fn to_screen(world: Vec2) -> Vec2 {
    Vec2::new(world.x + SCREEN_SIZE.x / 2.0, SCREEN_SIZE.y / 2.0 - world.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 40, 36);
        let right = Rect::new(40, 0, 40, 36);
        let below = Rect::new(0, 36, 40, 36);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(a.intersects(&Rect::new(39, 35, 10, 10)));
    }

    #[test]
    fn test_containment_is_inclusive() {
        let outer = Rect::new(0, 312, 180, 180);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Rect::new(179, 491, 1, 1)));
        assert!(!outer.contains(&Rect::new(180, 491, 1, 1)));
        assert!(outer.contains_point(Vec2::new(0.0, 312.0)));
        assert!(!outer.contains_point(Vec2::new(-1.0, 312.0)));
    }

    #[test]
    fn test_from_position_truncates() {
        let rect = Rect::from_position(Vec2::new(20.9, 59.99), 33, 23);
        assert_eq!(rect, Rect::new(20, 59, 33, 23));
        let negative = Rect::from_position(Vec2::new(-0.5, -1.5), 1, 1);
        assert_eq!(negative, Rect::new(0, -1, 1, 1));
    }

    #[test]
    fn test_moved_to_keeps_size() {
        let rect = Rect::new(23, 46, 33, 23).moved_to(Vec2::new(35.0, 34.0));
        assert_eq!(rect, Rect::new(35, 34, 33, 23));
        assert_eq!(rect.center(), Vec2::new(51.5, 45.5));
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let screen = Vec2::new(20.0, 40.0);
        let world = to_world(screen, 0.0);
        assert_eq!(world, Vec3::new(-380.0, 200.0, 0.0));
        assert_eq!(to_screen(world.truncate()), screen);
    }
}
