//! Virtual thumbsticks and the on-screen control pad.
//!
//! A touch that starts on the left half of the screen drives the movement
//! stick, one on the right half drives the right stick (used for the bomb
//! button). The left mouse button behaves like a touch so the game is
//! playable on desktop, and the keyboard works alongside.

use bevy::prelude::*;

use super::geometry::{Rect, SCREEN_SIZE, to_screen};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<VirtualThumbsticks>();
    app.init_resource::<PlayerInput>();

    app.add_systems(Update, record_input.in_set(AppSystems::RecordInput));
}

/// Distance from the stick centre that counts as full deflection.
pub const MAX_THUMBSTICK_DISTANCE: f32 = 60.0;

/// Touch id used for the mouse cursor.
const MOUSE_TOUCH_ID: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
struct StickTouch {
    id: u64,
    center: Vec2,
    position: Vec2,
}

impl StickTouch {
    fn vector(&self) -> Vec2 {
        let v = (self.position - self.center) / MAX_THUMBSTICK_DISTANCE;
        if v.length_squared() > 1.0 {
            v.normalize()
        } else {
            v
        }
    }
}

/// Two touch-driven sticks, one per screen half.
#[derive(Resource, Debug, Default, Clone)]
pub struct VirtualThumbsticks {
    left: Option<StickTouch>,
    right: Option<StickTouch>,
}

impl VirtualThumbsticks {
    /// A touch went down at `position` (screen space).
    pub fn press(&mut self, id: u64, position: Vec2) {
        let touch = StickTouch {
            id,
            center: position,
            position,
        };
        if position.x < SCREEN_SIZE.x / 2.0 {
            if self.left.is_none() {
                self.left = Some(touch);
            }
        } else if self.right.is_none() {
            self.right = Some(touch);
        }
    }

    pub fn moved(&mut self, id: u64, position: Vec2) {
        for touch in [&mut self.left, &mut self.right].into_iter().flatten() {
            if touch.id == id {
                touch.position = position;
            }
        }
    }

    pub fn release(&mut self, id: u64) {
        if self.left.is_some_and(|touch| touch.id == id) {
            self.left = None;
        }
        if self.right.is_some_and(|touch| touch.id == id) {
            self.right = None;
        }
    }

    /// Left stick deflection, at most unit length. Screen y points down.
    pub fn left_vector(&self) -> Vec2 {
        self.left.map_or(Vec2::ZERO, |touch| touch.vector())
    }

    pub fn left_center(&self) -> Option<Vec2> {
        self.left.map(|touch| touch.center)
    }

    pub fn left_position(&self) -> Option<Vec2> {
        self.left.map(|touch| touch.position)
    }

    pub fn right_center(&self) -> Option<Vec2> {
        self.right.map(|touch| touch.center)
    }
}

/// Positions and sizes of the on-screen controls.
pub struct ControlPad;

impl ControlPad {
    pub const BOUNDARY_POSITION: Vec2 = Vec2::new(34.0, 347.0);
    pub const BOUNDARY_SIZE: i32 = 120;
    pub const KNOB_REST: Vec2 = Vec2::new(55.0, 369.0);
    pub const KNOB_WIDTH: f32 = 78.0;
    /// Extra travel of the knob beyond its own radius.
    pub const KNOB_TRAVEL: f32 = 35.0;
    pub const BOMB_BUTTON_POSITION: Vec2 = Vec2::new(664.0, 346.0);
    pub const BOMB_BUTTON_SIZE: i32 = 109;
    /// Only the left part of the button reacts to touch.
    const BOMB_BUTTON_HIT_WIDTH: i32 = 60;

    pub fn thumbstick_area() -> Rect {
        Rect::from_position(
            Self::BOUNDARY_POSITION,
            Self::BOUNDARY_SIZE,
            Self::BOUNDARY_SIZE,
        )
    }

    /// Region a moving touch has to stay in for the stick to count.
    pub fn outer_area() -> Rect {
        Rect::new(
            0,
            Self::BOUNDARY_POSITION.y as i32 - 35,
            Self::BOUNDARY_SIZE + 60,
            Self::BOUNDARY_SIZE + 60,
        )
    }

    /// Where the knob is drawn for a given stick deflection.
    pub fn knob_position(stick: Vec2) -> Vec2 {
        Self::KNOB_REST + stick * (Self::KNOB_WIDTH / 2.0 + Self::KNOB_TRAVEL)
    }

    pub fn bomb_button() -> Rect {
        Rect::from_position(
            Self::BOMB_BUTTON_POSITION,
            Self::BOMB_BUTTON_SIZE,
            Self::BOMB_BUTTON_SIZE,
        )
    }

    fn bomb_button_hit_area() -> Rect {
        Rect::from_position(
            Self::BOMB_BUTTON_POSITION,
            Self::BOMB_BUTTON_HIT_WIDTH,
            Self::BOMB_BUTTON_SIZE,
        )
    }
}

/// Player input for the current frame, merged from touch, mouse and keyboard.
#[derive(Resource, Debug, Default, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlayerInput {
    /// Movement direction, at most unit length. Screen y points down.
    pub stick: Vec2,
    /// Where the movement touch started.
    pub stick_center: Option<Vec2>,
    /// Where the movement touch is now.
    pub last_touch: Option<Vec2>,
    /// The stick came from the keyboard rather than a touch.
    pub keyboard: bool,
    /// The bomb button went down this frame.
    pub bomb_pressed: bool,
    pub bomb_held: bool,
    /// Any touch, click or confirm key went down this frame.
    pub tapped: bool,
}

impl PlayerInput {
    /// The stick after touch gating.
    ///
    /// A touch stick only counts while the touch stays inside the control
    /// pad's outer area. Keyboard input is never gated.
    pub fn movement(&self) -> Vec2 {
        if self.keyboard || self.stick == Vec2::ZERO {
            return self.stick;
        }
        match self.last_touch {
            Some(touch) if ControlPad::outer_area().contains_point(touch) => self.stick,
            _ => Vec2::ZERO,
        }
    }

    /// Whether the stick should turn the avatar this frame.
    pub fn steers_facing(&self) -> bool {
        self.stick != Vec2::ZERO
            && (self.keyboard
                || self
                    .stick_center
                    .is_some_and(|center| ControlPad::thumbstick_area().contains_point(center)))
    }

    /// Where the knob is drawn: it snaps back to rest when gated.
    pub fn knob_position(&self) -> Vec2 {
        if self.keyboard {
            return ControlPad::KNOB_REST;
        }
        ControlPad::knob_position(self.movement())
    }
}

/// Axis-aligned unit vector from arrows/WASD, horizontal first.
fn keyboard_vector(keys: &ButtonInput<KeyCode>) -> Vec2 {
    let pressed = |a: KeyCode, b: KeyCode| keys.any_pressed([a, b]);
    let x = pressed(KeyCode::ArrowRight, KeyCode::KeyD) as i32
        - pressed(KeyCode::ArrowLeft, KeyCode::KeyA) as i32;
    let y = pressed(KeyCode::ArrowDown, KeyCode::KeyS) as i32
        - pressed(KeyCode::ArrowUp, KeyCode::KeyW) as i32;
    if x != 0 {
        Vec2::new(x as f32, 0.0)
    } else {
        Vec2::new(0.0, y as f32)
    }
}

fn record_input(
    touches: Res<Touches>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    window: Single<&Window>,
    camera: Single<(&Camera, &GlobalTransform)>,
    mut sticks: ResMut<VirtualThumbsticks>,
    mut input: ResMut<PlayerInput>,
) {
    let (camera, camera_transform) = *camera;
    let to_screen_space = |viewport: Vec2| {
        camera
            .viewport_to_world_2d(camera_transform, viewport)
            .map(|world| to_screen(world - camera_transform.translation().truncate()))
            .ok()
    };

    let mut tapped = false;

    for touch in touches.iter_just_pressed() {
        if let Some(position) = to_screen_space(touch.position()) {
            sticks.press(touch.id(), position);
        }
        tapped = true;
    }
    for touch in touches.iter() {
        if let Some(position) = to_screen_space(touch.position()) {
            sticks.moved(touch.id(), position);
        }
    }
    for touch in touches
        .iter_just_released()
        .chain(touches.iter_just_canceled())
    {
        sticks.release(touch.id());
    }

    let cursor = window.cursor_position().and_then(to_screen_space);
    if mouse.just_pressed(MouseButton::Left) {
        if let Some(position) = cursor {
            sticks.press(MOUSE_TOUCH_ID, position);
        }
        tapped = true;
    } else if mouse.pressed(MouseButton::Left) {
        if let Some(position) = cursor {
            sticks.moved(MOUSE_TOUCH_ID, position);
        }
    }
    if mouse.just_released(MouseButton::Left) {
        sticks.release(MOUSE_TOUCH_ID);
    }

    let keyboard_stick = keyboard_vector(&keys);
    let keyboard = keyboard_stick != Vec2::ZERO;

    let touch_bomb = sticks
        .right_center()
        .is_some_and(|center| ControlPad::bomb_button_hit_area().contains_point(center));
    let key_bomb = keys.any_pressed([KeyCode::Space, KeyCode::KeyB]);
    let bomb_held = touch_bomb || key_bomb;

    let next = PlayerInput {
        stick: if keyboard {
            keyboard_stick
        } else {
            sticks.left_vector()
        },
        stick_center: sticks.left_center(),
        last_touch: sticks.left_position(),
        keyboard,
        bomb_pressed: bomb_held && !input.bomb_held,
        bomb_held,
        tapped: tapped || keys.any_just_pressed([KeyCode::Space, KeyCode::Enter]),
    };
    input.set_if_neq(next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_halves_pick_sticks() {
        let mut sticks = VirtualThumbsticks::default();
        sticks.press(1, Vec2::new(100.0, 400.0));
        sticks.press(2, Vec2::new(700.0, 400.0));
        // A second touch on the left half is ignored while the first is down.
        sticks.press(3, Vec2::new(120.0, 400.0));

        assert_eq!(sticks.left_center(), Some(Vec2::new(100.0, 400.0)));
        assert_eq!(sticks.right_center(), Some(Vec2::new(700.0, 400.0)));

        sticks.moved(3, Vec2::new(300.0, 400.0));
        assert_eq!(sticks.left_vector(), Vec2::ZERO);

        sticks.release(1);
        assert_eq!(sticks.left_center(), None);
        assert!(sticks.right_center().is_some());
    }

    #[test]
    fn test_left_vector_scaled_and_clamped() {
        let mut sticks = VirtualThumbsticks::default();
        sticks.press(1, Vec2::new(100.0, 400.0));

        sticks.moved(1, Vec2::new(130.0, 400.0));
        assert_eq!(sticks.left_vector(), Vec2::new(0.5, 0.0));

        sticks.moved(1, Vec2::new(100.0, 280.0));
        assert_eq!(sticks.left_vector(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_control_pad_layout() {
        assert_eq!(ControlPad::thumbstick_area(), Rect::new(34, 347, 120, 120));
        assert_eq!(ControlPad::outer_area(), Rect::new(0, 312, 180, 180));
        assert_eq!(ControlPad::bomb_button(), Rect::new(664, 346, 109, 109));
        assert_eq!(ControlPad::knob_position(Vec2::ZERO), ControlPad::KNOB_REST);
        assert_eq!(
            ControlPad::knob_position(Vec2::new(1.0, 0.0)),
            Vec2::new(55.0 + 74.0, 369.0)
        );
    }

    #[test]
    fn test_touch_outside_outer_area_is_gated() {
        let mut input = PlayerInput {
            stick: Vec2::new(1.0, 0.0),
            stick_center: Some(Vec2::new(80.0, 400.0)),
            last_touch: Some(Vec2::new(150.0, 400.0)),
            ..default()
        };
        assert_eq!(input.movement(), Vec2::new(1.0, 0.0));

        input.last_touch = Some(Vec2::new(250.0, 400.0));
        assert_eq!(input.movement(), Vec2::ZERO);
        assert_eq!(input.knob_position(), ControlPad::KNOB_REST);
    }

    #[test]
    fn test_keyboard_is_never_gated() {
        let input = PlayerInput {
            stick: Vec2::new(0.0, 1.0),
            keyboard: true,
            ..default()
        };
        assert_eq!(input.movement(), Vec2::new(0.0, 1.0));
        assert!(input.steers_facing());
    }

    #[test]
    fn test_facing_needs_stick_started_on_pad() {
        let mut input = PlayerInput {
            stick: Vec2::new(-1.0, 0.0),
            stick_center: Some(Vec2::new(300.0, 100.0)),
            last_touch: Some(Vec2::new(240.0, 100.0)),
            ..default()
        };
        assert!(!input.steers_facing());

        input.stick_center = Some(Vec2::new(90.0, 400.0));
        assert!(input.steers_facing());
    }

    #[test]
    fn test_keyboard_vector_prefers_horizontal() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        assert_eq!(keyboard_vector(&keys), Vec2::new(0.0, -1.0));
        keys.press(KeyCode::ArrowLeft);
        assert_eq!(keyboard_vector(&keys), Vec2::new(-1.0, 0.0));
    }
}
