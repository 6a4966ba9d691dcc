use bevy::prelude::*;

/// Light text for the dark menu panels
pub const LABEL_TEXT: Color = Color::srgb(0.92, 0.90, 0.84);

/// Honey yellow for headers
pub const HEADER_TEXT: Color = Color::srgb(0.98, 0.78, 0.22);

/// Black text for buttons
pub const BUTTON_TEXT: Color = Color::srgb(0.1, 0.1, 0.1);
/// #f2b632
pub const BUTTON_BACKGROUND: Color = Color::srgb(0.949, 0.714, 0.196);
/// #f7cf6b
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.969, 0.812, 0.420);
/// #c48a12
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.769, 0.541, 0.071);

/// Backdrop behind popup menus
pub const MENU_BACKGROUND: Color = Color::srgba(0.08, 0.07, 0.10, 0.92);
/// Dim overlay over a paused level
pub const PAUSE_OVERLAY: Color = Color::srgba(0.0, 0.0, 0.0, 0.5);

/// Text drawn over the playfield
pub const HUD_TEXT: Color = Color::srgb(1.0, 1.0, 1.0);
/// Countdown and end-of-level banner
pub const BANNER_TEXT: Color = Color::srgb(1.0, 0.85, 0.25);

/// Everything outside the playfield
pub const BACKDROP: Color = Color::srgb(0.16, 0.13, 0.10);
pub const FLOOR: Color = Color::srgb(0.45, 0.62, 0.32);
/// #6e6e78
pub const BLOCK: Color = Color::srgb(0.431, 0.431, 0.471);
/// #a8733c
pub const CRATE: Color = Color::srgb(0.659, 0.451, 0.235);
pub const EXIT: Color = Color::srgb(0.25, 0.45, 0.85);

pub const BLAST: Color = Color::srgba(1.0, 0.55, 0.1, 0.8);
pub const BLAST_CORE: Color = Color::srgba(1.0, 0.9, 0.4, 0.9);

pub const THUMBSTICK_BOUNDARY: Color = Color::srgba(1.0, 1.0, 1.0, 0.25);
pub const THUMBSTICK_KNOB: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);
pub const BOMB_BUTTON: Color = Color::srgba(0.85, 0.2, 0.15, 0.6);
pub const BOMB_BUTTON_PRESSED: Color = Color::srgba(1.0, 0.45, 0.3, 0.9);
