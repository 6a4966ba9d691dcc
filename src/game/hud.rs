//! Heads-up display: the clock, difficulty and bomb count, the centre
//! banner, and the on-screen controls.

use bevy::{prelude::*, sprite::Anchor};

use super::{
    bomb::BombBag,
    geometry::to_world,
    session::{CurrentDifficulty, GameSession},
    thumbstick::{ControlPad, PlayerInput},
};
use crate::{AppSystems, screens::Screen, theme::palette};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (update_hud_text, update_controls)
            .in_set(AppSystems::Update)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Controls draw above the playfield.
const CONTROLS_DEPTH: f32 = 5.0;

/// Which value a HUD text shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudText {
    Clock,
    Difficulty,
    Bombs,
    Banner,
}

#[derive(Component, Debug)]
pub struct ThumbstickKnob;

#[derive(Component, Debug)]
pub struct BombButton;

fn hud_text(kind: HudText, font_size: f32, color: Color) -> impl Bundle {
    (
        Name::new(format!("{:?} Text", kind)),
        kind,
        Text::default(),
        TextFont::from_font_size(font_size),
        TextColor(color),
    )
}

pub fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("HUD Bar"),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Px(40.0),
            padding: UiRect::horizontal(Val::Px(20.0)),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        },
        Pickable::IGNORE,
        GlobalZIndex(1),
        DespawnOnExit(Screen::Gameplay),
        children![
            hud_text(HudText::Clock, 26.0, palette::HUD_TEXT),
            hud_text(HudText::Difficulty, 26.0, palette::HUD_TEXT),
            hud_text(HudText::Bombs, 26.0, palette::HUD_TEXT),
        ],
    ));

    commands.spawn((
        Name::new("Banner"),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        Pickable::IGNORE,
        GlobalZIndex(1),
        DespawnOnExit(Screen::Gameplay),
        children![hud_text(HudText::Banner, 64.0, palette::BANNER_TEXT)],
    ));

    let boundary = ControlPad::thumbstick_area();
    commands.spawn((
        Name::new("Thumbstick Boundary"),
        Sprite {
            color: palette::THUMBSTICK_BOUNDARY,
            custom_size: Some(boundary.size()),
            ..default()
        },
        Anchor::TOP_LEFT,
        Transform::from_translation(to_world(boundary.position(), CONTROLS_DEPTH)),
        DespawnOnExit(Screen::Gameplay),
    ));
    commands.spawn((
        Name::new("Thumbstick Knob"),
        ThumbstickKnob,
        Sprite {
            color: palette::THUMBSTICK_KNOB,
            custom_size: Some(Vec2::splat(ControlPad::KNOB_WIDTH)),
            ..default()
        },
        Anchor::TOP_LEFT,
        Transform::from_translation(to_world(ControlPad::KNOB_REST, CONTROLS_DEPTH + 0.1)),
        DespawnOnExit(Screen::Gameplay),
    ));

    let button = ControlPad::bomb_button();
    commands.spawn((
        Name::new("Bomb Button"),
        BombButton,
        Sprite {
            color: palette::BOMB_BUTTON,
            custom_size: Some(button.size()),
            ..default()
        },
        Anchor::TOP_LEFT,
        Transform::from_translation(to_world(button.position(), CONTROLS_DEPTH)),
        DespawnOnExit(Screen::Gameplay),
    ));
}

fn update_hud_text(
    session: Res<GameSession>,
    bag: Res<BombBag>,
    difficulty: Res<CurrentDifficulty>,
    mut texts: Query<(&HudText, &mut Text)>,
) {
    if !(session.is_changed() || bag.is_changed() || difficulty.is_changed()) {
        return;
    }

    for (kind, mut text) in &mut texts {
        let value = match kind {
            HudText::Clock => session.clock_label(),
            HudText::Difficulty => difficulty.0.name().to_string(),
            HudText::Bombs => format!("Bombs: {}", bag.available()),
            HudText::Banner => session.banner().unwrap_or_default(),
        };
        if text.0 != value {
            text.0 = value;
        }
    }
}

fn update_controls(
    input: Res<PlayerInput>,
    mut knob: Single<&mut Transform, With<ThumbstickKnob>>,
    mut button: Single<&mut Sprite, With<BombButton>>,
) {
    knob.translation = to_world(input.knob_position(), knob.translation.z);

    let color = if input.bomb_held {
        palette::BOMB_BUTTON_PRESSED
    } else {
        palette::BOMB_BUTTON
    };
    if button.color != color {
        button.color = color;
    }
}
