//! The title screen shown when the game starts and after quitting a level.

use bevy::prelude::*;

use crate::{menus::Menu, screens::Screen, theme::palette};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Title), (spawn_title_backdrop, open_main_menu));
    app.add_systems(OnExit(Screen::Title), close_menu);
}

fn spawn_title_backdrop(mut commands: Commands) {
    commands.spawn((
        Name::new("Title Backdrop"),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(palette::BACKDROP),
        GlobalZIndex(0),
        DespawnOnExit(Screen::Title),
    ));
}

fn open_main_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::Main);
}

fn close_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::None);
}
