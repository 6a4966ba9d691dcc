//! The main menu (seen on the title screen).

use bevy::prelude::*;

use crate::{
    game::session::{CurrentDifficulty, Difficulty},
    menus::Menu,
    screens::Screen,
    theme::widget,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::Main), spawn_main_menu);
}

fn spawn_main_menu(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Main Menu"),
        GlobalZIndex(2),
        DespawnOnExit(Menu::Main),
        #[cfg(not(target_family = "wasm"))]
        children![
            widget::header("Honey Bomber"),
            widget::button("Start", start_game),
            widget::button("High Scores", open_high_scores_menu),
            widget::button("Exit", exit_app),
        ],
        #[cfg(target_family = "wasm")]
        children![
            widget::header("Honey Bomber"),
            widget::button("Start", start_game),
            widget::button("High Scores", open_high_scores_menu),
        ],
    ));
}

fn start_game(
    _: On<Pointer<Click>>,
    mut difficulty: ResMut<CurrentDifficulty>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    difficulty.0 = Difficulty::Easy;
    next_screen.set(Screen::Gameplay);
}

fn open_high_scores_menu(_: On<Pointer<Click>>, mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::HighScores);
}

#[cfg(not(target_family = "wasm"))]
fn exit_app(_: On<Pointer<Click>>, mut app_exit: MessageWriter<AppExit>) {
    app_exit.write(AppExit::Success);
}
