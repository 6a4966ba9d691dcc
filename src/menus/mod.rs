//! The game's menus and transitions between them.

mod high_scores;
mod level_over;
mod main;
mod pause;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_state::<Menu>();

    app.add_plugins((
        high_scores::plugin,
        level_over::plugin,
        main::plugin,
        pause::plugin,
    ));
}

/// The popup drawn over the current screen, if any.
#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Menu {
    #[default]
    None,
    Main,
    Pause,
    LevelOver,
    HighScores,
}
