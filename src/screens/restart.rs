//! A one-frame stop between two runs of the gameplay screen.
//!
//! Setting a state to its current value does not run its enter and exit
//! schedules, so restarting a level leaves gameplay for this screen first.

use bevy::prelude::*;

use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Restart), enter_gameplay_screen);
}

fn enter_gameplay_screen(mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Gameplay);
}
