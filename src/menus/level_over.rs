//! The menu shown once a level has ended.

use bevy::{ecs::spawn::SpawnWith, prelude::*};

use crate::{
    Pause,
    game::session::{CurrentDifficulty, Difficulty, GameSession, Outcome},
    menus::Menu,
    screens::Screen,
    theme::{palette::MENU_BACKGROUND, widget},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(Menu::LevelOver),
        (pause, spawn_level_over_menu),
    );
}

/// What the level-over menu offers after a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelOverChoice {
    /// Won below the hardest difficulty.
    NextLevel,
    /// Won on the hardest difficulty.
    Finished,
    Retry,
}

impl LevelOverChoice {
    fn new(outcome: Outcome, difficulty: Difficulty) -> Self {
        match (outcome.is_win(), difficulty.next()) {
            (true, Some(_)) => LevelOverChoice::NextLevel,
            (true, None) => LevelOverChoice::Finished,
            (false, _) => LevelOverChoice::Retry,
        }
    }

    fn header(self, difficulty: Difficulty) -> String {
        match self {
            LevelOverChoice::NextLevel => format!("You Finished Level: {}", difficulty.name()),
            LevelOverChoice::Finished => "You Win".to_string(),
            LevelOverChoice::Retry => "You Lose".to_string(),
        }
    }
}

fn pause(mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(true));
}

fn spawn_level_over_menu(
    mut commands: Commands,
    session: Res<GameSession>,
    difficulty: Res<CurrentDifficulty>,
) {
    let outcome = session.outcome().unwrap_or(Outcome::TimeUp);
    let choice = LevelOverChoice::new(outcome, difficulty.0);
    let header = choice.header(difficulty.0);
    let score = outcome.is_win().then_some(session.score);

    info!("Level over menu: {}", header);

    commands.spawn((
        widget::ui_root("Level Over Menu"),
        BackgroundColor(MENU_BACKGROUND),
        GlobalZIndex(2),
        DespawnOnExit(Menu::LevelOver),
        Children::spawn(SpawnWith(move |parent: &mut ChildSpawner| {
            parent.spawn(widget::header(header));
            if let Some(score) = score {
                parent.spawn(widget::label(format!("Score: {}", score)));
            }

            match choice {
                LevelOverChoice::NextLevel => {
                    parent.spawn(widget::button("Next level", next_level));
                }
                LevelOverChoice::Retry => {
                    parent.spawn(widget::button("Retry", retry));
                }
                LevelOverChoice::Finished => {}
            }
            parent.spawn(widget::button("Main menu", quit_to_title));
        })),
    ));
}

fn next_level(
    _: On<Pointer<Click>>,
    mut difficulty: ResMut<CurrentDifficulty>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if let Some(next) = difficulty.0.next() {
        difficulty.0 = next;
    }
    next_screen.set(Screen::Restart);
}

fn retry(_: On<Pointer<Click>>, mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Restart);
}

fn quit_to_title(_: On<Pointer<Click>>, mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_follow_outcome() {
        let choice = LevelOverChoice::new(Outcome::ReachedExit, Difficulty::Easy);
        assert_eq!(choice, LevelOverChoice::NextLevel);
        assert_eq!(choice.header(Difficulty::Easy), "You Finished Level: Easy");

        let choice = LevelOverChoice::new(Outcome::ReachedExit, Difficulty::Hard);
        assert_eq!(choice, LevelOverChoice::Finished);
        assert_eq!(choice.header(Difficulty::Hard), "You Win");

        for outcome in [Outcome::Caught, Outcome::TimeUp] {
            let choice = LevelOverChoice::new(outcome, Difficulty::Medium);
            assert_eq!(choice, LevelOverChoice::Retry);
            assert_eq!(choice.header(Difficulty::Medium), "You Lose");
        }
    }
}
