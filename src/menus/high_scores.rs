//! The high score table.

use bevy::{ecs::spawn::SpawnWith, input::common_conditions::input_just_pressed, prelude::*};

use crate::{
    game::highscore::HighScores,
    menus::Menu,
    theme::{palette::MENU_BACKGROUND, widget},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::HighScores), spawn_high_scores_menu);
    app.add_systems(
        Update,
        go_back.run_if(in_state(Menu::HighScores).and(input_just_pressed(KeyCode::Escape))),
    );
}

/// One line of the table: rank, name, then the score right-aligned.
fn score_line(rank: usize, name: &str, score: u32) -> String {
    format!("{:>2}. {:<15} {:>8}", rank, name, score)
}

fn spawn_high_scores_menu(mut commands: Commands, high_scores: Res<HighScores>) {
    let lines: Vec<String> = high_scores
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| score_line(i + 1, &entry.name, entry.score))
        .collect();

    commands.spawn((
        widget::ui_root("High Scores Menu"),
        BackgroundColor(MENU_BACKGROUND),
        GlobalZIndex(2),
        DespawnOnExit(Menu::HighScores),
        Children::spawn(SpawnWith(move |parent: &mut ChildSpawner| {
            parent.spawn(widget::header("High Scores"));

            if lines.is_empty() {
                parent.spawn(widget::label("No scores yet. Win on Hard to get one!"));
            }
            for line in lines {
                parent.spawn(widget::label(line));
            }

            parent.spawn(widget::button("Back", go_back_on_click));
        })),
    ));
}

fn go_back_on_click(_: On<Pointer<Click>>, mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::Main);
}

fn go_back(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::Main);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_lines_align() {
        assert_eq!(score_line(1, "Player", 27000), " 1. Player             27000");
        assert_eq!(score_line(10, "Player", 5), "10. Player                 5");
    }
}
