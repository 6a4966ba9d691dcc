//! Level flow: the startup countdown, the level clock, and how a level ends.

use std::time::Duration;

use bevy::prelude::*;

use super::{
    bomb::{BombExploded, Explosion},
    bomberman::Bomberman,
    geometry::Rect,
    highscore::{HighScores, ScoreEntry},
    level::{CurrentLevel, Level},
    thumbstick::PlayerInput,
};
use crate::{
    AppSystems, PausableSystems,
    config::{DifficultyConfig, GameConfig, secs_to_duration},
    menus::Menu,
    screens::Screen,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CurrentDifficulty>();
    app.init_resource::<GameSession>();
    app.add_message::<ClockWarning>();

    app.add_systems(
        Update,
        tick_session
            .in_set(AppSystems::TickTimers)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
    app.add_systems(
        Update,
        (
            check_outcome.run_if(is_playing),
            log_clock_warnings,
            open_level_over.run_if(in_state(Menu::None)),
        )
            .chain()
            .in_set(AppSystems::Update)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// How long "Go!" stays up once the countdown is over.
const GO_BANNER: Duration = Duration::from_millis(750);

/// Remaining clock times that trigger a warning.
const CLOCK_WARNINGS: [Duration; 2] = [Duration::from_secs(30), Duration::from_secs(10)];

/// Name recorded with a new high score.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn next(self) -> Option<Self> {
        match self {
            Difficulty::Easy => Some(Difficulty::Medium),
            Difficulty::Medium => Some(Difficulty::Hard),
            Difficulty::Hard => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn config(self, config: &GameConfig) -> &DifficultyConfig {
        match self {
            Difficulty::Easy => &config.difficulties.easy,
            Difficulty::Medium => &config.difficulties.medium,
            Difficulty::Hard => &config.difficulties.hard,
        }
    }
}

/// The difficulty of the level being played. Kept across levels.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct CurrentDifficulty(pub Difficulty);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Outcome {
    ReachedExit,
    Caught,
    TimeUp,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        self == Outcome::ReachedExit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Phase {
    #[default]
    Countdown,
    Playing,
    Ended(Outcome),
}

/// Sent when the level clock drops to a warning threshold.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockWarning {
    pub remaining: Duration,
}

/// State of the level being played.
#[derive(Resource, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Resource)]
pub struct GameSession {
    pub phase: Phase,
    countdown: Duration,
    go_banner: Duration,
    /// Time left on the level clock.
    pub clock: Duration,
    high_score_factor: u32,
    pub score: u32,
    pub new_high_score: bool,
}

impl GameSession {
    pub fn new(countdown: Duration, duration: Duration, high_score_factor: u32) -> Self {
        Self {
            phase: Phase::Countdown,
            countdown,
            go_banner: Duration::ZERO,
            clock: duration,
            high_score_factor,
            score: 0,
            new_high_score: false,
        }
    }

    pub fn for_difficulty(config: &GameConfig, difficulty: Difficulty) -> Self {
        let level = difficulty.config(config);
        Self::new(
            secs_to_duration(config.countdown_secs),
            secs_to_duration(level.duration_secs),
            level.high_score_factor,
        )
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Advance the countdown or the clock. Returns a warning for every
    /// threshold the clock crossed.
    pub fn advance(&mut self, delta: Duration) -> Vec<ClockWarning> {
        match self.phase {
            Phase::Countdown => {
                self.countdown = self.countdown.saturating_sub(delta);
                if self.countdown.is_zero() {
                    self.phase = Phase::Playing;
                    self.go_banner = GO_BANNER;
                }
                Vec::new()
            }
            Phase::Playing => {
                self.go_banner = self.go_banner.saturating_sub(delta);
                let before = self.clock;
                self.clock = self.clock.saturating_sub(delta);

                let warnings = CLOCK_WARNINGS
                    .into_iter()
                    .filter(|&at| before > at && self.clock <= at)
                    .map(|remaining| ClockWarning { remaining })
                    .collect();

                if self.clock.is_zero() {
                    self.end(Outcome::TimeUp);
                }
                warnings
            }
            Phase::Ended(_) => Vec::new(),
        }
    }

    /// End the level. Only the first outcome counts.
    pub fn end(&mut self, outcome: Outcome) -> bool {
        if matches!(self.phase, Phase::Ended(_)) {
            return false;
        }
        self.phase = Phase::Ended(outcome);
        self.score = if outcome.is_win() {
            let remaining_ms = u32::try_from(self.clock.as_millis()).unwrap_or(u32::MAX);
            self.high_score_factor.saturating_mul(remaining_ms)
        } else {
            0
        };
        true
    }

    /// The clock as "m:ss", rounded up so "0:00" only shows at the end.
    pub fn clock_label(&self) -> String {
        let secs = self.clock.as_secs() + u64::from(self.clock.subsec_nanos() > 0);
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    /// Text shown in the middle of the screen, if any.
    pub fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Countdown => Some(self.countdown.as_secs_f32().ceil().max(1.0).to_string()),
            Phase::Playing if !self.go_banner.is_zero() => Some("Go!".to_string()),
            Phase::Playing => None,
            Phase::Ended(Outcome::ReachedExit) if self.new_high_score => {
                Some("It's a new\nHigh-Score!".to_string())
            }
            Phase::Ended(Outcome::ReachedExit) => Some("You Win!".to_string()),
            Phase::Ended(Outcome::TimeUp) => Some("Time Is Up!".to_string()),
            Phase::Ended(Outcome::Caught) => Some("Caught in the blast!".to_string()),
        }
    }
}

pub fn is_playing(session: Res<GameSession>) -> bool {
    session.is_playing()
}

pub fn reset_session(
    mut session: ResMut<GameSession>,
    config: Res<GameConfig>,
    difficulty: Res<CurrentDifficulty>,
) {
    *session = GameSession::for_difficulty(&config, difficulty.0);
    info!(
        "Level starting on {} with {} on the clock",
        difficulty.0.name(),
        session.clock_label()
    );
}

fn tick_session(
    time: Res<Time>,
    mut session: ResMut<GameSession>,
    mut warnings: MessageWriter<ClockWarning>,
) {
    let was_playing = session.is_playing();
    for warning in session.advance(time.delta()) {
        warnings.write(warning);
    }
    if !was_playing && session.is_playing() {
        info!("Go!");
    }
    if let Some(Outcome::TimeUp) = session.outcome()
        && was_playing
    {
        info!("Time is up");
    }
}

/// How the level ends for an avatar whose collision area is `area`, given
/// the cells currently covered by blasts. Being caught wins over reaching
/// the exit.
pub fn outcome_for<'a>(
    area: &Rect,
    level: &Level,
    blast_cells: impl IntoIterator<Item = &'a UVec2>,
) -> Option<Outcome> {
    let caught = blast_cells
        .into_iter()
        .any(|&cell| Level::cell_bounds(cell).intersects(area));
    if caught {
        Some(Outcome::Caught)
    } else if Level::cell_bounds(level.exit()).contains_point(area.center()) {
        Some(Outcome::ReachedExit)
    } else {
        None
    }
}

fn check_outcome(
    mut session: ResMut<GameSession>,
    mut high_scores: ResMut<HighScores>,
    difficulty: Res<CurrentDifficulty>,
    level: Res<CurrentLevel>,
    mut exploded: MessageReader<BombExploded>,
    explosions: Query<&Explosion>,
    bomberman: Query<&Bomberman>,
) {
    let Ok(bomberman) = bomberman.single() else {
        return;
    };
    let area = bomberman.collision_area();

    let blast_cells = exploded
        .read()
        .flat_map(|event| event.blast.cells.iter())
        .chain(explosions.iter().flat_map(|explosion| explosion.cells.iter()));
    let Some(outcome) = outcome_for(&area, &level.0, blast_cells) else {
        return;
    };

    if !session.end(outcome) {
        return;
    }
    info!("Level over: {:?}, score {}", outcome, session.score);

    if outcome.is_win()
        && difficulty.0 == Difficulty::Hard
        && high_scores.is_high_score(session.score)
    {
        session.new_high_score =
            high_scores.add_score(ScoreEntry::new(DEFAULT_PLAYER_NAME, session.score));
        if session.new_high_score {
            info!("New high score: {}", session.score);
            high_scores.save();
        }
    }
}

fn log_clock_warnings(mut warnings: MessageReader<ClockWarning>) {
    for warning in warnings.read() {
        info!("{} seconds left on the clock", warning.remaining.as_secs());
    }
}

fn open_level_over(
    session: Res<GameSession>,
    input: Res<PlayerInput>,
    mut next_menu: ResMut<NextState<Menu>>,
) {
    if session.outcome().is_some() && input.tapped {
        next_menu.set(Menu::LevelOver);
    }
}
