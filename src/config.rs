//! Gameplay tuning loaded from `config.json`.
//!
//! Every field has a default, so the file may set only what it changes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::game::level::MAX_BLAST_RANGE;

/// Where the config is read from, relative to the working directory.
pub const CONFIG_PATH: &str = "config.json";

/// Fastest fixed tick rate accepted.
pub const MAX_TICK_HZ: f64 = 1000.0;

/// Longest duration any setting may ask for: one day.
pub const MAX_SECS: f32 = 86_400.0;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub difficulties: DifficultyTable,
    pub movement: MovementConfig,
    pub bombs: BombConfig,
    /// Seconds counted down before a level starts.
    pub countdown_secs: f32,
    /// Optional level layout file, see `game::level`.
    pub level_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultyConfig,
    pub medium: DifficultyConfig,
    pub hard: DifficultyConfig,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyConfig::new(150.0, 1),
            medium: DifficultyConfig::new(120.0, 2),
            hard: DifficultyConfig::new(90.0, 3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Length of the level clock.
    pub duration_secs: f32,
    /// Multiplier applied to the remaining milliseconds to get the score.
    pub high_score_factor: u32,
}

impl DifficultyConfig {
    pub const fn new(duration_secs: f32, high_score_factor: u32) -> Self {
        Self {
            duration_secs,
            high_score_factor,
        }
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self::new(150.0, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Pixels moved per fixed tick at full stick deflection.
    pub speed: f32,
    /// Fixed ticks per second.
    pub tick_hz: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 12.0,
            tick_hz: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BombConfig {
    /// Bombs that can be in play at once.
    pub capacity: u32,
    pub fuse_secs: f32,
    /// Cells reached in each direction.
    pub blast_range: u32,
    /// How long the explosion stays on screen.
    pub blast_linger_secs: f32,
}

impl Default for BombConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            fuse_secs: 3.0,
            blast_range: 1,
            blast_linger_secs: 0.4,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulties: DifficultyTable::default(),
            movement: MovementConfig::default(),
            bombs: BombConfig::default(),
            countdown_secs: 3.0,
            level_file: None,
        }
    }
}

impl GameConfig {
    /// Load the config from [`CONFIG_PATH`], falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(contents)?;
        config.sanitize();
        Ok(config)
    }

    /// Clamp values that would stall or crash the game.
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.movement.tick_hz.is_nan() || self.movement.tick_hz <= 0.0 {
            warn!("tick_hz must be positive, using {}", defaults.movement.tick_hz);
            self.movement.tick_hz = defaults.movement.tick_hz;
        }
        if self.movement.tick_hz > MAX_TICK_HZ {
            warn!("tick_hz {} is too high, using {}", self.movement.tick_hz, MAX_TICK_HZ);
            self.movement.tick_hz = MAX_TICK_HZ;
        }
        if self.bombs.capacity == 0 {
            warn!("Bomb capacity of 0 leaves no way to clear crates, using 1");
            self.bombs.capacity = 1;
        }
        if self.bombs.blast_range > MAX_BLAST_RANGE {
            warn!(
                "blast_range {} crosses the level, using {}",
                self.bombs.blast_range, MAX_BLAST_RANGE
            );
            self.bombs.blast_range = MAX_BLAST_RANGE;
        }

        clamp_secs("countdown_secs", &mut self.countdown_secs);
        clamp_secs("bombs.fuse_secs", &mut self.bombs.fuse_secs);
        clamp_secs("bombs.blast_linger_secs", &mut self.bombs.blast_linger_secs);
        for (name, difficulty) in [
            ("easy", &mut self.difficulties.easy),
            ("medium", &mut self.difficulties.medium),
            ("hard", &mut self.difficulties.hard),
        ] {
            clamp_secs(
                &format!("difficulties.{}.duration_secs", name),
                &mut difficulty.duration_secs,
            );
        }
    }
}

/// Seconds from the config as a [`Duration`], clamped to `0..=MAX_SECS`.
pub fn secs_to_duration(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.clamp(0.0, MAX_SECS)).unwrap_or_default()
}

/// Keep a duration in seconds within `0..=MAX_SECS`.
fn clamp_secs(name: &str, secs: &mut f32) {
    let clamped = secs.max(0.0).min(MAX_SECS);
    if clamped != *secs {
        warn!("{} of {} is out of range, using {}", name, secs, clamped);
        *secs = clamped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = GameConfig::parse("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.difficulties.hard.duration_secs, 90.0);
        assert_eq!(config.difficulties.medium.high_score_factor, 2);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = GameConfig::parse(
            r#"{ "bombs": { "blast_range": 3 }, "difficulties": { "easy": { "duration_secs": 60 } } }"#,
        )
        .unwrap();
        assert_eq!(config.bombs.blast_range, 3);
        assert_eq!(config.bombs.fuse_secs, 3.0);
        assert_eq!(config.difficulties.easy.duration_secs, 60.0);
        assert_eq!(config.difficulties.easy.high_score_factor, 1);
        assert_eq!(config.difficulties.hard, DifficultyConfig::new(90.0, 3));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(GameConfig::parse("{ \"movement\": ").is_err());
    }

    #[test]
    fn test_stalling_values_are_clamped() {
        let config =
            GameConfig::parse(r#"{ "movement": { "tick_hz": 0 }, "bombs": { "capacity": 0 } }"#)
                .unwrap();
        assert_eq!(config.movement.tick_hz, 30.0);
        assert_eq!(config.bombs.capacity, 1);

        let config = GameConfig::parse(r#"{ "movement": { "tick_hz": 1e300 } }"#).unwrap();
        assert_eq!(config.movement.tick_hz, MAX_TICK_HZ);
    }

    #[test]
    fn test_huge_durations_are_capped() {
        let config = GameConfig::parse(
            r#"{
                "countdown_secs": 1e20,
                "bombs": { "fuse_secs": 1e20, "blast_linger_secs": -2, "blast_range": 4000000000 },
                "difficulties": { "hard": { "duration_secs": 1e30, "high_score_factor": 3 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.countdown_secs, MAX_SECS);
        assert_eq!(config.bombs.fuse_secs, MAX_SECS);
        assert_eq!(config.bombs.blast_linger_secs, 0.0);
        assert_eq!(config.bombs.blast_range, MAX_BLAST_RANGE);
        assert_eq!(config.difficulties.hard.duration_secs, MAX_SECS);

        for secs in [
            config.countdown_secs,
            config.bombs.fuse_secs,
            config.difficulties.hard.duration_secs,
        ] {
            assert!(Duration::try_from_secs_f32(secs).is_ok());
        }
    }

    #[test]
    fn test_secs_to_duration_never_panics() {
        assert_eq!(secs_to_duration(1.5), Duration::from_millis(1500));
        assert_eq!(secs_to_duration(-3.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f32::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(1e20), Duration::from_secs(86_400));
        assert_eq!(secs_to_duration(f32::INFINITY), Duration::from_secs(86_400));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = GameConfig::load_from(Path::new("does/not/exist.json"));
        assert_eq!(config, GameConfig::default());
    }
}
