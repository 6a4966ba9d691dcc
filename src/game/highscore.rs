//! High score persistence with a Top 10 table.
//!
//! Scores are saved to a local JSON file in the user's data directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HighScores>();

    // Load high scores on startup
    app.add_systems(Startup, load_high_scores);
}

/// Maximum number of high scores to keep.
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest name stored with a score.
pub const MAX_NAME_LENGTH: usize = 15;

/// A single high score entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(name: &str, score: u32) -> Self {
        Self {
            name: name.chars().take(MAX_NAME_LENGTH).collect(),
            score,
        }
    }
}

/// Resource holding the top 10 high scores, best first.
#[derive(Resource, Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Check if a score would make it into the table.
    pub fn is_high_score(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|lowest| score > lowest.score)
            .unwrap_or(true)
    }

    /// Add a new score to the table (if it qualifies).
    /// Returns true if the score was added.
    pub fn add_score(&mut self, entry: ScoreEntry) -> bool {
        if entry.score == 0 {
            return false;
        }

        // Insert in sorted position (descending by score)
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());

        if pos >= MAX_HIGH_SCORES {
            return false;
        }

        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        true
    }

    /// Get the file path for storing high scores.
    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("honey-bomber").join("highscores.json"))
    }

    /// Load high scores from disk.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for high scores");
            return Self::default();
        };

        if !path.exists() {
            info!("No high scores file found at {:?}, starting fresh", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(mut scores) => {
                    scores.normalize();
                    info!("Loaded {} high scores from {:?}", scores.entries.len(), path);
                    scores
                }
                Err(e) => {
                    warn!("Failed to parse high scores: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read high scores file: {}", e);
                Self::default()
            }
        }
    }

    /// Save high scores to disk.
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for saving high scores");
            return;
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create high scores directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(&path, json) {
                Ok(()) => info!("Saved high scores to {:?}", path),
                Err(e) => warn!("Failed to write high scores: {}", e),
            },
            Err(e) => warn!("Failed to serialize high scores: {}", e),
        }
    }

    /// Restore the table invariants on data read from disk.
    fn normalize(&mut self) {
        self.entries.retain(|entry| entry.score > 0);
        for entry in &mut self.entries {
            if entry.name.chars().count() > MAX_NAME_LENGTH {
                entry.name = entry.name.chars().take(MAX_NAME_LENGTH).collect();
            }
        }
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}

/// Load high scores on startup.
fn load_high_scores(mut high_scores: ResMut<HighScores>) {
    *high_scores = HighScores::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table() -> HighScores {
        let mut scores = HighScores::default();
        for score in 1..=10 {
            scores.add_score(ScoreEntry::new("Player", score * 100));
        }
        scores
    }

    #[test]
    fn test_scores_kept_in_descending_order() {
        let mut scores = HighScores::default();
        assert!(scores.add_score(ScoreEntry::new("a", 300)));
        assert!(scores.add_score(ScoreEntry::new("b", 900)));
        assert!(scores.add_score(ScoreEntry::new("c", 500)));
        let order: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![900, 500, 300]);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::default();
        assert!(!scores.is_high_score(0));
        assert!(!scores.add_score(ScoreEntry::new("Player", 0)));
    }

    #[test]
    fn test_full_table_drops_lowest() {
        let mut scores = full_table();
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.is_high_score(100));
        assert!(!scores.add_score(ScoreEntry::new("Player", 50)));

        assert!(scores.is_high_score(150));
        assert!(scores.add_score(ScoreEntry::new("Player", 150)));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(150));
    }

    #[test]
    fn test_names_truncated() {
        let entry = ScoreEntry::new("A very long player name", 10);
        assert_eq!(entry.name, "A very long pla");
        assert_eq!(entry.name.chars().count(), MAX_NAME_LENGTH);
    }

    #[test]
    fn test_normalize_repairs_loaded_table() {
        let mut scores: HighScores = serde_json::from_str(
            r#"{ "entries": [
                { "name": "low", "score": 5 },
                { "name": "zero", "score": 0 },
                { "name": "Someone with a long name", "score": 50 }
            ] }"#,
        )
        .unwrap();
        scores.normalize();
        assert_eq!(scores.entries.len(), 2);
        assert_eq!(scores.entries[0], ScoreEntry::new("Someone with a long name", 50));
        assert_eq!(scores.entries[1].name, "low");
    }
}
