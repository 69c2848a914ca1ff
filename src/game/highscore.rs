//! High scores with a Top 10 leaderboard.
//!
//! The game only asks for the best score and hands over finished games; where
//! the table is kept is up to the host. `HighScores` keeps it in memory and can
//! round-trip through JSON.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Maximum number of high scores to keep.
const MAX_HIGH_SCORES: usize = 10;

/// Where the game reads and stores its best score.
pub trait HighScoreStore: Send + Sync {
    fn high_score(&self) -> u32;

    fn set_high_score(&mut self, score: u32);

    /// Record a finished game. Keeps only the best score unless overridden.
    fn record(&mut self, entry: ScoreEntry) {
        if entry.score > self.high_score() {
            self.set_high_score(entry.score);
        }
    }
}

/// A single high score entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub pieces_removed: u32,
    pub turns: u32,
}

impl ScoreEntry {
    pub fn new(score: u32, pieces_removed: u32, turns: u32) -> Self {
        Self {
            score,
            pieces_removed,
            turns,
        }
    }
}

/// The top 10 scores, best first.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Check if a score would make it into the top 10.
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

    /// Add a new score to the leaderboard (if it qualifies).
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

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl HighScoreStore for HighScores {
    fn high_score(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    fn set_high_score(&mut self, score: u32) {
        self.add_score(ScoreEntry::new(score, 0, 0));
    }

    fn record(&mut self, entry: ScoreEntry) {
        let score = entry.score;
        if self.add_score(entry) {
            info!("New top 10 score: {}", score);
        }
    }
}
