//! High score leaderboard system
//!
//! Persisted as a JSON file, tracks top 10 scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, read_json, write_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Seconds the player stayed alive
    pub survived_secs: f32,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, survived_secs: f32, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                survived_secs,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from a JSON file
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let mut scores: Self = read_json(path)?;
        // hand-edited files may be unsorted or too long
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    /// Load high scores, starting fresh when the file is missing or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(scores) => scores,
            Err(e) if e.is_not_found() => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding high scores: {e}");
                Self::new()
            }
        }
    }

    /// Save high scores as JSON
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a timestamp relative to `now` (both unix seconds)
pub fn format_age(timestamp: u64, now: u64) -> String {
    let secs = now.saturating_sub(timestamp);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    match (days, hours, mins) {
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d > 1 => format!("{d} days ago"),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{h} hours ago"),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, m) if m > 1 => format!("{m} mins ago"),
        _ => "Just now".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(scores: &[u64]) -> HighScores {
        let mut hs = HighScores::new();
        for &s in scores {
            hs.add_score(s, 10.0, 0);
        }
        hs
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!HighScores::new().qualifies(0));
        assert_eq!(HighScores::new().potential_rank(0), None);
    }

    #[test]
    fn test_entries_stay_sorted() {
        let hs = table(&[5, 20, 12, 1]);
        let scores: Vec<_> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![20, 12, 5, 1]);
        assert_eq!(hs.top_score(), Some(20));
    }

    #[test]
    fn test_ties_rank_below_existing() {
        let mut hs = table(&[10, 5]);
        assert_eq!(hs.potential_rank(5), Some(3));
        assert_eq!(hs.add_score(10, 3.0, 7), Some(2));
        assert_eq!(hs.entries[1].timestamp, 7);
    }

    #[test]
    fn test_full_table_drops_lowest() {
        let mut hs = table(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert!(!hs.qualifies(10));
        assert_eq!(hs.add_score(5, 1.0, 0), None);

        assert_eq!(hs.add_score(55, 1.0, 0), Some(6));
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let hs = table(&[3, 9]);
        hs.save(&path).unwrap();

        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.entries, hs.entries);
    }

    #[test]
    fn test_load_sorts_hand_edited_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(
            &path,
            r#"{"entries":[
                {"score":1,"survived_secs":2.0,"timestamp":0},
                {"score":8,"survived_secs":9.0,"timestamp":0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(HighScores::load(&path).unwrap().top_score(), Some(8));
    }

    #[test]
    fn test_bad_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.json");
        assert!(HighScores::load_or_default(&missing).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "not json").unwrap();
        assert!(matches!(HighScores::load(&bad), Err(StorageError::Json { .. })));
        assert!(HighScores::load_or_default(&bad).is_empty());
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(100, 100), "Just now");
        assert_eq!(format_age(0, 61), "1 min ago");
        assert_eq!(format_age(0, 3 * 3600), "3 hours ago");
        assert_eq!(format_age(0, 86_400 + 5), "Yesterday");
        assert_eq!(format_age(0, 5 * 86_400), "5 days ago");
        assert_eq!(format_age(500, 0), "Just now");
    }
}
