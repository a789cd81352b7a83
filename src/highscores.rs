//! High score ledger
//!
//! Persisted top-10 list, sorted descending by score.

use serde::{Deserialize, Serialize};

use crate::storage::{Store, keys};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Name shown when the player never typed one
pub const ANONYMOUS: &str = "Anon";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    /// Unix timestamp (ms) when achieved
    #[serde(rename = "t")]
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Load the ledger; absent or corrupt storage reads as empty.
    pub fn load(store: &Store) -> Self {
        Self {
            entries: store.read_json(keys::HIGH_SCORES, Vec::new()),
        }
    }

    pub fn save(&self, store: &Store) {
        store.write_json(keys::HIGH_SCORES, &self.entries);
    }

    /// Append a run's score, re-sort, trim to the top 10, persist, and
    /// return the resulting ledger for display.
    pub fn record(store: &Store, name: &str, score: u32, timestamp: f64) -> Self {
        let mut ledger = Self::load(store);
        let name = if name.is_empty() { ANONYMOUS } else { name };
        ledger.entries.push(HighScoreEntry {
            name: name.to_string(),
            score,
            timestamp,
        });
        // Stable sort: equal scores keep their arrival order
        ledger.entries.sort_by(|a, b| b.score.cmp(&a.score));
        ledger.entries.truncate(MAX_HIGH_SCORES);
        ledger.save(store);
        ledger
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

/// Load the persisted player name (may be empty).
pub fn load_player_name(store: &Store) -> String {
    store.read_or(keys::PLAYER_NAME, "")
}

pub fn save_player_name(store: &Store, name: &str) {
    store.set(keys::PLAYER_NAME, name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sorts_descending() {
        let store = Store::new();
        HighScores::record(&store, "a", 5, 1.0);
        HighScores::record(&store, "b", 12, 2.0);
        let ledger = HighScores::record(&store, "c", 8, 3.0);

        let scores: Vec<u32> = ledger.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![12, 8, 5]);
        assert_eq!(ledger.top_score(), Some(12));
    }

    #[test]
    fn test_ledger_never_exceeds_ten() {
        let store = Store::new();
        for i in 0..25u32 {
            let ledger = HighScores::record(&store, "p", i, i as f64);
            assert!(ledger.entries.len() <= MAX_HIGH_SCORES);
        }
        let ledger = HighScores::load(&store);
        assert_eq!(ledger.entries.len(), MAX_HIGH_SCORES);
        // The ten highest survive
        let scores: Vec<u32> = ledger.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, (15..25).rev().collect::<Vec<u32>>());
    }

    #[test]
    fn test_low_score_dropped_when_full_of_higher() {
        let store = Store::new();
        for i in 0..10u32 {
            HighScores::record(&store, "p", 100 + i, i as f64);
        }
        let before = HighScores::load(&store);
        assert_eq!(before.entries.len(), MAX_HIGH_SCORES);

        let after = HighScores::record(&store, "late", 3, 99.0);
        assert_eq!(after.entries, before.entries);
    }

    #[test]
    fn test_empty_name_records_as_anon() {
        let store = Store::new();
        let ledger = HighScores::record(&store, "", 1, 0.0);
        assert_eq!(ledger.entries[0].name, ANONYMOUS);
    }

    #[test]
    fn test_wire_format_uses_short_timestamp_field() {
        let store = Store::new();
        HighScores::record(&store, "p", 7, 123.0);
        let raw = store.get(keys::HIGH_SCORES).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["name"], "p");
        assert_eq!(value[0]["score"], 7);
        assert_eq!(value[0]["t"], 123.0);
    }

    #[test]
    fn test_corrupt_ledger_reads_as_empty() {
        let store = Store::new();
        store.set(keys::HIGH_SCORES, "{broken");
        assert!(HighScores::load(&store).is_empty());
    }

    #[test]
    fn test_player_name_roundtrip() {
        let store = Store::new();
        assert_eq!(load_player_name(&store), "");
        save_player_name(&store, "Ada");
        assert_eq!(load_player_name(&store), "Ada");
    }
}
