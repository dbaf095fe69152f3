//! Race-record leaderboard
//!
//! Tracks the 10 fastest finishes. The stats collaborator owns persistence;
//! this module only ranks records and serializes the board, mirroring the
//! map-file JSON round trip.

use serde::{Deserialize, Serialize};

use crate::sim::actor::PlayerId;
use crate::sim::judge::RaceOutcome;

/// Maximum number of records to keep
pub const MAX_RECORDS: usize = 10;

/// One finished race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub winner: PlayerId,
    pub maze_width: usize,
    pub maze_height: usize,
    pub elapsed_ticks: u64,
    /// Unix timestamp (ms) when the race finished
    pub timestamp: f64,
}

impl RaceRecord {
    pub fn from_outcome(outcome: &RaceOutcome, timestamp: f64) -> Self {
        Self {
            winner: outcome.winner,
            maze_width: outcome.maze_width,
            maze_height: outcome.maze_height,
            elapsed_ticks: outcome.elapsed_ticks,
            timestamp,
        }
    }
}

/// Fastest-first leaderboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<RaceRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record qualifies while the board has room or it beats the slowest
    /// kept time. Zero-tick records are discarded as corrupt.
    pub fn qualifies(&self, elapsed_ticks: u64) -> bool {
        if elapsed_ticks == 0 {
            return false;
        }
        if self.entries.len() < MAX_RECORDS {
            return true;
        }
        self.entries
            .last()
            .is_none_or(|e| elapsed_ticks < e.elapsed_ticks)
    }

    /// Insert a record keeping ascending elapsed-time order. Returns the rank
    /// achieved (1-indexed), or `None` if it did not qualify.
    pub fn add(&mut self, record: RaceRecord) -> Option<usize> {
        if !self.qualifies(record.elapsed_ticks) {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| record.elapsed_ticks < e.elapsed_ticks)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, record);
        self.entries.truncate(MAX_RECORDS);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&RaceRecord> {
        self.entries.first()
    }

    pub fn to_json(&self) -> String {
        // A plain record list cannot fail to serialize
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticks: u64) -> RaceRecord {
        RaceRecord {
            winner: PlayerId::One,
            maze_width: 7,
            maze_height: 7,
            elapsed_ticks: ticks,
            timestamp: 0.0,
        }
    }

    #[test]
    fn keeps_fastest_first() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(record(900)), Some(1));
        assert_eq!(board.add(record(300)), Some(1));
        assert_eq!(board.add(record(600)), Some(2));
        assert_eq!(board.best().unwrap().elapsed_ticks, 300);
        assert_eq!(
            board.entries.iter().map(|e| e.elapsed_ticks).collect::<Vec<_>>(),
            vec![300, 600, 900]
        );
    }

    #[test]
    fn full_board_only_admits_faster_times() {
        let mut board = Leaderboard::new();
        for ticks in (1..=MAX_RECORDS as u64).map(|n| n * 100) {
            assert!(board.add(record(ticks)).is_some());
        }
        assert!(!board.qualifies(2_000));
        assert_eq!(board.add(record(2_000)), None);
        assert_eq!(board.add(record(50)), Some(1));
        assert_eq!(board.entries.len(), MAX_RECORDS);
        assert_eq!(board.entries.last().unwrap().elapsed_ticks, 900);
    }

    #[test]
    fn zero_tick_records_are_rejected() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(record(0)), None);
        assert!(board.is_empty());
    }

    #[test]
    fn json_round_trip() {
        let mut board = Leaderboard::new();
        board.add(record(420));
        let restored = Leaderboard::from_json(&board.to_json()).unwrap();
        assert_eq!(restored.entries, board.entries);
    }
}
