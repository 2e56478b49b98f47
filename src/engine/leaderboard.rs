//! Best-wins leaderboard persisted as a JSON array.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::error::LeaderboardError;

pub const LEADERBOARD_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub nickname: String,
    pub wins: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`. Missing or malformed stores yield an empty board.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no leaderboard yet, starting empty");
                return Self::new();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read leaderboard");
                return Self::new();
            }
        };
        match Self::from_json(&content) {
            Ok(board) => {
                tracing::info!(path = %path.display(), entries = board.len(), "loaded leaderboard");
                board
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed leaderboard, starting empty");
                Self::new()
            }
        }
    }

    /// Parse a JSON array of entries, re-sorting and capping it.
    pub fn from_json(content: &str) -> Result<Self, LeaderboardError> {
        let entries: Vec<LeaderboardEntry> = serde_json::from_str(content)?;
        let mut board = Self { entries };
        board.normalize();
        Ok(board)
    }

    pub fn to_json(&self) -> Result<String, LeaderboardError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), LeaderboardError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Upsert `nickname` keeping its best win count, then re-sort and cap.
    pub fn record(&mut self, nickname: &str, wins: u32) {
        match self.entries.iter_mut().find(|e| e.nickname == nickname) {
            Some(existing) => existing.wins = existing.wins.max(wins),
            None => self.entries.push(LeaderboardEntry {
                nickname: nickname.to_string(),
                wins,
            }),
        }
        self.normalize();
    }

    /// `record` followed by `save`.
    pub fn record_and_save(&mut self, nickname: &str, wins: u32, path: &Path) -> Result<(), LeaderboardError> {
        self.record(nickname, wins);
        self.save(path)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_for(&self, nickname: &str) -> Option<u32> {
        self.entries.iter().find(|e| e.nickname == nickname).map(|e| e.wins)
    }

    /// One row per nickname at its best count, then a stable sort so equal
    /// win counts keep their insertion order.
    fn normalize(&mut self) {
        let mut merged: Vec<LeaderboardEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match merged.iter_mut().find(|e| e.nickname == entry.nickname) {
                Some(existing) => existing.wins = existing.wins.max(entry.wins),
                None => merged.push(entry),
            }
        }
        merged.sort_by(|a, b| b.wins.cmp(&a.wins));
        merged.truncate(LEADERBOARD_CAPACITY);
        self.entries = merged;
    }
}
