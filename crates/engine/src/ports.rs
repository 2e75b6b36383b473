//! Persistence port - where high scores and lifetime counters live
//!
//! The engine receives a store at construction and writes to it once per
//! finished session. Store failures are reported as events and never stop
//! the game from reaching its terminal phase.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Counters accumulated across every finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub games_played: u32,
    pub total_lines: u64,
    pub total_pieces: u64,
}

/// What a finished session contributes to the lifetime counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRecord {
    pub score: u32,
    pub lines: u32,
    pub pieces: u32,
}

pub trait ProgressStore {
    fn high_score(&self) -> u32;
    fn set_high_score(&mut self, score: u32) -> Result<(), StoreError>;
    fn record_session(&mut self, session: &SessionRecord) -> Result<(), StoreError>;
    fn lifetime(&self) -> LifetimeStats;
}

/// In-process store; the default for headless runs and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    high_score: u32,
    lifetime: LifetimeStats,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(high_score: u32) -> Self {
        Self {
            high_score,
            ..Self::default()
        }
    }
}

impl ProgressStore for MemoryStore {
    fn high_score(&self) -> u32 {
        self.high_score
    }

    fn set_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.high_score = score;
        Ok(())
    }

    fn record_session(&mut self, session: &SessionRecord) -> Result<(), StoreError> {
        self.lifetime.games_played = self.lifetime.games_played.saturating_add(1);
        self.lifetime.total_lines += u64::from(session.lines);
        self.lifetime.total_pieces += u64::from(session.pieces);
        Ok(())
    }

    fn lifetime(&self) -> LifetimeStats {
        self.lifetime
    }
}
