//! Scoring module - the scoring collaborator seam and the standard rules
//!
//! The engine treats whatever implements [`Scoring`] as the authority on
//! score, lines, level and combo. After every call it copies the returned
//! [`ScoreState`] snapshot; it never reads collaborator internals.
//!
//! [`StandardScoring`] uses classic line scoring:
//! - Line clears award 40 / 100 / 300 / 1200 points times (level + 1).
//! - Consecutive clears add a combo bonus of 50 per step after the first.
//! - Soft drop awards 1 point per cell, hard drop 2.
//! - Level is lines / 10.
//! - Emptying the board with a clear doubles that clear's points.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::board::Board;
use crate::error::ScoringError;

/// Base points for clearing N lines at level 0 (index = line count)
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Combo scoring base value (50 points per combo step)
pub const COMBO_BASE: u32 = 50;

pub const SOFT_DROP_POINTS_PER_CELL: u32 = 1;
pub const HARD_DROP_POINTS_PER_CELL: u32 = 2;

/// Lines per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Immutable copy of the collaborator's derived state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreState {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub combo: u32,
}

/// Result of reporting a line clear
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LineClearOutcome {
    pub points: u32,
    /// Short presentation text, e.g. "Double" or "Triple x3"
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerformanceMetrics {
    pub inputs: u32,
    pub pieces: u32,
    pub inputs_per_piece: f64,
}

/// Signed summary of a finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreProof {
    pub session: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub pieces: u32,
    pub inputs: u32,
    /// Hex-encoded SHA-256 over the fields above
    pub digest: String,
}

/// The scoring collaborator consumed by the engine
pub trait Scoring {
    fn start_game(&mut self);
    fn input_made(&mut self);
    /// Points awarded for `cells` rows of soft drop
    fn soft_drop(&mut self, cells: u32) -> u32;
    /// Points awarded for a hard drop of `cells` rows
    fn hard_drop(&mut self, cells: u32) -> u32;
    fn piece_placed(&mut self);
    /// Report `count` removed lines; `board` is the board after removal
    fn line_clear(&mut self, count: usize, board: &Board) -> LineClearOutcome;
    /// A piece settled without clearing anything
    fn reset_combo(&mut self);
    fn state(&self) -> ScoreState;
    fn performance_metrics(&self) -> PerformanceMetrics;
    fn generate_proof(&self) -> Result<ScoreProof, ScoringError>;
}

/// Calculate line clear score (Classic rules)
/// lines: number of lines cleared (1-4, more is scored as 4)
/// level: current level (0-based)
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    let base_score = LINE_SCORES[lines.min(4)];
    base_score.saturating_mul(level + 1)
}

/// Combo bonus for the given chain length (the first clear earns none)
pub fn calculate_combo_bonus(combo: u32) -> u32 {
    COMBO_BASE.saturating_mul(combo.saturating_sub(1))
}

fn clear_name(lines: usize) -> &'static str {
    match lines {
        1 => "Single",
        2 => "Double",
        3 => "Triple",
        _ => "Quad",
    }
}

#[derive(Debug, Clone, Default)]
pub struct StandardScoring {
    state: ScoreState,
    session: u32,
    started: bool,
    inputs: u32,
    pieces: u32,
}

impl StandardScoring {
    pub fn new() -> Self {
        Self::default()
    }

    fn recompute_level(&mut self) {
        self.state.level = self.state.lines / LINES_PER_LEVEL;
    }
}

impl Scoring for StandardScoring {
    fn start_game(&mut self) {
        self.state = ScoreState::default();
        self.session = self.session.wrapping_add(1);
        self.started = true;
        self.inputs = 0;
        self.pieces = 0;
    }

    fn input_made(&mut self) {
        self.inputs = self.inputs.saturating_add(1);
    }

    fn soft_drop(&mut self, cells: u32) -> u32 {
        let points = cells.saturating_mul(SOFT_DROP_POINTS_PER_CELL);
        self.state.score = self.state.score.saturating_add(points);
        points
    }

    fn hard_drop(&mut self, cells: u32) -> u32 {
        let points = cells.saturating_mul(HARD_DROP_POINTS_PER_CELL);
        self.state.score = self.state.score.saturating_add(points);
        points
    }

    fn piece_placed(&mut self) {
        self.pieces = self.pieces.saturating_add(1);
    }

    fn line_clear(&mut self, count: usize, board: &Board) -> LineClearOutcome {
        if count == 0 {
            return LineClearOutcome::default();
        }

        self.state.combo += 1;
        let mut points = calculate_line_score(count, self.state.level);
        let perfect = board.is_empty();
        if perfect {
            points = points.saturating_mul(2);
        }
        points = points.saturating_add(calculate_combo_bonus(self.state.combo));

        self.state.score = self.state.score.saturating_add(points);
        self.state.lines = self.state.lines.saturating_add(count as u32);
        self.recompute_level();

        let mut message = clear_name(count).to_string();
        if self.state.combo > 1 {
            message.push_str(&format!(" x{}", self.state.combo));
        }
        if perfect {
            message.push_str(" Perfect Clear");
        }

        LineClearOutcome {
            points,
            message: Some(message),
        }
    }

    fn reset_combo(&mut self) {
        self.state.combo = 0;
    }

    fn state(&self) -> ScoreState {
        self.state
    }

    fn performance_metrics(&self) -> PerformanceMetrics {
        let inputs_per_piece = if self.pieces == 0 {
            0.0
        } else {
            f64::from(self.inputs) / f64::from(self.pieces)
        };
        PerformanceMetrics {
            inputs: self.inputs,
            pieces: self.pieces,
            inputs_per_piece,
        }
    }

    fn generate_proof(&self) -> Result<ScoreProof, ScoringError> {
        if !self.started {
            return Err(ScoringError::NoSession);
        }

        let ScoreState {
            score, lines, level, ..
        } = self.state;
        let mut hasher = Sha256::new();
        for value in [self.session, score, lines, level, self.pieces, self.inputs] {
            hasher.update(value.to_le_bytes());
        }

        Ok(ScoreProof {
            session: self.session,
            score,
            lines,
            level,
            pieces: self.pieces,
            inputs: self.inputs,
            digest: hex::encode(hasher.finalize()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn board_with_leftovers() -> Board {
        let mut board = Board::new(10, 20);
        board.set(0, 19, Some(Color(1)));
        board
    }

    #[test]
    fn test_line_score_table() {
        assert_eq!(calculate_line_score(0, 0), 0);
        assert_eq!(calculate_line_score(1, 0), 40);
        assert_eq!(calculate_line_score(4, 0), 1200);
        assert_eq!(calculate_line_score(2, 3), 400);
        assert_eq!(calculate_line_score(5, 0), 1200);
    }

    #[test]
    fn test_combo_bonus() {
        assert_eq!(calculate_combo_bonus(0), 0);
        assert_eq!(calculate_combo_bonus(1), 0);
        assert_eq!(calculate_combo_bonus(3), 100);
    }

    #[test]
    fn test_line_clear_updates_state_and_message() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        let board = board_with_leftovers();

        let first = scoring.line_clear(2, &board);
        assert_eq!(first.points, 100);
        assert_eq!(first.message.as_deref(), Some("Double"));

        let second = scoring.line_clear(1, &board);
        assert_eq!(second.points, 40 + 50);
        assert_eq!(second.message.as_deref(), Some("Single x2"));

        let state = scoring.state();
        assert_eq!(state.lines, 3);
        assert_eq!(state.combo, 2);
        assert_eq!(state.score, 190);
    }

    #[test]
    fn test_reset_combo() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        scoring.line_clear(1, &board_with_leftovers());
        scoring.reset_combo();
        assert_eq!(scoring.state().combo, 0);
        assert_eq!(scoring.state().lines, 1);
    }

    #[test]
    fn test_perfect_clear_doubles_points() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        let outcome = scoring.line_clear(4, &Board::new(10, 20));
        assert_eq!(outcome.points, 2400);
        assert_eq!(outcome.message.as_deref(), Some("Quad Perfect Clear"));
    }

    #[test]
    fn test_level_follows_lines() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        let board = board_with_leftovers();
        for _ in 0..3 {
            scoring.line_clear(4, &board);
        }
        assert_eq!(scoring.state().lines, 12);
        assert_eq!(scoring.state().level, 1);
    }

    #[test]
    fn test_drop_points() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        assert_eq!(scoring.soft_drop(3), 3);
        assert_eq!(scoring.hard_drop(10), 20);
        assert_eq!(scoring.state().score, 23);
    }

    #[test]
    fn test_start_game_resets() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        scoring.hard_drop(5);
        scoring.input_made();
        scoring.start_game();
        assert_eq!(scoring.state(), ScoreState::default());
        assert_eq!(scoring.performance_metrics().inputs, 0);
    }

    #[test]
    fn test_proof_requires_session_and_is_stable() {
        let mut scoring = StandardScoring::new();
        assert_eq!(scoring.generate_proof(), Err(ScoringError::NoSession));

        scoring.start_game();
        scoring.hard_drop(4);
        scoring.piece_placed();
        let a = scoring.generate_proof().unwrap();
        let b = scoring.generate_proof().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.digest.len(), 64);
        assert_eq!(a.score, 8);
    }

    #[test]
    fn test_performance_metrics() {
        let mut scoring = StandardScoring::new();
        scoring.start_game();
        for _ in 0..6 {
            scoring.input_made();
        }
        scoring.piece_placed();
        scoring.piece_placed();
        let metrics = scoring.performance_metrics();
        assert_eq!(metrics.inputs, 6);
        assert_eq!(metrics.inputs_per_piece, 3.0);
    }
}
