//! Read-only snapshot of the game state for renderers and hosts
//!
//! A snapshot is an owned copy; nothing in it borrows from the live state,
//! so it may be held across ticks.

use serde::Serialize;

use crate::game_state::{ActivePiece, GameState, Statistics};
use crate::physics;
use crate::pieces::Piece;
use crate::scoring::ScoreState;
use crate::types::{Cell, Color, GameMode, Phase, PieceKind, Rotation, TransitionKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub variant: u8,
    pub color: Color,
    /// Color with the float darkening applied
    pub display_color: Color,
    pub up_moves_used: u8,
    pub x: i32,
    pub y: i32,
    /// Absolute board cells (relative offsets for pieces not on the board)
    pub cells: Vec<(i32, i32)>,
}

impl PieceSnapshot {
    fn from_piece(piece: &Piece, x: i32, y: i32, up_move_cap: u8) -> Self {
        Self {
            kind: piece.kind(),
            rotation: piece.rotation(),
            variant: piece.variant,
            color: piece.color(),
            display_color: piece.display_color(up_move_cap),
            up_moves_used: piece.up_moves_used,
            x,
            y,
            cells: piece.cells_at(x, y).collect(),
        }
    }

    fn from_active(active: &ActivePiece, up_move_cap: u8) -> Self {
        Self::from_piece(&active.piece, active.x, active.y, up_move_cap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimersSnapshot {
    pub lock_ms: f64,
    pub gravity_accumulator_ms: f64,
    pub gravity_delay_ms: f64,
    pub clear_ms: f64,
    pub countdown_ms: f64,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionSnapshot {
    pub kind: TransitionKind,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub mode: GameMode,
    pub width: u8,
    pub height: u8,
    /// Rows top to bottom
    pub board: Vec<Vec<Cell>>,
    pub current: Option<PieceSnapshot>,
    pub shadow_y: Option<i32>,
    pub next: Option<PieceSnapshot>,
    pub held: Option<PieceSnapshot>,
    pub can_hold: bool,
    pub is_locking: bool,
    pub timers: TimersSnapshot,
    pub transition: Option<TransitionSnapshot>,
    pub clearing_lines: Vec<usize>,
    pub unlocked: Vec<PieceKind>,
    pub stats: Statistics,
    pub score: ScoreState,
    pub seed: u32,
}

impl GameSnapshot {
    /// Copy everything a renderer needs out of `state`
    pub fn capture(state: &GameState, now_ms: f64, up_move_cap: u8) -> Self {
        let shadow_y = state
            .current
            .as_ref()
            .map(|a| physics::shadow_y(&state.board, &a.piece, a.x, a.y));

        Self {
            phase: state.phase,
            mode: state.mode,
            width: state.board.width(),
            height: state.board.height(),
            board: state.board.rows().map(<[Cell]>::to_vec).collect(),
            current: state
                .current
                .as_ref()
                .map(|a| PieceSnapshot::from_active(a, up_move_cap)),
            shadow_y,
            next: state
                .next
                .as_ref()
                .map(|p| PieceSnapshot::from_piece(p, 0, 0, up_move_cap)),
            held: state
                .held
                .as_ref()
                .map(|p| PieceSnapshot::from_piece(p, 0, 0, up_move_cap)),
            can_hold: state.can_hold,
            is_locking: state.is_locking,
            timers: TimersSnapshot {
                lock_ms: state.lock_timer_ms,
                gravity_accumulator_ms: state.gravity_accumulator_ms,
                gravity_delay_ms: state.gravity_delay_ms,
                clear_ms: state.clear_timer_ms,
                countdown_ms: state.countdown_ms,
                elapsed_ms: state.elapsed_ms(now_ms),
            },
            transition: state.transition.map(|t| TransitionSnapshot {
                kind: t.kind,
                progress: t.progress(now_ms),
            }),
            clearing_lines: state.clearing_lines.clone(),
            unlocked: state.unlocked.iter().copied().collect(),
            stats: state.stats,
            score: state.score,
            seed: state.rng.seed(),
        }
    }

    pub fn filled_cells(&self) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count()
    }

    pub fn playable(&self) -> bool {
        self.phase == Phase::Playing && self.current.is_some()
    }
}
