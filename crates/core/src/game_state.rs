//! Game state module - the authoritative record of one session
//!
//! [`GameState`] is plain data. The engine is its only writer; everything
//! else reads it through [`GameSnapshot`](crate::snapshot::GameSnapshot)
//! clones. A fresh state is built for every session and again whenever the
//! game returns to the menu.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::board::Board;
use crate::config::GameConfig;
use crate::physics;
use crate::pieces::Piece;
use crate::rng::RandomSource;
use crate::scoring::ScoreState;
use crate::types::{GameMode, Phase, PieceKind, Rotation, TransitionKind};

/// The falling piece together with its board position
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePiece {
    pub piece: Piece,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    pub fn new(piece: Piece, x: i32, y: i32) -> Self {
        Self { piece, x, y }
    }

    /// Absolute board cells of the piece
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.piece.cells_at(self.x, self.y)
    }

    /// Topmost board row the piece occupies
    pub fn top_row(&self) -> i32 {
        self.y + self.piece.top_offset()
    }

    pub fn fits(&self, board: &Board) -> bool {
        physics::fits(board, &self.piece, self.x, self.y)
    }
}

/// Memo key for the shadow computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowKey {
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
}

impl ShadowKey {
    pub fn of(active: &ActivePiece) -> Self {
        Self {
            kind: active.piece.kind(),
            x: active.x,
            y: active.y,
            rotation: active.piece.rotation(),
        }
    }
}

/// Cached landing row of the active piece.
///
/// Recomputed only when the key changes or the board was mutated since the
/// last computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowCache {
    pub y: i32,
    pub valid: bool,
    pub key: Option<ShadowKey>,
}

impl ShadowCache {
    pub fn resolve(&mut self, board: &Board, active: &ActivePiece) -> i32 {
        let key = ShadowKey::of(active);
        if self.valid && self.key == Some(key) {
            return self.y;
        }
        self.y = physics::shadow_y(board, &active.piece, active.x, active.y);
        self.key = Some(key);
        self.valid = true;
        self.y
    }

    /// Mark the cached row stale (board mutated or piece replaced)
    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// Data carried by a running transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionPayload {
    None,
    /// Mode selected when the session was started
    StartMode(GameMode),
    /// Phase the pause interrupted
    Resume(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionDescriptor {
    pub kind: TransitionKind,
    pub started_at_ms: f64,
    pub duration_ms: f64,
    pub payload: TransitionPayload,
}

impl TransitionDescriptor {
    pub fn new(kind: TransitionKind, started_at_ms: f64, duration_ms: f64) -> Self {
        Self {
            kind,
            started_at_ms,
            duration_ms,
            payload: TransitionPayload::None,
        }
    }

    pub fn with_payload(mut self, payload: TransitionPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Progress in `[0, 1]`; a zero-length transition is always complete
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_at_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Per-session counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    pub pieces_placed: u32,
    pub max_combo: u32,
    pub float_rises: u32,
    pub diagonal_moves: u32,
    pub holds: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: Phase,
    pub mode: GameMode,
    pub board: Board,
    pub rng: RandomSource,

    pub current: Option<ActivePiece>,
    pub shadow: ShadowCache,
    pub next: Option<Piece>,
    pub held: Option<Piece>,
    pub can_hold: bool,

    /// Milliseconds left before the resting piece locks
    pub lock_timer_ms: f64,
    pub is_locking: bool,
    pub gravity_accumulator_ms: f64,
    /// Milliseconds per row at the current speed
    pub gravity_delay_ms: f64,

    /// Rows waiting for removal while the clear plays out
    pub clearing_lines: Vec<usize>,
    pub clear_timer_ms: f64,

    pub stats: Statistics,
    /// Only ever grows during a session
    pub unlocked: BTreeSet<PieceKind>,
    pub last_unlock_threshold: u32,

    pub countdown_ms: f64,
    pub game_over_timer_ms: f64,
    pub transition: Option<TransitionDescriptor>,

    /// Mirror of the scoring collaborator, refreshed after every call
    pub score: ScoreState,

    pub started_at_ms: f64,
    pub ended_at_ms: Option<f64>,
}

impl GameState {
    /// Create a new state in the menu phase for a session seeded with `seed`
    pub fn new(config: &GameConfig, mode: GameMode, seed: u32) -> Self {
        Self {
            phase: Phase::Menu,
            mode,
            board: Board::new(config.board_width, config.board_height),
            rng: RandomSource::new(seed),
            current: None,
            shadow: ShadowCache::default(),
            next: None,
            held: None,
            can_hold: true,
            lock_timer_ms: 0.0,
            is_locking: false,
            gravity_accumulator_ms: 0.0,
            gravity_delay_ms: config.gravity.delay_ms(0.0, 0, 0),
            clearing_lines: Vec::new(),
            clear_timer_ms: 0.0,
            stats: Statistics::default(),
            unlocked: PieceKind::ORDINARY.into_iter().collect(),
            last_unlock_threshold: 0,
            countdown_ms: f64::from(config.countdown_ms),
            game_over_timer_ms: 0.0,
            transition: None,
            score: ScoreState::default(),
            started_at_ms: 0.0,
            ended_at_ms: None,
        }
    }

    /// Shadow row of the active piece, through the memo
    pub fn shadow_y(&mut self) -> Option<i32> {
        let active = self.current.as_ref()?;
        Some(self.shadow.resolve(&self.board, active))
    }

    /// Forget any lock in progress
    pub fn cancel_lock(&mut self) {
        self.lock_timer_ms = 0.0;
        self.is_locking = false;
    }

    /// The piece is resting and fewer than `late_lock_ms` remain
    pub fn in_late_lock(&self, late_lock_ms: f64) -> bool {
        self.is_locking && self.lock_timer_ms < late_lock_ms
    }

    /// Milliseconds of session time at `now_ms`
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        self.ended_at_ms.unwrap_or(now_ms) - self.started_at_ms
    }
}
