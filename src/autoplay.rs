//! Greedy autoplayer.
//!
//! Scores every reachable rotation and column for the active piece on a copy
//! of the board, then drives the engine there with ordinary actions.

use thiserror::Error;

use crate::core::scoring::Scoring;
use crate::core::{physics, Board, Piece};
use crate::engine::{EngineError, InputOutcome, ProgressStore, SimulationEngine};
use crate::types::{Action, Phase, Rotation};

const ROTATIONS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

// Feature weights for the board evaluation.
const LINE_WEIGHT: f64 = 0.76;
const HEIGHT_WEIGHT: f64 = -0.51;
const HOLE_WEIGHT: f64 = -0.36;
const BUMPINESS_WEIGHT: f64 = -0.18;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rotation: Rotation,
    pub x: i32,
    /// Row the piece comes to rest on
    pub y: i32,
    pub score: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaceError {
    #[error("game is not playable")]
    NotPlayable,

    #[error("no active piece")]
    NoActive,

    #[error("could not rotate to target rotation")]
    RotationBlocked,

    #[error("could not move to target x due to collision")]
    XBlocked,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Height of every column, counted from the floor
pub fn column_heights(board: &Board) -> Vec<u32> {
    let height = i32::from(board.height());
    (0..i32::from(board.width()))
        .map(|x| {
            (0..height)
                .find(|&y| board.is_occupied(x, y))
                .map_or(0, |top| (height - top) as u32)
        })
        .collect()
}

/// Empty cells with at least one filled cell above them
pub fn hole_count(board: &Board) -> u32 {
    let mut holes = 0;
    for x in 0..i32::from(board.width()) {
        let mut covered = false;
        for y in 0..i32::from(board.height()) {
            if board.is_occupied(x, y) {
                covered = true;
            } else if covered {
                holes += 1;
            }
        }
    }
    holes
}

/// Evaluate a board that just had `lines` rows removed
pub fn evaluate(board: &Board, lines: usize) -> f64 {
    let heights = column_heights(board);
    let aggregate: u32 = heights.iter().sum();
    let bumpiness: u32 = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();

    LINE_WEIGHT * lines as f64
        + HEIGHT_WEIGHT * f64::from(aggregate)
        + HOLE_WEIGHT * f64::from(hole_count(board))
        + BUMPINESS_WEIGHT * f64::from(bumpiness)
}

/// Best resting place for `piece` entering at row `y`.
///
/// Only columns where the rotated piece fits at `y` are considered, and
/// placements that would top out are skipped.
pub fn best_placement(board: &Board, piece: &Piece, y: i32) -> Option<Placement> {
    let size = i32::from(piece.definition().size);
    let mut best: Option<Placement> = None;

    for rotation in ROTATIONS {
        let mut candidate = piece.clone();
        candidate.set_rotation(rotation);

        for x in -size..i32::from(board.width()) {
            if !physics::fits(board, &candidate, x, y) {
                continue;
            }
            let rest = physics::shadow_y(board, &candidate, x, y);
            if physics::is_above_board(&candidate, rest) {
                continue;
            }

            let mut simulated = board.clone();
            physics::lock(&mut simulated, &candidate, x, rest);
            let full = physics::find_full_lines(&simulated);
            let lines = physics::remove_lines(&mut simulated, &full);
            let score = evaluate(&simulated, lines);

            if best.map_or(true, |b| score > b.score) {
                best = Some(Placement {
                    rotation,
                    x,
                    y: rest,
                    score,
                });
            }
        }
    }
    best
}

/// Steer the active piece to `placement` and hard drop it
pub fn apply_place<S: Scoring, P: ProgressStore>(
    engine: &mut SimulationEngine<S, P>,
    placement: &Placement,
) -> Result<(), PlaceError> {
    if engine.phase() != Phase::Playing {
        return Err(PlaceError::NotPlayable);
    }

    for _ in 0..ROTATIONS.len() {
        let Some(active) = engine.state().current.as_ref() else {
            return Err(PlaceError::NoActive);
        };
        if active.piece.rotation() == placement.rotation {
            break;
        }
        if engine.handle_input(Action::ROTATE_CW)? != InputOutcome::Applied {
            return Err(PlaceError::RotationBlocked);
        }
    }

    let Some(active) = engine.state().current.as_ref() else {
        return Err(PlaceError::NoActive);
    };
    if active.piece.rotation() != placement.rotation {
        return Err(PlaceError::RotationBlocked);
    }

    let dx = placement.x - active.x;
    let step = if dx < 0 {
        Action::MOVE_LEFT
    } else {
        Action::MOVE_RIGHT
    };
    for _ in 0..dx.unsigned_abs() {
        if engine.handle_input(step)? != InputOutcome::Applied {
            return Err(PlaceError::XBlocked);
        }
    }

    engine.handle_input(Action::HardDrop)?;
    Ok(())
}

/// Plays one placement every `interval_ticks` ticks while the engine is in play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autoplayer {
    interval_ticks: u32,
    wait: u32,
    placed: u32,
    fallbacks: u32,
}

impl Autoplayer {
    pub fn new(interval_ticks: u32) -> Self {
        Self {
            interval_ticks,
            wait: interval_ticks,
            placed: 0,
            fallbacks: 0,
        }
    }

    /// Pieces placed by plan
    pub fn placed(&self) -> u32 {
        self.placed
    }

    /// Pieces dropped where they were because the plan could not be followed
    pub fn fallbacks(&self) -> u32 {
        self.fallbacks
    }

    /// Call once after every engine tick
    pub fn step<S: Scoring, P: ProgressStore>(
        &mut self,
        engine: &mut SimulationEngine<S, P>,
    ) -> Result<(), EngineError> {
        if engine.phase() != Phase::Playing || engine.state().current.is_none() {
            return Ok(());
        }
        if self.wait > 0 {
            self.wait -= 1;
            return Ok(());
        }
        self.wait = self.interval_ticks;

        let plan = engine
            .state()
            .current
            .as_ref()
            .and_then(|active| best_placement(&engine.state().board, &active.piece, active.y));

        let outcome = match plan {
            Some(placement) => apply_place(engine, &placement),
            None => Err(PlaceError::NoActive),
        };
        match outcome {
            Ok(()) => self.placed += 1,
            Err(PlaceError::Engine(err)) => return Err(err),
            Err(err) => {
                log::debug!("autoplay fallback: {}", err);
                self.fallbacks += 1;
                engine.handle_input(Action::HardDrop)?;
            }
        }
        Ok(())
    }
}
