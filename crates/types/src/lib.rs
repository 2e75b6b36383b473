//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the simulation.
//! Everything here is plain data: piece kinds, rotations, player actions,
//! engine phases and the board cell representation. The core and engine
//! crates build on these, and hosts (renderers, input mappers) consume them.
//!
//! # Coordinates
//!
//! - `x` grows to the right, starting at column 0
//! - `y` grows downward, starting at row 0 (top of the visible board)
//! - `y < 0` is above the visible board (spawn area, top-out checks)
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds of simulation time:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Nominal host tick interval (~60 FPS) |
//! | `INPUT_BUFFER_WINDOW_MS` | 100 | Max age of a buffered action at replay |
//! | `LATE_LOCK_MS` | 150 | Lock time remaining below which input is buffered |
//!
//! # Examples
//!
//! ```
//! use driftblocks_types::{Action, MoveDirection, PieceKind, Rotation, RotationDirection};
//!
//! let piece = PieceKind::from_str("float").unwrap();
//! assert_eq!(piece, PieceKind::Float);
//! assert!(piece.is_special());
//!
//! assert_eq!(Rotation::North.rotate(RotationDirection::Clockwise), Rotation::East);
//!
//! let action = Action::from_str("moveLeft").unwrap();
//! assert_eq!(action, Action::Move { direction: MoveDirection::Left });
//! assert!(action.is_bufferable());
//! ```

use serde::{Deserialize, Serialize};

/// Conventional board width in cells
pub const BOARD_WIDTH: u8 = 10;

/// Conventional board height in cells
pub const BOARD_HEIGHT: u8 = 20;

/// Nominal host tick interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// How long a buffered action stays eligible for replay
pub const INPUT_BUFFER_WINDOW_MS: u32 = 100;

/// Lock time remaining below which playable input is buffered instead of applied
pub const LATE_LOCK_MS: u32 = 150;

/// Exclusive upper bound of a piece's cosmetic variant
pub const VARIANT_COUNT: u32 = 100;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 0, Index 8 = Level 8+
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Piece kinds
///
/// The seven ordinary tetrominoes plus three "special" pieces that are
/// unlocked during play:
/// - **Float**: horizontal domino that can rise and slide diagonally
/// - **Plus**: five-cell cross
/// - **U**: five-cell cup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    Float,
    Plus,
    U,
}

impl PieceKind {
    /// Every kind, ordinary first
    pub const ALL: [PieceKind; 10] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::Float,
        PieceKind::Plus,
        PieceKind::U,
    ];

    /// The seven tetrominoes available from the first piece
    pub const ORDINARY: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use driftblocks_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("PLUS"), Some(PieceKind::Plus));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "float" => Some(PieceKind::Float),
            "plus" => Some(PieceKind::Plus),
            "u" => Some(PieceKind::U),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::Float => "float",
            PieceKind::Plus => "plus",
            PieceKind::U => "u",
        }
    }

    /// Whether this kind belongs to the unlockable "special" family
    pub fn is_special(&self) -> bool {
        matches!(self, PieceKind::Float | PieceKind::Plus | PieceKind::U)
    }
}

/// Rotation states
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use driftblocks_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    pub fn rotate(&self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => self.rotate_cw(),
            RotationDirection::CounterClockwise => self.rotate_ccw(),
        }
    }

    /// Number of clockwise quarter turns from North (0..=3)
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// `+1` for clockwise, `-1` for counter-clockwise
    pub fn from_sign(sign: i8) -> Self {
        if sign < 0 {
            RotationDirection::CounterClockwise
        } else {
            RotationDirection::Clockwise
        }
    }
}

/// Session rules selected at game start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Special pieces unlock as the score crosses configured thresholds
    #[default]
    Evolving,
    /// Ordinary tetrominoes only
    Classic,
}

/// One-cell shift of the active piece. There is no upward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveDirection {
    Left,
    Right,
    /// Soft drop
    Down,
}

impl MoveDirection {
    /// Cell offset `(dx, dy)` with `y` growing downward
    pub fn delta(&self) -> (i8, i8) {
        match self {
            MoveDirection::Left => (-1, 0),
            MoveDirection::Right => (1, 0),
            MoveDirection::Down => (0, 1),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        !matches!(self, MoveDirection::Down)
    }
}

/// Player actions accepted by the engine
///
/// Each variant carries only the payload it needs. Which actions are
/// meaningful depends on the current [`Phase`]; the rest are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Shift the active piece one cell
    Move { direction: MoveDirection },
    Rotate { direction: RotationDirection },
    /// Instantly drop piece to its shadow and lock it
    HardDrop,
    /// Swap the active piece with the hold slot (once per spawned piece)
    Hold,
    /// Toggle pause
    Pause,
    /// Rise for the float piece, rotate clockwise for everything else
    UpPressed,
    StartGame { mode: GameMode },
    ReturnToMenu,
}

impl Action {
    pub const MOVE_LEFT: Action = Action::Move {
        direction: MoveDirection::Left,
    };
    pub const MOVE_RIGHT: Action = Action::Move {
        direction: MoveDirection::Right,
    };
    pub const SOFT_DROP: Action = Action::Move {
        direction: MoveDirection::Down,
    };
    pub const ROTATE_CW: Action = Action::Rotate {
        direction: RotationDirection::Clockwise,
    };
    pub const ROTATE_CCW: Action = Action::Rotate {
        direction: RotationDirection::CounterClockwise,
    };

    /// Actions that are held for replay when they arrive during a
    /// non-interactive sub-state instead of being dropped
    pub fn is_bufferable(&self) -> bool {
        matches!(
            self,
            Action::Move { .. }
                | Action::Rotate { .. }
                | Action::HardDrop
                | Action::Hold
                | Action::UpPressed
        )
    }

    /// Parse action from string (for scripted input)
    ///
    /// # Examples
    ///
    /// ```
    /// use driftblocks_types::Action;
    ///
    /// assert_eq!(Action::from_str("rotateCw"), Some(Action::ROTATE_CW));
    /// assert_eq!(Action::from_str("hardDrop"), Some(Action::HardDrop));
    /// assert_eq!(Action::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Action::MOVE_LEFT),
            "moveright" => Some(Action::MOVE_RIGHT),
            "softdrop" => Some(Action::SOFT_DROP),
            "harddrop" => Some(Action::HardDrop),
            "rotatecw" => Some(Action::ROTATE_CW),
            "rotateccw" => Some(Action::ROTATE_CCW),
            "up" => Some(Action::UpPressed),
            "hold" => Some(Action::Hold),
            "pause" => Some(Action::Pause),
            "start" => Some(Action::StartGame {
                mode: GameMode::Evolving,
            }),
            "menu" => Some(Action::ReturnToMenu),
            _ => None,
        }
    }
}

/// Time-boxed presentational handoffs between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionKind {
    MenuToCountdown,
    CountdownToPlaying,
    PlayingToPause,
    PauseToPlaying,
    GameOverToMenu,
}

impl TransitionKind {
    /// The phase that holds this transition while it runs
    pub fn phase(&self) -> Phase {
        match self {
            TransitionKind::MenuToCountdown => Phase::MenuToCountdown,
            TransitionKind::CountdownToPlaying => Phase::CountdownToPlaying,
            TransitionKind::PlayingToPause => Phase::PlayingToPause,
            TransitionKind::PauseToPlaying => Phase::PauseToPlaying,
            TransitionKind::GameOverToMenu => Phase::GameOverToMenu,
        }
    }

    /// The phase committed once progress reaches 1
    pub fn target(&self) -> Phase {
        match self {
            TransitionKind::MenuToCountdown => Phase::Countdown,
            TransitionKind::CountdownToPlaying => Phase::Playing,
            TransitionKind::PlayingToPause => Phase::Paused,
            TransitionKind::PauseToPlaying => Phase::Playing,
            TransitionKind::GameOverToMenu => Phase::Menu,
        }
    }
}

/// Engine phases
///
/// Locking is not a phase of its own; it is a sub-state of `Playing`
/// tracked by the lock timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Menu,
    MenuToCountdown,
    Countdown,
    CountdownToPlaying,
    Playing,
    Clearing,
    PlayingToPause,
    Paused,
    PauseToPlaying,
    GameOverSequence,
    GameOver,
    GameOverToMenu,
}

impl Phase {
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Phase::MenuToCountdown
                | Phase::CountdownToPlaying
                | Phase::PlayingToPause
                | Phase::PauseToPlaying
                | Phase::GameOverToMenu
        )
    }

    /// Phases during which bufferable actions are held rather than applied
    pub fn buffers_input(&self) -> bool {
        matches!(
            self,
            Phase::Clearing
                | Phase::Countdown
                | Phase::MenuToCountdown
                | Phase::CountdownToPlaying
        )
    }
}

/// Opaque color token carried by pieces and board cells (`0xRRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Scale each channel by `factor` (clamped to `0.0..=1.0`)
    ///
    /// # Examples
    ///
    /// ```
    /// use driftblocks_types::Color;
    ///
    /// assert_eq!(Color(0xff8040).scaled(0.5), Color(0x7f4020));
    /// ```
    pub fn scaled(self, factor: f32) -> Color {
        let f = factor.clamp(0.0, 1.0);
        let channel = |shift: u32| -> u32 {
            let c = ((self.0 >> shift) & 0xff) as f32;
            ((c * f) as u32).min(0xff) << shift
        };
        Color(channel(16) | channel(8) | channel(0))
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Color)`: Cell filled by a locked piece
pub type Cell = Option<Color>;
