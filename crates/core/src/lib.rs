//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains the rules of the game and nothing else. It has no
//! dependency on rendering, input devices or I/O:
//!
//! - **Deterministic**: the same seed and the same calls produce the same game
//! - **Testable**: every rule is a plain function or a plain data structure
//! - **Portable**: runs headless, in tests, or behind any renderer
//!
//! # Module Structure
//!
//! - [`board`]: fixed-size grid with row removal
//! - [`pieces`]: piece definitions, algorithmic rotation, SRS kick tables
//! - [`rng`]: seeded xorshift32 source with weighted choice
//! - [`physics`]: fit test, rotation resolution, shadow, line detection, lock
//! - [`factory`]: draws and builds piece instances
//! - [`config`]: the constants provider
//! - [`scoring`]: the scoring collaborator trait and the standard rules
//! - [`game_state`]: the authoritative session record
//! - [`snapshot`]: owned read-only copies for renderers
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use driftblocks_core::{physics, GameConfig, PieceFactory, RandomSource};
//! use driftblocks_core::types::PieceKind;
//!
//! let config = GameConfig::default();
//! let factory = PieceFactory::new(config.catalog().unwrap(), 0.0, 1.0);
//! let mut rng = RandomSource::new(12345);
//! let unlocked: BTreeSet<_> = PieceKind::ORDINARY.into_iter().collect();
//!
//! let piece = factory.generate(&unlocked, &mut rng).unwrap();
//! let board = driftblocks_core::Board::new(10, 20);
//! let (x, y) = piece.definition().spawn_position(board.width());
//! assert!(physics::fits(&board, &piece, x, y));
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod factory;
pub mod game_state;
pub mod physics;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use driftblocks_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::{GameConfig, GravityConfig, TransitionDurations, UnlockThreshold};
pub use error::{ConfigError, PieceError, ScoringError};
pub use factory::PieceFactory;
pub use game_state::{
    ActivePiece, GameState, ShadowCache, Statistics, TransitionDescriptor, TransitionPayload,
};
pub use pieces::{Piece, PieceCatalog, PieceDefinition};
pub use rng::{next_session_seed, RandomSource};
pub use scoring::{
    LineClearOutcome, PerformanceMetrics, ScoreProof, ScoreState, Scoring, StandardScoring,
};
pub use snapshot::{GameSnapshot, PieceSnapshot};
