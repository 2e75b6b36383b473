use thiserror::Error;

use crate::types::PieceKind;

/// Failures building a piece instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PieceError {
    #[error("no definition registered for piece kind '{}'", .0.as_str())]
    UnknownPiece(PieceKind),

    #[error("unknown piece name: {0}")]
    UnknownName(String),

    #[error("no piece kinds are available to draw from")]
    NothingUnlocked,
}

/// Rejected configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidBoard { width: u8, height: u8 },

    #[error("missing definition for piece kind '{}'", .0.as_str())]
    MissingDefinition(PieceKind),

    #[error("duplicate definition for piece kind '{}'", .0.as_str())]
    DuplicateDefinition(PieceKind),

    #[error("invalid shape for piece kind '{}': {reason}", .kind.as_str())]
    InvalidShape { kind: PieceKind, reason: String },

    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("gravity table must not be empty")]
    EmptyGravityTable,
}

/// Failures inside the scoring collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("no scoring session has been started")]
    NoSession,

    #[error("score proof unavailable: {0}")]
    ProofUnavailable(String),
}
