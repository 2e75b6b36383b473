use thiserror::Error;

use driftblocks_core::{ConfigError, PieceError};

/// Fatal engine failures; anything else is handled inside the tick
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("piece creation failed: {0}")]
    Piece(#[from] PieceError),
}

/// Failures reported by a progress store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("progress store unavailable: {0}")]
    Unavailable(String),

    #[error("progress store rejected write: {0}")]
    Rejected(String),
}
