//! Game engine - phase machine, input buffering and collaborator wiring
//!
//! [`SimulationEngine`] owns one session record from the core crate and moves
//! it through menu, countdown, play, clearing, pause and game over. Hosts feed
//! it actions and frame deltas; it answers with snapshots and events.
//!
//! # Module Structure
//!
//! - [`engine`]: the engine itself
//! - [`input_buffer`]: single-slot buffer for actions that arrive too early
//! - [`events`]: notifications drained by the host
//! - [`ports`]: the progress store the engine reports finished sessions to
//! - [`error`]: fatal engine errors and store errors

pub mod engine;
pub mod error;
pub mod events;
pub mod input_buffer;
pub mod ports;

pub use driftblocks_types as types;

pub use engine::{clear_speed, InputOutcome, SimulationEngine};
pub use error::{EngineError, StoreError};
pub use events::{EngineEvent, GameOverSummary};
pub use input_buffer::{BufferedInput, InputBuffer};
pub use ports::{LifetimeStats, MemoryStore, ProgressStore, SessionRecord};
