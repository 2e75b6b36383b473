//! Driftblocks (workspace facade crate).
//!
//! Re-exports the member crates under `driftblocks::{types,core,engine}` and
//! adds the headless pieces used by the binary: a greedy autoplayer and a
//! seeded session runner.

pub mod autoplay;
pub mod run;

pub use driftblocks_core as core;
pub use driftblocks_engine as engine;
pub use driftblocks_types as types;
