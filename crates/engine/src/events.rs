//! Engine events - fire-and-forget notifications for hosts
//!
//! The engine appends events as it runs and the host drains them after each
//! call. Nothing in the engine waits on an event being consumed.

use serde::Serialize;

use driftblocks_core::types::{Phase, PieceKind, Rotation};
use driftblocks_core::{PerformanceMetrics, ScoreProof};

/// Final numbers handed to the host when a session ends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOverSummary {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub elapsed_ms: u64,
    pub new_high_score: bool,
    pub metrics: PerformanceMetrics,
    /// Absent when the scoring collaborator could not produce one
    pub proof: Option<ScoreProof>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    PhaseChanged { from: Phase, to: Phase },
    Spawned { kind: PieceKind },
    Moved { dx: i8, dy: i8 },
    Rotated { rotation: Rotation, kick: (i8, i8) },
    RotateFailed,
    /// A float piece moved up one row
    Rose { up_moves_used: u8 },
    /// The piece came to rest and its lock timer started
    Landed { lock_delay_ms: f64 },
    HardDropped { cells: u32 },
    Locked { kind: PieceKind },
    ClearStarted { rows: Vec<usize> },
    LinesCleared {
        count: usize,
        points: u32,
        message: Option<String>,
    },
    Held { kind: PieceKind },
    Paused,
    Resumed,
    LevelUp { level: u32 },
    Unlocked { kind: PieceKind, score: u32 },
    GameOver(GameOverSummary),
    CollaboratorFailed {
        collaborator: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_tagged() {
        let json = serde_json::to_value(EngineEvent::LinesCleared {
            count: 2,
            points: 100,
            message: Some("Double".to_string()),
        })
        .unwrap();
        assert_eq!(json["type"], "linesCleared");
        assert_eq!(json["count"], 2);

        let json = serde_json::to_value(EngineEvent::GameOver(GameOverSummary {
            score: 10,
            level: 0,
            lines: 0,
            elapsed_ms: 5,
            new_high_score: true,
            metrics: PerformanceMetrics {
                inputs: 6,
                pieces: 3,
                inputs_per_piece: 2.0,
            },
            proof: None,
        }))
        .unwrap();
        assert_eq!(json["type"], "gameOver");
        assert_eq!(json["new_high_score"], true);
        assert_eq!(json["metrics"]["inputs_per_piece"], 2.0);
    }
}
