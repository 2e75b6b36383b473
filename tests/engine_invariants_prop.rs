//! Property tests for engine invariants.
//!
//! Invariants covered:
//! - The active piece never overlaps a filled cell and never leaves the columns.
//! - The board keeps its configured dimensions.
//! - Float pieces never exceed their rise budget.
//! - Two engines fed the same seed and the same actions stay identical.
//! - The unlocked set only grows within a session.

use proptest::prelude::*;

use driftblocks::core::GameConfig;
use driftblocks::engine::SimulationEngine;
use driftblocks::types::{Action, GameMode, Phase};

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::MOVE_LEFT),
        Just(Action::MOVE_RIGHT),
        Just(Action::SOFT_DROP),
        Just(Action::ROTATE_CW),
        Just(Action::ROTATE_CCW),
        Just(Action::HardDrop),
        Just(Action::Hold),
        Just(Action::UpPressed),
        Just(Action::Pause),
    ]
}

/// One host frame: an optional action followed by a tick
fn frame_strategy() -> impl Strategy<Value = (Option<Action>, f64)> {
    (
        prop::option::weighted(0.6, action_strategy()),
        prop_oneof![Just(16.0), 1.0f64..100.0],
    )
}

fn started(seed: u32, mode: GameMode, config: GameConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::with_seed(config, seed).unwrap();
    engine.start_game(mode).unwrap();
    engine
}

fn assert_no_overlap(engine: &SimulationEngine) {
    let state = engine.state();
    if let Some(active) = state.current.as_ref() {
        for (x, y) in active.cells() {
            assert!(state.board.contains_column(x), "column {} out of range", x);
            assert!(y < i32::from(state.board.height()), "row {} below floor", y);
            assert!(
                !state.board.is_occupied(x, y),
                "active cell ({}, {}) overlaps the board",
                x,
                y
            );
        }
        assert!(active.piece.up_moves_used <= engine.config().float_up_move_cap);
    }
}

#[test]
fn test_countdown_scale_shortens_countdown() {
    let mut config = GameConfig::default();
    config.countdown_time_scale = 2.0;
    let mut fast = started(1, GameMode::Evolving, config);
    let mut normal = started(1, GameMode::Evolving, GameConfig::default());

    let ticks = |engine: &mut SimulationEngine| {
        let mut n = 0;
        while engine.phase() != Phase::Playing {
            engine.tick(16.0).unwrap();
            n += 1;
        }
        n
    };
    assert!(ticks(&mut fast) < ticks(&mut normal));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_rollout_respects_core_invariants(
        seed in any::<u32>(),
        classic in any::<bool>(),
        frames in prop::collection::vec(frame_strategy(), 300..900),
    ) {
        let mode = if classic { GameMode::Classic } else { GameMode::Evolving };
        let mut config = GameConfig::default();
        // Keep sessions short enough to reach play and unlocks quickly.
        config.countdown_ms = 100;
        config.unlocks.iter_mut().for_each(|u| u.score /= 20);
        let mut engine = started(seed, mode, config);
        let mut unlocked = engine.state().unlocked.clone();

        for (action, delta) in frames {
            if let Some(action) = action {
                engine.handle_input(action).unwrap();
            }
            engine.tick(delta).unwrap();

            assert_no_overlap(&engine);
            let state = engine.state();
            prop_assert_eq!(state.board.width(), 10);
            prop_assert_eq!(state.board.height(), 20);
            prop_assert_eq!(state.board.cells().len(), 200);
            prop_assert!(state.unlocked.is_superset(&unlocked));
            if classic {
                prop_assert!(state.unlocked.iter().all(|k| !k.is_special()));
            }
            unlocked = state.unlocked.clone();

            if engine.phase() == Phase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn same_seed_and_actions_give_same_snapshots(
        seed in any::<u32>(),
        frames in prop::collection::vec(frame_strategy(), 100..400),
    ) {
        let mut config = GameConfig::default();
        config.countdown_ms = 100;
        let mut a = started(seed, GameMode::Evolving, config.clone());
        let mut b = started(seed, GameMode::Evolving, config);

        for (action, delta) in frames {
            if let Some(action) = action {
                let ra = a.handle_input(action).unwrap();
                let rb = b.handle_input(action).unwrap();
                prop_assert_eq!(ra, rb);
            }
            a.tick(delta).unwrap();
            b.tick(delta).unwrap();
            prop_assert_eq!(a.snapshot(), b.snapshot());
        }
        prop_assert_eq!(a.drain_events(), b.drain_events());
    }
}
