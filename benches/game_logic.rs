use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use driftblocks::autoplay::best_placement;
use driftblocks::core::{physics, Board, GameConfig, PieceFactory, RandomSource};
use driftblocks::engine::SimulationEngine;
use driftblocks::types::{Action, Color, GameMode, Phase, PieceKind};

fn playing_engine() -> SimulationEngine {
    let mut engine = SimulationEngine::with_seed(GameConfig::default(), 12345).unwrap();
    engine.start_game(GameMode::Evolving).unwrap();
    while engine.phase() != Phase::Playing {
        engine.tick(16.0).unwrap();
    }
    engine
}

fn bench_tick(c: &mut Criterion) {
    let mut engine = playing_engine();

    c.bench_function("engine_tick_16ms", |b| {
        b.iter(|| {
            engine.tick(black_box(16.0)).unwrap();
            if engine.phase() == Phase::GameOver {
                engine = playing_engine();
            }
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new(10, 20);
            // Fill bottom 4 rows
            for y in 16..20 {
                for x in 0..10 {
                    board.set(x, y, Some(Color(0x00f0f0)));
                }
            }
            let full = physics::find_full_lines(&board);
            physics::remove_lines(&mut board, &full);
        })
    });
}

fn bench_piece_generate(c: &mut Criterion) {
    let config = GameConfig::default();
    let factory = PieceFactory::new(config.catalog().unwrap(), 0.08, 0.5);
    let unlocked: BTreeSet<_> = PieceKind::ALL.into_iter().collect();
    let mut rng = RandomSource::new(12345);

    c.bench_function("generate_piece", |b| {
        b.iter(|| factory.generate(black_box(&unlocked), &mut rng).unwrap())
    });
}

fn bench_move(c: &mut Criterion) {
    let mut engine = playing_engine();

    c.bench_function("move_piece", |b| {
        b.iter(|| {
            engine.handle_input(Action::MOVE_RIGHT).unwrap();
            engine.handle_input(Action::MOVE_LEFT).unwrap();
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut engine = playing_engine();

    c.bench_function("rotate_piece", |b| {
        b.iter(|| {
            engine.handle_input(Action::ROTATE_CW).unwrap();
        })
    });
}

fn bench_best_placement(c: &mut Criterion) {
    let engine = playing_engine();
    let Some(active) = engine.state().current.as_ref() else {
        return;
    };

    c.bench_function("best_placement", |b| {
        b.iter(|| best_placement(&engine.state().board, &active.piece, active.y))
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_piece_generate,
    bench_move,
    bench_rotate,
    bench_best_placement
);
criterion_main!(benches);
