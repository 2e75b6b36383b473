//! Board and physics tests

use std::sync::Arc;

use driftblocks::core::pieces::standard_definitions;
use driftblocks::core::{physics, Board, Piece};
use driftblocks::types::{Color, PieceKind, Rotation, RotationDirection, BOARD_HEIGHT, BOARD_WIDTH};

const RED: Option<Color> = Some(Color(0xf00000));

fn piece(kind: PieceKind) -> Piece {
    let def = standard_definitions()
        .into_iter()
        .find(|d| d.kind == kind)
        .unwrap();
    Piece::new(Arc::new(def), 0)
}

#[test]
fn test_board_new_empty() {
    let board = Board::new(BOARD_WIDTH, BOARD_HEIGHT);
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);

    // All cells should be empty
    for y in 0..i32::from(BOARD_HEIGHT) {
        for x in 0..i32::from(BOARD_WIDTH) {
            assert!(board.is_valid(x, y), "Cell ({}, {}) should be valid", x, y);
            assert_eq!(board.get(x, y), Some(None));
        }
    }
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new(10, 20);

    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(10, 0), None);
    assert_eq!(board.get(0, 20), None);
}

#[test]
fn test_board_set_and_clear() {
    let mut board = Board::new(10, 20);

    assert!(board.set(5, 10, RED));
    assert_eq!(board.get(5, 10), Some(RED));
    assert!(!board.is_valid(5, 10));

    assert!(board.set(5, 10, None));
    assert!(board.is_valid(5, 10));
    assert!(!board.set(-1, 0, RED));
    assert!(!board.set(0, 20, RED));
}

#[test]
fn test_board_custom_dimensions() {
    let board = Board::new(6, 12);
    assert_eq!(board.cells().len(), 72);
    assert_eq!(board.rows().count(), 12);
    assert!(board.rows().all(|row| row.len() == 6));
}

#[test]
fn test_remove_rows_keeps_dimensions() {
    let mut board = Board::new(10, 20);
    for y in [17, 19] {
        for x in 0..10 {
            board.set(x, y, RED);
        }
    }
    board.set(3, 18, RED);
    board.set(7, 16, RED);

    let full = physics::find_full_lines(&board);
    assert_eq!(full, vec![17, 19]);
    assert_eq!(physics::remove_lines(&mut board, &full), 2);

    assert_eq!(board.rows().count(), 20);
    assert_eq!(board.filled_count(), 2);
    assert!(board.is_occupied(3, 19));
    assert!(board.is_occupied(7, 18));
    assert!(board.row(0).iter().all(|c| c.is_none()));
}

#[test]
fn test_fits_allows_rows_above_board_only() {
    let board = Board::new(10, 20);
    let t = piece(PieceKind::T);

    assert!(physics::fits(&board, &t, 3, -1));
    assert!(!physics::fits(&board, &t, -1, -1));
    assert!(!physics::fits(&board, &t, 8, 5));
    assert!(!physics::fits(&board, &t, 3, 19));
}

#[test]
fn test_shadow_lands_on_stack() {
    let mut board = Board::new(10, 20);
    let o = piece(PieceKind::O);
    assert_eq!(physics::shadow_y(&board, &o, 4, 0), 18);

    board.set(4, 12, RED);
    assert_eq!(physics::shadow_y(&board, &o, 4, 0), 10);
    assert_eq!(physics::shadow_y(&board, &o, 6, 0), 18);
}

#[test]
fn test_rotation_kicks_off_wall() {
    let board = Board::new(10, 20);
    let mut t = piece(PieceKind::T);
    t.set_rotation(Rotation::East);

    // Pointing east against the left wall, the west-facing column is out of bounds.
    let result = physics::resolve_rotation(&board, &t, -1, 5, RotationDirection::Clockwise)
        .expect("kick should find room");
    assert_eq!(result.rotation, Rotation::South);
    assert_ne!(result.kick, (0, 0));
    assert!(physics::fits(&board, &piece_at(&t, result.rotation), result.x, result.y));
}

fn piece_at(base: &Piece, rotation: Rotation) -> Piece {
    let mut p = base.clone();
    p.set_rotation(rotation);
    p
}

#[test]
fn test_lock_skips_cells_above_board() {
    let mut board = Board::new(10, 20);
    let o = piece(PieceKind::O);

    assert!(physics::is_above_board(&o, -1));
    assert_eq!(physics::lock(&mut board, &o, 4, -1), 2);
    assert!(board.is_occupied(4, 0));
    assert!(board.is_occupied(5, 0));
    assert_eq!(board.filled_count(), 2);
    assert!(!physics::is_above_board(&o, 0));
}
