//! Collision resolver - pure functions over a board and a piece
//!
//! Nothing here mutates state except [`lock`] and [`remove_lines`], and
//! neither of those decides anything about top-out or scoring; that is left
//! to the engine.
//!
//! A cell above row 0 never collides with the board, but it must still sit
//! inside the board's columns.

use crate::board::Board;
use crate::pieces::{kick_offsets, MinoOffset, Piece};
use crate::types::{Rotation, RotationDirection};

/// Outcome of a successful rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationResult {
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    /// Offset from the kick table that made the rotation fit
    pub kick: (i8, i8),
}

/// Fit test for a raw shape with its origin at (x, y)
pub fn fits_shape(board: &Board, shape: &[MinoOffset], x: i32, y: i32) -> bool {
    shape.iter().all(|&(dx, dy)| {
        let px = x + i32::from(dx);
        let py = y + i32::from(dy);
        if !board.contains_column(px) || py >= i32::from(board.height()) {
            return false;
        }
        py < 0 || board.is_valid(px, py)
    })
}

/// Fit test for a piece in its current orientation
pub fn fits(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    fits_shape(board, piece.shape(), x, y)
}

/// Whether the piece could move one row further down from (x, y)
pub fn has_room_below(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    fits(board, piece, x, y + 1)
}

/// Try to rotate the piece, falling back to the kick table.
///
/// Returns the first placement that fits, or `None` if every offset is
/// blocked. The piece itself is never modified.
pub fn resolve_rotation(
    board: &Board,
    piece: &Piece,
    x: i32,
    y: i32,
    direction: RotationDirection,
) -> Option<RotationResult> {
    let rotation = piece.rotation().rotate(direction);
    let shape = piece.definition().shape(rotation);

    kick_offsets(piece.kind(), piece.rotation(), direction)
        .iter()
        .map(|&(dx, dy)| (dx, dy, x + i32::from(dx), y + i32::from(dy)))
        .find(|&(_, _, kx, ky)| fits_shape(board, &shape, kx, ky))
        .map(|(dx, dy, kx, ky)| RotationResult {
            rotation,
            x: kx,
            y: ky,
            kick: (dx, dy),
        })
}

/// Lowest row the piece reaches falling straight down from (x, y).
///
/// This is both the hard-drop destination and the resting row that starts
/// the lock timer. If the piece does not fit where it is, `y` is returned.
pub fn shadow_y(board: &Board, piece: &Piece, x: i32, y: i32) -> i32 {
    if !fits(board, piece, x, y) {
        return y;
    }
    let mut landing = y;
    while fits(board, piece, x, landing + 1) {
        landing += 1;
    }
    landing
}

/// Indices of completely filled rows, top to bottom
pub fn find_full_lines(board: &Board) -> Vec<usize> {
    (0..board.height() as usize)
        .filter(|&y| board.is_row_full(y))
        .collect()
}

/// Delete the given rows, shifting everything above them down and padding
/// empty rows at the top. Returns the number of rows removed.
pub fn remove_lines(board: &mut Board, lines: &[usize]) -> usize {
    board.remove_rows(lines)
}

/// Copy the piece's cells, with its color, into the board.
///
/// Cells above row 0 have no storage and are skipped. Returns the number of
/// cells written.
pub fn lock(board: &mut Board, piece: &Piece, x: i32, y: i32) -> usize {
    let color = Some(piece.color());
    piece
        .cells_at(x, y)
        .filter(|&(px, py)| board.set(px, py, color))
        .count()
}

/// Whether any cell of the piece at row `y` lies above the visible board
pub fn is_above_board(piece: &Piece, y: i32) -> bool {
    y + piece.top_offset() < 0
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pieces::standard_definitions;
    use crate::types::{Color, PieceKind};

    fn piece(kind: PieceKind) -> Piece {
        let def = standard_definitions()
            .into_iter()
            .find(|d| d.kind == kind)
            .unwrap();
        Piece::new(Arc::new(def), 0)
    }

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..i32::from(board.width()) {
            board.set(x, y, Some(Color(1)));
        }
    }

    #[test]
    fn test_fits_empty_board_and_walls() {
        let board = Board::new(10, 20);
        let o = piece(PieceKind::O);
        assert!(fits(&board, &o, 0, 0));
        assert!(fits(&board, &o, 8, 18));
        assert!(!fits(&board, &o, 9, 0));
        assert!(!fits(&board, &o, -1, 0));
        assert!(!fits(&board, &o, 0, 19));
    }

    #[test]
    fn test_fits_above_board_ignores_rows_not_columns() {
        let board = Board::new(10, 20);
        let o = piece(PieceKind::O);
        assert!(fits(&board, &o, 4, -5));
        assert!(!fits(&board, &o, -1, -5));
    }

    #[test]
    fn test_fits_detects_overlap() {
        let mut board = Board::new(10, 20);
        board.set(5, 1, Some(Color(1)));
        let o = piece(PieceKind::O);
        assert!(!fits(&board, &o, 4, 0));
        assert!(fits(&board, &o, 6, 0));
    }

    #[test]
    fn test_shadow_on_empty_board() {
        let board = Board::new(10, 20);
        let o = piece(PieceKind::O);
        assert_eq!(shadow_y(&board, &o, 4, 0), 18);
    }

    #[test]
    fn test_shadow_stops_on_stack_and_is_stable() {
        let mut board = Board::new(10, 20);
        fill_row(&mut board, 15);
        let t = piece(PieceKind::T);
        let first = shadow_y(&board, &t, 3, 0);
        assert_eq!(first, 13);
        assert_eq!(shadow_y(&board, &t, 3, 0), first);
        assert_eq!(shadow_y(&board, &t, 3, 13), 13);
    }

    #[test]
    fn test_find_full_lines_ordered() {
        let mut board = Board::new(10, 20);
        fill_row(&mut board, 5);
        fill_row(&mut board, 2);
        board.set(0, 7, Some(Color(1)));
        assert_eq!(find_full_lines(&board), vec![2, 5]);
    }

    #[test]
    fn test_remove_lines_pads_top() {
        let mut board = Board::new(10, 20);
        fill_row(&mut board, 2);
        fill_row(&mut board, 5);
        board.set(3, 1, Some(Color(7)));
        board.set(4, 4, Some(Color(7)));
        board.set(6, 9, Some(Color(7)));

        assert_eq!(remove_lines(&mut board, &[2, 5]), 2);
        assert!(find_full_lines(&board).is_empty());
        // Above both rows: shifted by 2. Between them: shifted by 1. Below: unchanged.
        assert!(board.is_occupied(3, 3));
        assert!(board.is_occupied(4, 5));
        assert!(board.is_occupied(6, 9));
        assert_eq!(board.filled_count(), 3);
        assert!(board.row(0).iter().chain(board.row(1)).all(|c| c.is_none()));
    }

    #[test]
    fn test_lock_writes_color_and_skips_hidden_cells() {
        let mut board = Board::new(10, 20);
        let o = piece(PieceKind::O);
        assert_eq!(lock(&mut board, &o, 4, 18), 4);
        assert_eq!(board.get(4, 18), Some(Some(o.color())));
        assert_eq!(board.get(5, 19), Some(Some(o.color())));

        let mut top = Board::new(10, 20);
        assert_eq!(lock(&mut top, &o, 0, -1), 2);
        assert!(is_above_board(&o, -1));
        assert!(!is_above_board(&o, 0));
    }

    #[test]
    fn test_rotation_simple_and_kicked() {
        let board = Board::new(10, 20);
        let t = piece(PieceKind::T);
        let r = resolve_rotation(&board, &t, 3, 5, RotationDirection::Clockwise).unwrap();
        assert_eq!((r.rotation, r.x, r.y, r.kick), (Rotation::East, 3, 5, (0, 0)));

        // Vertical I against the right wall must kick left to rotate flat.
        let mut i = piece(PieceKind::I);
        i.set_rotation(Rotation::East);
        // East cells sit in column 2 of the box, so x=7 puts them in column 9.
        assert!(fits(&board, &i, 7, 5));
        let r = resolve_rotation(&board, &i, 7, 5, RotationDirection::Clockwise).unwrap();
        assert_eq!(r.rotation, Rotation::South);
        assert!(r.kick != (0, 0));
        assert!(fits_shape(&board, &i.definition().shape(r.rotation), r.x, r.y));
    }

    #[test]
    fn test_rotation_fails_when_pinned() {
        // Fill every cell except the T's own cells: no orientation or kick fits.
        let mut board = Board::new(10, 20);
        let t = piece(PieceKind::T);
        let own: Vec<_> = t.cells_at(3, 10).collect();
        for y in 0..20 {
            for x in 0..10 {
                if !own.contains(&(x, y)) {
                    board.set(x, y, Some(Color(1)));
                }
            }
        }
        assert!(fits(&board, &t, 3, 10));
        assert!(resolve_rotation(&board, &t, 3, 10, RotationDirection::Clockwise).is_none());
        assert!(resolve_rotation(&board, &t, 3, 10, RotationDirection::CounterClockwise).is_none());
        assert_eq!(t.rotation(), Rotation::North);
    }
}
