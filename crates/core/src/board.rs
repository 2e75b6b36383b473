//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell is empty or holds the
//! color token of the piece that locked there. Storage is a flat row-major
//! vector sized once at construction; no operation resizes it.
//! Coordinates: (x, y) where x grows left to right and y grows top to bottom.

use crate::types::Cell;

/// The game board using flat row-major storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= i32::from(self.width) || y < 0 || y >= i32::from(self.height) {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Whether `x` names one of the board's columns
    pub fn contains_column(&self, x: i32) -> bool {
        x >= 0 && x < i32::from(self.width)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    /// A single row as a slice (panics if `y` is out of range)
    pub fn row(&self, y: usize) -> &[Cell] {
        let width = self.width as usize;
        let start = y * width;
        &self.cells[start..start + width]
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Remove the given rows and shift everything above them down.
    ///
    /// Uses a two-pointer pass from the bottom up; the vacated rows at the
    /// top are cleared. Indices outside the board are ignored. Returns the
    /// number of rows removed.
    pub fn remove_rows(&mut self, rows: &[usize]) -> usize {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut write_y = height;
        let mut removed = 0;

        for read_y in (0..height).rev() {
            if rows.contains(&read_y) {
                removed += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src_start = read_y * width;
                let dst_start = write_y * width;
                self.cells
                    .copy_within(src_start..src_start + width, dst_start);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        removed
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}
