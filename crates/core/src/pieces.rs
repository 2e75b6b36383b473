//! Pieces module - piece definitions, rotation and wall kicks
//!
//! Each kind is described once by a [`PieceDefinition`]: a north-facing cell
//! list inside a square bounding box, a color token and a spawn offset. The
//! other three orientations are derived by rotating the cells inside the box,
//! which reproduces the SRS orientations for the standard tetrominoes.
//!
//! Kick offsets follow SRS (reference: https://tetris.wiki/SRS) with the y
//! component negated, since rows grow downward on this board.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PieceError};
use crate::types::{Color, PieceKind, Rotation, RotationDirection};

/// Largest number of cells any piece may have
pub const MAX_CELLS: usize = 5;

/// Offset of a single cell relative to piece origin
pub type MinoOffset = (i8, i8);

/// Cells of a piece in one orientation
pub type PieceShape = ArrayVec<MinoOffset, MAX_CELLS>;

/// Immutable per-kind description shared by every instance of that kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub kind: PieceKind,
    /// Side length of the square bounding box the cells rotate within
    pub size: u8,
    /// North-facing cells
    pub cells: Vec<MinoOffset>,
    pub color: Color,
    /// Added to the horizontally centered spawn column and row 0
    #[serde(default)]
    pub spawn_offset: (i8, i8),
    /// Special pieces are weighted separately and unlocked during play
    pub special: bool,
}

impl PieceDefinition {
    pub fn new(kind: PieceKind, size: u8, cells: &[MinoOffset], color: u32) -> Self {
        Self {
            kind,
            size,
            cells: cells.to_vec(),
            color: Color(color),
            spawn_offset: (0, 0),
            special: kind.is_special(),
        }
    }

    pub fn with_spawn_offset(mut self, dx: i8, dy: i8) -> Self {
        self.spawn_offset = (dx, dy);
        self
    }

    /// Cells for the given orientation
    pub fn shape(&self, rotation: Rotation) -> PieceShape {
        rotate_cells(&self.cells, self.size, rotation)
    }

    /// Board position of the piece origin at spawn
    pub fn spawn_position(&self, board_width: u8) -> (i32, i32) {
        let centered = (i32::from(board_width) - i32::from(self.size)) / 2;
        (
            centered + i32::from(self.spawn_offset.0),
            i32::from(self.spawn_offset.1),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidShape {
            kind: self.kind,
            reason: reason.to_string(),
        };

        if self.cells.is_empty() || self.cells.len() > MAX_CELLS {
            return Err(invalid("cell count must be between 1 and 5"));
        }
        if self.size == 0 || self.size > 5 {
            return Err(invalid("bounding box size must be between 1 and 5"));
        }
        let size = self.size as i8;
        if self
            .cells
            .iter()
            .any(|&(x, y)| x < 0 || y < 0 || x >= size || y >= size)
        {
            return Err(invalid("cell outside bounding box"));
        }
        for (i, cell) in self.cells.iter().enumerate() {
            if self.cells[i + 1..].contains(cell) {
                return Err(invalid("duplicate cell"));
            }
        }
        Ok(())
    }
}

/// Rotate north-facing cells clockwise `rotation.index()` times inside a
/// `size x size` box. Output is sorted row-major.
pub fn rotate_cells(cells: &[MinoOffset], size: u8, rotation: Rotation) -> PieceShape {
    let n = size as i8 - 1;
    let mut shape: PieceShape = cells
        .iter()
        .take(MAX_CELLS)
        .map(|&(x, y)| match rotation {
            Rotation::North => (x, y),
            Rotation::East => (n - y, x),
            Rotation::South => (n - x, n - y),
            Rotation::West => (y, n - x),
        })
        .collect();
    shape.sort_by_key(|&(x, y)| (y, x));
    shape
}

/// An instance of a piece owned by one of the game state's slots
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    definition: Arc<PieceDefinition>,
    rotation: Rotation,
    shape: PieceShape,
    /// Cosmetic variant in `0..VARIANT_COUNT`; rendering only
    pub variant: u8,
    /// Rises spent by a float piece
    pub up_moves_used: u8,
}

impl Piece {
    pub fn new(definition: Arc<PieceDefinition>, variant: u8) -> Self {
        let shape = definition.shape(Rotation::North);
        Self {
            definition,
            rotation: Rotation::North,
            shape,
            variant,
            up_moves_used: 0,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.definition.kind
    }

    pub fn color(&self) -> Color {
        self.definition.color
    }

    pub fn is_special(&self) -> bool {
        self.definition.special
    }

    pub fn definition(&self) -> &Arc<PieceDefinition> {
        &self.definition
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Cells for the current orientation
    pub fn shape(&self) -> &PieceShape {
        &self.shape
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.shape = self.definition.shape(rotation);
    }

    /// Back to the spawn orientation with a fresh up-move budget
    pub fn reset(&mut self) {
        self.set_rotation(Rotation::North);
        self.up_moves_used = 0;
    }

    /// Absolute board cells when the origin sits at (x, y)
    pub fn cells_at(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .iter()
            .map(move |&(dx, dy)| (x + i32::from(dx), y + i32::from(dy)))
    }

    /// Smallest row offset of the current shape
    pub fn top_offset(&self) -> i32 {
        self.shape
            .iter()
            .map(|&(_, dy)| i32::from(dy))
            .min()
            .unwrap_or(0)
    }

    /// Render hint: float pieces darken linearly with every rise, down to
    /// half brightness once the budget is exhausted
    pub fn display_color(&self, up_move_cap: u8) -> Color {
        if self.kind() != PieceKind::Float || up_move_cap == 0 {
            return self.color();
        }
        let used = f32::from(self.up_moves_used.min(up_move_cap));
        let factor = 1.0 - 0.5 * used / f32::from(up_move_cap);
        self.color().scaled(factor)
    }
}

/// The set of definitions available to a session
#[derive(Debug, Clone, PartialEq)]
pub struct PieceCatalog {
    definitions: BTreeMap<PieceKind, Arc<PieceDefinition>>,
}

impl PieceCatalog {
    pub fn from_definitions(definitions: &[PieceDefinition]) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for def in definitions {
            def.validate()?;
            if map.insert(def.kind, Arc::new(def.clone())).is_some() {
                return Err(ConfigError::DuplicateDefinition(def.kind));
            }
        }
        Ok(Self { definitions: map })
    }

    pub fn get(&self, kind: PieceKind) -> Result<&Arc<PieceDefinition>, PieceError> {
        self.definitions
            .get(&kind)
            .ok_or(PieceError::UnknownPiece(kind))
    }

    /// Lookup by name, for hosts that carry piece kinds as strings
    pub fn get_by_name(&self, name: &str) -> Result<&Arc<PieceDefinition>, PieceError> {
        let kind =
            PieceKind::from_str(name).ok_or_else(|| PieceError::UnknownName(name.to_string()))?;
        self.get(kind)
    }

    pub fn contains(&self, kind: PieceKind) -> bool {
        self.definitions.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.definitions.keys().copied()
    }
}

/// Definitions for every kind with the standard colors and spawn rows
pub fn standard_definitions() -> Vec<PieceDefinition> {
    vec![
        // Row 1 of the 4x4 box is the bar; spawn one row up so it sits on row 0.
        PieceDefinition::new(PieceKind::I, 4, &[(0, 1), (1, 1), (2, 1), (3, 1)], 0x00f0f0)
            .with_spawn_offset(0, -1),
        PieceDefinition::new(PieceKind::O, 2, &[(0, 0), (1, 0), (0, 1), (1, 1)], 0xf0f000),
        PieceDefinition::new(PieceKind::T, 3, &[(1, 0), (0, 1), (1, 1), (2, 1)], 0xa000f0),
        PieceDefinition::new(PieceKind::S, 3, &[(1, 0), (2, 0), (0, 1), (1, 1)], 0x00f000),
        PieceDefinition::new(PieceKind::Z, 3, &[(0, 0), (1, 0), (1, 1), (2, 1)], 0xf00000),
        PieceDefinition::new(PieceKind::J, 3, &[(0, 0), (0, 1), (1, 1), (2, 1)], 0x0000f0),
        PieceDefinition::new(PieceKind::L, 3, &[(2, 0), (0, 1), (1, 1), (2, 1)], 0xf0a000),
        PieceDefinition::new(PieceKind::Float, 2, &[(0, 0), (1, 0)], 0xf0f0f0),
        PieceDefinition::new(
            PieceKind::Plus,
            3,
            &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)],
            0xf06090,
        ),
        PieceDefinition::new(
            PieceKind::U,
            3,
            &[(0, 0), (2, 0), (0, 1), (1, 1), (2, 1)],
            0x60c0a0,
        ),
    ]
}

/// JLSTZ kick table (also used by the special pieces)
/// Indexed by [`kick_index`]; the first entry is always the unkicked position.
const JLSTZ_KICKS: [[(i8, i8); 5]; 8] = [
    // 0->1 (N->E, clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 0->3 (N->W, counter-clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 1->0 (E->N, counter-clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 1->2 (E->S, clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 2->1 (S->E, counter-clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 2->3 (S->W, clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 3->2 (W->S, counter-clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 3->0 (W->N, clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// I piece kick table (different from JLSTZ)
const I_KICKS: [[(i8, i8); 5]; 8] = [
    // 0->1 (N->E)
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // 0->3 (N->W)
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // 1->0 (E->N)
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // 1->2 (E->S)
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // 2->1 (S->E)
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    // 2->3 (S->W)
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // 3->2 (W->S)
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // 3->0 (W->N)
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

/// The O piece never needs a kick
const NO_KICKS: [(i8, i8); 1] = [(0, 0)];

/// Get the kick index for a rotation transition
fn kick_index(from: Rotation, direction: RotationDirection) -> usize {
    use RotationDirection::{Clockwise, CounterClockwise};
    match (from, direction) {
        (Rotation::North, Clockwise) => 0,
        (Rotation::North, CounterClockwise) => 1,
        (Rotation::East, CounterClockwise) => 2,
        (Rotation::East, Clockwise) => 3,
        (Rotation::South, CounterClockwise) => 4,
        (Rotation::South, Clockwise) => 5,
        (Rotation::West, CounterClockwise) => 6,
        (Rotation::West, Clockwise) => 7,
    }
}

/// Offsets tried, in order, when rotating `kind` out of `from`
pub fn kick_offsets(
    kind: PieceKind,
    from: Rotation,
    direction: RotationDirection,
) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::O => &NO_KICKS,
        PieceKind::I => &I_KICKS[kick_index(from, direction)],
        _ => &JLSTZ_KICKS[kick_index(from, direction)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(kind: PieceKind) -> PieceDefinition {
        standard_definitions()
            .into_iter()
            .find(|d| d.kind == kind)
            .unwrap()
    }

    #[test]
    fn test_rotation_matches_srs_orientations() {
        let t = def(PieceKind::T);
        assert_eq!(
            t.shape(Rotation::East).as_slice(),
            &[(1, 0), (1, 1), (2, 1), (1, 2)]
        );
        assert_eq!(
            t.shape(Rotation::South).as_slice(),
            &[(0, 1), (1, 1), (2, 1), (1, 2)]
        );
        assert_eq!(
            t.shape(Rotation::West).as_slice(),
            &[(1, 0), (0, 1), (1, 1), (1, 2)]
        );

        let i = def(PieceKind::I);
        assert_eq!(
            i.shape(Rotation::East).as_slice(),
            &[(2, 0), (2, 1), (2, 2), (2, 3)]
        );
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let o = def(PieceKind::O);
        let north = o.shape(Rotation::North);
        for r in [Rotation::East, Rotation::South, Rotation::West] {
            assert_eq!(o.shape(r), north);
        }
    }

    #[test]
    fn test_spawn_positions_center_pieces() {
        assert_eq!(def(PieceKind::O).spawn_position(10), (4, 0));
        assert_eq!(def(PieceKind::T).spawn_position(10), (3, 0));
        assert_eq!(def(PieceKind::I).spawn_position(10), (3, -1));
    }

    #[test]
    fn test_standard_definitions_validate() {
        let catalog = PieceCatalog::from_definitions(&standard_definitions()).unwrap();
        for kind in PieceKind::ALL {
            assert!(catalog.contains(kind));
        }
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_bad_shapes() {
        let mut defs = standard_definitions();
        defs.push(def(PieceKind::T));
        assert_eq!(
            PieceCatalog::from_definitions(&defs),
            Err(ConfigError::DuplicateDefinition(PieceKind::T))
        );

        let bad = PieceDefinition::new(PieceKind::T, 2, &[(0, 0), (2, 0)], 0);
        assert!(matches!(
            PieceCatalog::from_definitions(&[bad]),
            Err(ConfigError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_catalog_unknown_kind_is_error() {
        let catalog = PieceCatalog::from_definitions(&[def(PieceKind::T)]).unwrap();
        assert_eq!(
            catalog.get(PieceKind::Plus).map(|d| d.kind),
            Err(PieceError::UnknownPiece(PieceKind::Plus))
        );
        assert_eq!(
            catalog.get_by_name("heptomino").map(|d| d.kind),
            Err(PieceError::UnknownName("heptomino".to_string()))
        );
    }

    #[test]
    fn test_float_display_color_darkens_linearly() {
        let mut piece = Piece::new(Arc::new(def(PieceKind::Float)), 0);
        let base = piece.color();
        assert_eq!(piece.display_color(4), base);
        piece.up_moves_used = 2;
        assert_eq!(piece.display_color(4), base.scaled(0.75));
        piece.up_moves_used = 4;
        assert_eq!(piece.display_color(4), base.scaled(0.5));
    }

    #[test]
    fn test_kick_tables_start_unkicked() {
        for kind in PieceKind::ALL {
            for from in [Rotation::North, Rotation::East, Rotation::South, Rotation::West] {
                for dir in [RotationDirection::Clockwise, RotationDirection::CounterClockwise] {
                    assert_eq!(kick_offsets(kind, from, dir)[0], (0, 0));
                }
            }
        }
    }
}
