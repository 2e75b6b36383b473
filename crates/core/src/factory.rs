//! Piece factory - turns a kind (or a random draw) into a piece instance
//!
//! Draw order for [`PieceFactory::generate`] is fixed:
//! 1. the float roll (only when the float piece is unlocked and the chance is positive)
//! 2. the weighted kind choice (skipped when the float roll hit)
//! 3. the cosmetic variant

use std::collections::BTreeSet;

use crate::error::PieceError;
use crate::pieces::{Piece, PieceCatalog};
use crate::rng::RandomSource;
use crate::types::{PieceKind, VARIANT_COUNT};

#[derive(Debug, Clone)]
pub struct PieceFactory {
    catalog: PieceCatalog,
    float_chance: f64,
    special_weight_multiplier: f64,
}

impl PieceFactory {
    pub fn new(catalog: PieceCatalog, float_chance: f64, special_weight_multiplier: f64) -> Self {
        Self {
            catalog,
            float_chance,
            special_weight_multiplier,
        }
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    /// Build a piece of the given kind in spawn orientation
    pub fn create(&self, kind: PieceKind, rng: &mut RandomSource) -> Result<Piece, PieceError> {
        let definition = self.catalog.get(kind)?.clone();
        let variant = rng.next_range(VARIANT_COUNT) as u8;
        Ok(Piece::new(definition, variant))
    }

    /// Draw the kind of the next piece from the unlocked set
    pub fn choose_kind(
        &self,
        unlocked: &BTreeSet<PieceKind>,
        rng: &mut RandomSource,
    ) -> Result<PieceKind, PieceError> {
        if unlocked.contains(&PieceKind::Float) && self.float_chance > 0.0 {
            let roll = rng.next();
            if roll < self.float_chance {
                log::debug!("float roll {:.3} < {:.3}, forcing float", roll, self.float_chance);
                return Ok(PieceKind::Float);
            }
        }

        let kinds: Vec<PieceKind> = unlocked.iter().copied().collect();
        let mut weights = Vec::with_capacity(kinds.len());
        for &kind in &kinds {
            let special = self.catalog.get(kind)?.special;
            weights.push(if special {
                self.special_weight_multiplier
            } else {
                1.0
            });
        }

        let kind = rng
            .weighted_choice(&kinds, &weights)
            .copied()
            .ok_or(PieceError::NothingUnlocked)?;
        log::debug!("drew {} from {} unlocked kinds", kind.as_str(), kinds.len());
        Ok(kind)
    }

    /// Draw a kind and build it
    pub fn generate(
        &self,
        unlocked: &BTreeSet<PieceKind>,
        rng: &mut RandomSource,
    ) -> Result<Piece, PieceError> {
        let kind = self.choose_kind(unlocked, rng)?;
        self.create(kind, rng)
    }
}
