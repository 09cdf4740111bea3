//! Contains the [SeedIndexResolver] that turns raw L1 decisions into L1 express bits.
//!
//! Each express bit stands for one seed expression: the OR of a list of raw L1 bits.
//! An empty list means the path needs no L1 seed, the express bit is then always set.

use super::error::{BitsKind, MenuError};
use trig_event_reader::TrigBits;

/// Converts raw L1 bits into express bits, one per configured seed expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeedIndexResolver {
    seed_names: Vec<Vec<String>>,
    seed_indices: Vec<Vec<usize>>,
    required_width: usize,
}

impl SeedIndexResolver {
    /// Create a resolver from the raw L1 bit indices ORed together for each express bit.
    pub fn new(seed_indices: Vec<Vec<usize>>) -> Self {
        let seed_names = vec![Vec::new(); seed_indices.len()];
        Self::with_names(seed_names, seed_indices)
    }

    /// Create a resolver that also carries the seed names of each express bit, used for reporting only.
    pub fn with_names(seed_names: Vec<Vec<String>>, seed_indices: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(seed_names.len(), seed_indices.len());
        let required_width = seed_indices
            .iter()
            .flatten()
            .max()
            .map_or(0, |max_idx| max_idx + 1);
        Self {
            seed_names,
            seed_indices,
            required_width,
        }
    }

    /// Number of express bits produced.
    pub fn nr_express_bits(&self) -> usize {
        self.seed_indices.len()
    }

    /// Minimum width of the raw L1 vector.
    pub fn required_width(&self) -> usize {
        self.required_width
    }

    /// Seed names of each express bit.
    pub fn seed_names(&self) -> &[Vec<String>] {
        &self.seed_names
    }

    /// Raw L1 indices of each express bit.
    pub fn seed_indices(&self) -> &[Vec<usize>] {
        &self.seed_indices
    }

    /// Resolve the express bits of an event.
    ///
    /// Fails if `l1_bits` is narrower than the largest configured raw index.
    pub fn resolve(&self, l1_bits: &TrigBits) -> Result<TrigBits, MenuError> {
        if l1_bits.len() < self.required_width {
            return Err(MenuError::BitVectorTooShort {
                kind: BitsKind::L1Raw,
                required: self.required_width,
                got: l1_bits.len(),
            });
        }
        let mut express_bits = TrigBits::new(self.seed_indices.len());
        self.seed_indices
            .iter()
            .enumerate()
            .filter(|(_, indices)| pass_any(indices, l1_bits))
            .for_each(|(express_nr, _)| express_bits.set(express_nr));
        Ok(express_bits)
    }
}

/// Returns true if any of the `indices` is set in `l1_bits`, or if `indices` is empty (no seed required).
#[inline]
pub fn pass_any(indices: &[usize], l1_bits: &TrigBits) -> bool {
    indices.is_empty() || indices.iter().any(|&idx| l1_bits.test(idx))
}
