//! Contains the [PassCounts] accumulator counting which trigger bits fire together with a reference bit.

use crate::menu::MenuError;
use serde::{Deserialize, Serialize};
use trig_event_reader::TrigBits;

/// Counts, for every bit `b < nr_bits`, the events where both the reference bit and `b` are set.
///
/// Merging is associative and commutative, so partial counts from disjoint sets of events can be combined in any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCounts {
    trig_bit: usize,
    counts: Vec<u64>,
    total: u64,
}

impl PassCounts {
    /// Create an empty accumulator for the reference bit `trig_bit` and `nr_bits` correlated bits.
    pub fn new(trig_bit: usize, nr_bits: usize) -> Self {
        Self {
            trig_bit,
            counts: vec![0; nr_bits],
            total: 0,
        }
    }

    /// Minimum width of the vectors passed to [PassCounts::add].
    pub fn required_width(&self) -> usize {
        self.counts.len().max(self.trig_bit + 1)
    }

    /// Fails if `bits` is narrower than [PassCounts::required_width], without touching any count.
    pub fn check_width(&self, bits: &TrigBits) -> Result<(), MenuError> {
        let required = self.required_width();
        if bits.len() < required {
            return Err(MenuError::BitVectorTooShort {
                kind: crate::menu::BitsKind::Hlt,
                required,
                got: bits.len(),
            });
        }
        Ok(())
    }

    /// Account for one event.
    pub fn add(&mut self, bits: &TrigBits) -> Result<(), MenuError> {
        self.check_width(bits)?;
        if !bits.test(self.trig_bit) {
            return Ok(());
        }
        self.total += 1;
        let nr_bits = self.counts.len();
        bits.iter_ones()
            .take_while(|&idx| idx < nr_bits)
            .for_each(|idx| self.counts[idx] += 1);
        Ok(())
    }

    /// Add the counts of `other`, which must use the same reference bit and width.
    pub fn merge(&mut self, other: &PassCounts) -> Result<(), MenuError> {
        if self.trig_bit != other.trig_bit || self.counts.len() != other.counts.len() {
            return Err(MenuError::MergeMismatch(
                format!(
                    "pass counts for bit {} ({} bits) and bit {} ({} bits)",
                    self.trig_bit,
                    self.counts.len(),
                    other.trig_bit,
                    other.counts.len()
                )
                .into(),
            ));
        }
        self.total += other.total;
        self.counts
            .iter_mut()
            .zip(&other.counts)
            .for_each(|(a, &b)| *a += b);
        Ok(())
    }

    /// Same reference bit and width, zeroed counts.
    pub fn fresh_copy(&self) -> Self {
        Self::new(self.trig_bit, self.counts.len())
    }

    /// The reference bit.
    pub fn trig_bit(&self) -> usize {
        self.trig_bit
    }

    /// Co-occurrence count of each bit with the reference bit.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of events where the reference bit was set.
    pub fn total(&self) -> u64 {
        self.total
    }
}
