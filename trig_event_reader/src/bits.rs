//! Contains [TrigBits], the fixed-width bit vector that carries the L1 and HLT decisions of a single event.
//!
//! Bit `0` is the first bit. The textual form used by [FromStr] and [Display](fmt::Display) is a string of `0`/`1` characters
//! where character `i` is bit `i`, e.g. `"1001"` has bits 0 and 3 set.

use std::fmt;
use std::str::FromStr;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-width boolean sequence, indexed from 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TrigBits {
    words: Vec<u64>,
    nbits: usize,
}

impl TrigBits {
    /// Creates a bit vector of width `nbits` with every bit cleared.
    pub fn new(nbits: usize) -> Self {
        Self {
            words: vec![0; nbits.div_ceil(WORD_BITS)],
            nbits,
        }
    }

    /// Creates a bit vector from a slice of booleans, element `i` becomes bit `i`.
    pub fn from_bools(bools: &[bool]) -> Self {
        let mut bits = Self::new(bools.len());
        bools
            .iter()
            .enumerate()
            .filter(|(_, is_set)| **is_set)
            .for_each(|(idx, _)| bits.set(idx));
        bits
    }

    /// Width of the bit vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.nbits
    }

    /// Returns true if the bit vector has zero width.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Sets bit `idx`.
    ///
    /// # Panics
    /// If `idx` is out of range.
    #[inline]
    pub fn set(&mut self, idx: usize) {
        self.assert_in_range(idx);
        self.words[idx / WORD_BITS] |= 1 << (idx % WORD_BITS);
    }

    /// Clears bit `idx`.
    ///
    /// # Panics
    /// If `idx` is out of range.
    #[inline]
    pub fn clear(&mut self, idx: usize) {
        self.assert_in_range(idx);
        self.words[idx / WORD_BITS] &= !(1 << (idx % WORD_BITS));
    }

    /// Returns true if bit `idx` is set.
    ///
    /// # Panics
    /// If `idx` is out of range. Reading past the width is never treated as a cleared bit.
    #[inline]
    pub fn test(&self, idx: usize) -> bool {
        self.assert_in_range(idx);
        (self.words[idx / WORD_BITS] >> (idx % WORD_BITS)) & 1 == 1
    }

    /// Returns the value of bit `idx`, or [None] if `idx` is out of range.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<bool> {
        if idx < self.nbits {
            Some(self.test(idx))
        } else {
            None
        }
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if any bit is set.
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// Iterator over the indices of the set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_idx, word)| {
                let mut remaining = *word;
                std::iter::from_fn(move || {
                    if remaining == 0 {
                        return None;
                    }
                    let bit = remaining.trailing_zeros() as usize;
                    remaining &= remaining - 1;
                    Some(word_idx * WORD_BITS + bit)
                })
            })
    }

    #[inline]
    fn assert_in_range(&self, idx: usize) {
        assert!(
            idx < self.nbits,
            "Bit index {idx} out of range for bit vector of width {width}",
            width = self.nbits
        );
    }
}

/// Error from parsing a [TrigBits] from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBitsError {
    /// Character position of the offending character
    pub position: usize,
    /// The offending character
    pub found: char,
}

impl fmt::Display for ParseBitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid character '{found}' at position {pos}, expected '0' or '1'",
            found = self.found,
            pos = self.position
        )
    }
}

impl std::error::Error for ParseBitsError {}

impl FromStr for TrigBits {
    type Err = ParseBitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bools = Vec::with_capacity(s.len());
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => bools.push(false),
                '1' => bools.push(true),
                // Allows grouping long vectors e.g. `0101_1100`
                '_' => (),
                found => return Err(ParseBitsError { position, found }),
            }
        }
        Ok(Self::from_bools(&bools))
    }
}

impl fmt::Display for TrigBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in 0..self.nbits {
            f.write_str(if self.test(idx) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_is_cleared() {
        let bits = TrigBits::new(130);
        assert_eq!(bits.len(), 130);
        assert!(!bits.any());
        assert_eq!(bits.count_ones(), 0);
        assert!((0..130).all(|idx| !bits.test(idx)));
    }

    #[test]
    fn test_set_clear_across_word_boundary() {
        let mut bits = TrigBits::new(200);
        bits.set(0);
        bits.set(63);
        bits.set(64);
        bits.set(199);
        assert_eq!(bits.count_ones(), 4);
        assert!(bits.test(63) && bits.test(64));
        bits.clear(63);
        assert!(!bits.test(63));
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 64, 199]);
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let bits: TrigBits = "101".parse().unwrap();
        assert_eq!(bits.get(0), Some(true));
        assert_eq!(bits.get(1), Some(false));
        assert_eq!(bits.get(3), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let bits = TrigBits::new(8);
        let _ = bits.test(8);
    }

    #[test]
    fn test_parse_and_display() {
        let bits: TrigBits = "0110_0001".parse().unwrap();
        assert_eq!(bits.len(), 8);
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![1, 2, 7]);
        assert_eq!(bits.to_string(), "01100001");
    }

    #[test]
    fn test_parse_invalid_char() {
        let err = "01x1".parse::<TrigBits>().unwrap_err();
        assert_eq!(
            err,
            ParseBitsError {
                position: 2,
                found: 'x'
            }
        );
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_empty() {
        let bits: TrigBits = "".parse().unwrap();
        assert!(bits.is_empty());
        assert_eq!(bits.to_string(), "");
    }
}
