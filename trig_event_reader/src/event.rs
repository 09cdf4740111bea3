//! Contains [TrigEvent] which holds the raw L1 and HLT decision bits of one event.
use crate::bits::{ParseBitsError, TrigBits};
use std::fmt;
use std::str::FromStr;

/// The trigger decisions recorded for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrigEvent {
    /// Raw L1 seed decisions, one bit per L1 algorithm
    pub l1: TrigBits,
    /// HLT path decisions, one bit per HLT path
    pub hlt: TrigBits,
}

impl TrigEvent {
    /// Create a new event from its L1 and HLT decisions.
    pub fn new(l1: TrigBits, hlt: TrigBits) -> Self {
        Self { l1, hlt }
    }
}

/// Errors from parsing a [TrigEvent] from a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEventError {
    /// The line did not contain exactly two whitespace separated fields
    FieldCount(usize),
    /// The L1 field is not a valid bit string
    L1Bits(ParseBitsError),
    /// The HLT field is not a valid bit string
    HltBits(ParseBitsError),
}

impl fmt::Display for ParseEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseEventError::FieldCount(cnt) => {
                write!(f, "expected 2 fields (L1 bits, HLT bits), found {cnt}")
            }
            ParseEventError::L1Bits(e) => write!(f, "L1 bits: {e}"),
            ParseEventError::HltBits(e) => write!(f, "HLT bits: {e}"),
        }
    }
}

impl std::error::Error for ParseEventError {}

impl FromStr for TrigEvent {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(ParseEventError::FieldCount(fields.len()));
        }
        let l1 = fields[0].parse().map_err(ParseEventError::L1Bits)?;
        let hlt = fields[1].parse().map_err(ParseEventError::HltBits)?;
        Ok(Self { l1, hlt })
    }
}

impl fmt::Display for TrigEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.l1, self.hlt)
    }
}
