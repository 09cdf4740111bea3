//! Contains the [TriggerPath] that decides per prescale column whether an event is accepted by one HLT path.
//!
//! Prescale decimation counts seed-fired events only: a path with prescale `p` in a column accepts every `p`-th event
//! on which its L1 seed fired and the HLT decision is positive. A prescale of `0` disables the column.

use super::diagnostics::{Diagnostic, Diagnostics};
use serde::{Deserialize, Serialize};
use std::fmt;
use trig_event_reader::TrigBits;

/// Starting value of the prescale counter used when nothing else is configured.
///
/// Reproduces the historical phase of the prescale counters, the value has no further meaning.
pub const DEFAULT_PS_COUNT_OFFSET: u64 = 341;

/// Classification of a path from its name prefix, used for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrigType {
    /// `HLT_` paths
    Hlt,
    /// `AlCa_` calibration paths
    Calibration,
    /// `DST_` data scouting paths
    DataScouting,
    /// `MC_` paths only meaningful in simulation
    MonteCarlo,
    /// Anything else
    Unknown,
}

impl TrigType {
    /// Classify a path by its name prefix.
    pub fn from_path_name(name: &str) -> Self {
        if name.starts_with("HLT_") {
            TrigType::Hlt
        } else if name.starts_with("AlCa_") {
            TrigType::Calibration
        } else if name.starts_with("DST_") {
            TrigType::DataScouting
        } else if name.starts_with("MC_") {
            TrigType::MonteCarlo
        } else {
            TrigType::Unknown
        }
    }
}

impl fmt::Display for TrigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrigType::Hlt => write!(f, "HLT"),
            TrigType::Calibration => write!(f, "AlCa"),
            TrigType::DataScouting => write!(f, "DST"),
            TrigType::MonteCarlo => write!(f, "MC"),
            TrigType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A trigger path: its static configuration and the counters accumulated over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPath {
    name: String,
    hlt_index: usize,
    l1_seed_index: usize,
    prescales: Vec<u32>,
    l1_seeds: Vec<String>,
    physics: bool,
    trig_type: TrigType,

    ps_count_offset: u64,
    ps_count: u64,
    nr_l1_passed: u64,
    nr_passed: Vec<u64>,
    result: Vec<u32>,
    any_ps_col_pass: bool,
}

impl TriggerPath {
    /// Create a new path.
    ///
    /// `l1_seed_index` is the index of the path's express bit, `hlt_index` the index of its HLT bit.
    /// `ps_count_offset` is the starting value of the prescale counter, which sets the phase of the decimation.
    pub fn new(
        name: impl Into<String>,
        hlt_index: usize,
        l1_seed_index: usize,
        prescales: Vec<u32>,
        l1_seeds: Vec<String>,
        physics: bool,
        ps_count_offset: u64,
    ) -> Self {
        let name = name.into();
        let nr_cols = prescales.len();
        Self {
            trig_type: TrigType::from_path_name(&name),
            name,
            hlt_index,
            l1_seed_index,
            prescales,
            l1_seeds,
            physics,
            ps_count_offset,
            ps_count: ps_count_offset,
            nr_l1_passed: 0,
            nr_passed: vec![0; nr_cols],
            result: vec![0; nr_cols],
            any_ps_col_pass: false,
        }
    }

    /// Update the path with the decisions of the next event.
    ///
    /// Must be called exactly once per event, in event order. Width of the bit vectors is validated by the caller.
    pub fn fill_results(
        &mut self,
        l1_express: &TrigBits,
        hlt_bits: &TrigBits,
        event: u64,
        diagnostics: &mut Diagnostics,
    ) {
        let hlt_pass = hlt_bits.test(self.hlt_index);

        if l1_express.test(self.l1_seed_index) {
            self.ps_count += 1;
            self.nr_l1_passed += 1;
            let ps_count = self.ps_count;
            self.result
                .iter_mut()
                .zip(&self.prescales)
                .for_each(|(res, &ps)| {
                    *res = u32::from(hlt_pass && ps != 0 && ps_count % u64::from(ps) == 0)
                });
            self.nr_passed
                .iter_mut()
                .zip(&self.result)
                .for_each(|(cnt, &res)| *cnt += u64::from(res));
            self.any_ps_col_pass = hlt_pass && self.result.iter().any(|&res| res != 0);
        } else {
            if self.any_ps_col_pass {
                self.result.iter_mut().for_each(|res| *res = 0);
                self.any_ps_col_pass = false;
            }
            if hlt_pass {
                diagnostics.report(
                    Some(event),
                    Diagnostic::SeedlessAccept {
                        path: self.name.as_str().into(),
                        l1_seed_index: self.l1_seed_index,
                        hlt_index: self.hlt_index,
                    },
                );
            }
        }
    }

    /// Returns a fresh path with the same configuration and all counters reset.
    pub fn fresh_copy(&self) -> Self {
        Self::new(
            self.name.clone(),
            self.hlt_index,
            self.l1_seed_index,
            self.prescales.clone(),
            self.l1_seeds.clone(),
            self.physics,
            self.ps_count_offset,
        )
    }

    /// Add the counters of `other` to `self`. Callers make sure `other` is the same path.
    pub(super) fn merge_counts(&mut self, other: &TriggerPath) {
        debug_assert_eq!(self.name, other.name);
        self.nr_l1_passed += other.nr_l1_passed;
        self.nr_passed
            .iter_mut()
            .zip(&other.nr_passed)
            .for_each(|(cnt, &other_cnt)| *cnt += other_cnt);
    }

    /// Name of the path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the path's HLT bit.
    pub fn hlt_index(&self) -> usize {
        self.hlt_index
    }

    /// Index of the path's L1 express bit.
    pub fn l1_seed_index(&self) -> usize {
        self.l1_seed_index
    }

    /// Prescale of each column.
    pub fn prescales(&self) -> &[u32] {
        &self.prescales
    }

    /// Names of the L1 seeds, informational.
    pub fn l1_seeds(&self) -> &[String] {
        &self.l1_seeds
    }

    /// Whether the path counts toward the menu physics total.
    pub fn physics(&self) -> bool {
        self.physics
    }

    /// Classification from the name prefix.
    pub fn trig_type(&self) -> TrigType {
        self.trig_type
    }

    /// Number of prescale columns of the path.
    pub fn nr_columns(&self) -> usize {
        self.prescales.len()
    }

    /// Current value of the prescale counter.
    pub fn ps_count(&self) -> u64 {
        self.ps_count
    }

    /// Starting value of the prescale counter.
    pub fn ps_count_offset(&self) -> u64 {
        self.ps_count_offset
    }

    /// Number of events on which the L1 seed fired.
    pub fn nr_l1_passed(&self) -> u64 {
        self.nr_l1_passed
    }

    /// Cumulative number of accepted events per column.
    pub fn nr_passed(&self) -> &[u64] {
        &self.nr_passed
    }

    /// Outcome of the last processed event per column, 1 if accepted.
    pub fn result(&self) -> &[u32] {
        &self.result
    }

    /// Whether any column accepted the last event.
    pub fn any_ps_col_pass(&self) -> bool {
        self.any_ps_col_pass
    }
}
