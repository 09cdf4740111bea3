//! Contains the [Diagnostic] warnings raised while evaluating a menu, and the [Diagnostics] sink that collects them.
//!
//! Diagnostics never alter any counter. They are logged as they occur (unless muted) and kept for the final report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Only the first diagnostics are kept in full, the rest are only counted.
pub const MAX_STORED_DIAGNOSTICS: usize = 1000;

/// A data-quality or configuration warning raised during menu evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// The number of prescale columns of a path does not match its consumer.
    PrescaleColumnMismatch {
        /// Path or group reporting the mismatch
        owner: Box<str>,
        /// Number of columns expected
        expected: usize,
        /// Number of columns found
        found: usize,
    },
    /// An HLT path accepted an event where its L1 seed did not fire.
    SeedlessAccept {
        /// Name of the path
        path: Box<str>,
        /// Index of the L1 express bit seeding the path
        l1_seed_index: usize,
        /// Index of the path's HLT bit
        hlt_index: usize,
    },
}

impl Diagnostic {
    /// Short code used to identify the kind of warning in logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::PrescaleColumnMismatch { .. } => "W01",
            Diagnostic::SeedlessAccept { .. } => "W02",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PrescaleColumnMismatch {
                owner,
                expected,
                found,
            } => write!(
                f,
                "[{code}] {owner}: prescale column mismatch {found} vs {expected}",
                code = self.code()
            ),
            Diagnostic::SeedlessAccept {
                path,
                l1_seed_index,
                hlt_index,
            } => write!(
                f,
                "[{code}] {path} (HLT bit {hlt_index}) passes but fails its L1 seed (express bit {l1_seed_index})",
                code = self.code()
            ),
        }
    }
}

/// A stored [Diagnostic] with the event it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Event number (0-based, per menu instance) or [None] if raised during menu construction
    pub event: Option<u64>,
    /// The diagnostic
    pub diagnostic: Diagnostic,
}

/// Collects [Diagnostic]s, logs them through [log::warn!] and keeps per-kind counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    mute: bool,
    column_mismatches: u64,
    seedless_accepts: u64,
    stored: Vec<DiagnosticRecord>,
}

impl Diagnostics {
    /// Create a sink that does not log each occurrence, only counts and stores them.
    pub fn muted() -> Self {
        Self {
            mute: true,
            ..Default::default()
        }
    }

    /// Set whether each occurrence is logged.
    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    /// Returns true if occurrences are not logged.
    pub fn is_muted(&self) -> bool {
        self.mute
    }

    /// Report a diagnostic raised while processing `event`, or during construction if `event` is [None].
    pub fn report(&mut self, event: Option<u64>, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::PrescaleColumnMismatch { .. } => self.column_mismatches += 1,
            Diagnostic::SeedlessAccept { .. } => self.seedless_accepts += 1,
        }
        if !self.mute {
            match event {
                Some(event_nr) => log::warn!("Event {event_nr}: {diagnostic}"),
                None => log::warn!("{diagnostic}"),
            }
        }
        if self.stored.len() < MAX_STORED_DIAGNOSTICS {
            self.stored.push(DiagnosticRecord { event, diagnostic });
        }
    }

    /// Total number of diagnostics reported.
    pub fn total(&self) -> u64 {
        self.column_mismatches + self.seedless_accepts
    }

    /// Number of prescale column mismatches reported.
    pub fn column_mismatches(&self) -> u64 {
        self.column_mismatches
    }

    /// Number of HLT accepts without an L1 seed reported.
    pub fn seedless_accepts(&self) -> u64 {
        self.seedless_accepts
    }

    /// The first [MAX_STORED_DIAGNOSTICS] diagnostics reported.
    pub fn stored(&self) -> &[DiagnosticRecord] {
        &self.stored
    }

    /// Returns true if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Add the counts and stored records of `other` to `self`.
    pub fn merge(&mut self, other: &Diagnostics) {
        self.column_mismatches += other.column_mismatches;
        self.seedless_accepts += other.seedless_accepts;
        let room = MAX_STORED_DIAGNOSTICS.saturating_sub(self.stored.len());
        self.stored
            .extend(other.stored.iter().take(room).cloned());
    }
}
