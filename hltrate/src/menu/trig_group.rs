//! Contains the [TriggerGroup], a named set of paths (a dataset) counted as an inclusive OR per prescale column.

use super::diagnostics::{Diagnostic, Diagnostics};
use super::trig_path::TriggerPath;

/// A named, ordered collection of paths from the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerGroup {
    name: String,
    path_names: Vec<String>,
    path_indices: Vec<usize>,
    nr_passed: Vec<u64>,
}

impl TriggerGroup {
    /// Create a group from the indices of its member paths in the menu's path list.
    ///
    /// `path_names` is used for reporting only.
    pub fn new(
        name: impl Into<String>,
        path_names: Vec<String>,
        path_indices: Vec<usize>,
        nr_columns: usize,
    ) -> Self {
        Self {
            name: name.into(),
            path_names,
            path_indices,
            nr_passed: vec![0; nr_columns],
        }
    }

    /// Count the current event, reading the `result` of each member path.
    ///
    /// All paths must already have been updated for the event.
    pub fn fill(&mut self, paths: &[TriggerPath], event: u64, diagnostics: &mut Diagnostics) {
        for &path_idx in &self.path_indices {
            let path_cols = paths[path_idx].result().len();
            if path_cols != self.nr_passed.len() {
                diagnostics.report(
                    Some(event),
                    Diagnostic::PrescaleColumnMismatch {
                        owner: format!("{}/{}", self.name, paths[path_idx].name()).into(),
                        expected: self.nr_passed.len(),
                        found: path_cols,
                    },
                );
            }
        }

        for (col, cnt) in self.nr_passed.iter_mut().enumerate() {
            if self.path_indices.iter().any(|&path_idx| {
                paths[path_idx]
                    .result()
                    .get(col)
                    .is_some_and(|&res| res != 0)
            }) {
                *cnt += 1;
            }
        }
    }

    pub(super) fn merge_counts(&mut self, other: &TriggerGroup) {
        self.nr_passed
            .iter_mut()
            .zip(&other.nr_passed)
            .for_each(|(cnt, &other_cnt)| *cnt += other_cnt);
    }

    /// Same group with zeroed counters.
    pub fn fresh_copy(&self) -> Self {
        Self::new(
            self.name.clone(),
            self.path_names.clone(),
            self.path_indices.clone(),
            self.nr_passed.len(),
        )
    }

    /// Name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the member paths.
    pub fn path_names(&self) -> &[String] {
        &self.path_names
    }

    /// Indices of the member paths in the menu's path list.
    pub fn path_indices(&self) -> &[usize] {
        &self.path_indices
    }

    /// Cumulative number of accepted events per column.
    pub fn nr_passed(&self) -> &[u64] {
        &self.nr_passed
    }
}
