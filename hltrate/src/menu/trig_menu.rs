//! Contains the [TriggerMenu] that owns all paths and groups and drives the per-event evaluation.
//!
//! Evaluation of one event happens in two phases. First every path is updated in declaration order,
//! then groups and the menu physics total read the fresh results through a shared slice of the paths.

use super::diagnostics::{Diagnostic, Diagnostics};
use super::error::{BitsKind, MenuError};
use super::trig_group::TriggerGroup;
use super::trig_path::TriggerPath;
use std::collections::HashSet;
use trig_event_reader::TrigBits;

/// A complete trigger menu with its run counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMenu {
    paths: Vec<TriggerPath>,
    groups: Vec<TriggerGroup>,
    nr_columns: usize,
    nr_passed: Vec<u64>,
    nr_tot: u64,
    diagnostics: Diagnostics,
    required_l1_width: usize,
    required_hlt_width: usize,
}

impl TriggerMenu {
    /// Create a menu from its paths (in evaluation order), its groups and the global number of prescale columns.
    ///
    /// Fails on duplicate path names or group member indices out of range.
    /// Paths or groups with a column count different from `nr_columns` are reported as warnings.
    pub fn new(
        paths: Vec<TriggerPath>,
        groups: Vec<TriggerGroup>,
        nr_columns: usize,
    ) -> Result<Self, MenuError> {
        Self::with_diagnostics(paths, groups, nr_columns, Diagnostics::default())
    }

    /// Same as [TriggerMenu::new] but reporting into the given [Diagnostics] sink.
    pub fn with_diagnostics(
        paths: Vec<TriggerPath>,
        groups: Vec<TriggerGroup>,
        nr_columns: usize,
        mut diagnostics: Diagnostics,
    ) -> Result<Self, MenuError> {
        let mut names = HashSet::with_capacity(paths.len());
        for path in &paths {
            if !names.insert(path.name()) {
                return Err(MenuError::DuplicatePathName(path.name().into()));
            }
        }
        for group in &groups {
            if let Some(&index) = group.path_indices().iter().find(|&&idx| idx >= paths.len()) {
                return Err(MenuError::GroupPathIndexOutOfRange {
                    group: group.name().into(),
                    index,
                    nr_paths: paths.len(),
                });
            }
        }

        paths
            .iter()
            .filter(|p| p.nr_columns() != nr_columns)
            .for_each(|p| {
                diagnostics.report(
                    None,
                    Diagnostic::PrescaleColumnMismatch {
                        owner: p.name().into(),
                        expected: nr_columns,
                        found: p.nr_columns(),
                    },
                )
            });
        groups
            .iter()
            .filter(|g| g.nr_passed().len() != nr_columns)
            .for_each(|g| {
                diagnostics.report(
                    None,
                    Diagnostic::PrescaleColumnMismatch {
                        owner: g.name().into(),
                        expected: nr_columns,
                        found: g.nr_passed().len(),
                    },
                )
            });

        let required_l1_width = paths
            .iter()
            .map(|p| p.l1_seed_index() + 1)
            .max()
            .unwrap_or(0);
        let required_hlt_width = paths
            .iter()
            .map(|p| p.hlt_index() + 1)
            .max()
            .unwrap_or(0);

        Ok(Self {
            paths,
            groups,
            nr_columns,
            nr_passed: vec![0; nr_columns],
            nr_tot: 0,
            diagnostics,
            required_l1_width,
            required_hlt_width,
        })
    }

    /// Process the next event given its L1 express bits and HLT bits.
    ///
    /// Fails without touching any counter if a bit vector is narrower than the menu requires.
    pub fn process_event(&mut self, l1_express: &TrigBits, hlt: &TrigBits) -> Result<(), MenuError> {
        if l1_express.len() < self.required_l1_width {
            return Err(MenuError::BitVectorTooShort {
                kind: BitsKind::L1Express,
                required: self.required_l1_width,
                got: l1_express.len(),
            });
        }
        if hlt.len() < self.required_hlt_width {
            return Err(MenuError::BitVectorTooShort {
                kind: BitsKind::Hlt,
                required: self.required_hlt_width,
                got: hlt.len(),
            });
        }
        let event = self.nr_tot;

        for path in self.paths.iter_mut() {
            path.fill_results(l1_express, hlt, event, &mut self.diagnostics);
        }

        let paths: &[TriggerPath] = &self.paths;
        for group in self.groups.iter_mut() {
            group.fill(paths, event, &mut self.diagnostics);
        }

        for (col, cnt) in self.nr_passed.iter_mut().enumerate() {
            if paths
                .iter()
                .filter(|p| p.physics())
                .any(|p| p.result().get(col).is_some_and(|&res| res != 0))
            {
                *cnt += 1;
            }
        }

        self.nr_tot += 1;
        Ok(())
    }

    /// Add the counters of a menu that processed a different partition of the events.
    ///
    /// Both menus must have the same paths, groups and number of columns.
    pub fn merge(&mut self, other: &TriggerMenu) -> Result<(), MenuError> {
        if self.nr_columns != other.nr_columns {
            return Err(MenuError::MergeMismatch(
                format!(
                    "number of columns differ: {} vs {}",
                    self.nr_columns, other.nr_columns
                )
                .into(),
            ));
        }
        if self.paths.len() != other.paths.len()
            || self
                .paths
                .iter()
                .zip(&other.paths)
                .any(|(a, b)| a.name() != b.name())
        {
            return Err(MenuError::MergeMismatch("paths differ".into()));
        }
        if self.groups.len() != other.groups.len()
            || self
                .groups
                .iter()
                .zip(&other.groups)
                .any(|(a, b)| a.name() != b.name())
        {
            return Err(MenuError::MergeMismatch("groups differ".into()));
        }

        self.paths
            .iter_mut()
            .zip(&other.paths)
            .for_each(|(a, b)| a.merge_counts(b));
        self.groups
            .iter_mut()
            .zip(&other.groups)
            .for_each(|(a, b)| a.merge_counts(b));
        self.nr_passed
            .iter_mut()
            .zip(&other.nr_passed)
            .for_each(|(a, &b)| *a += b);
        self.nr_tot += other.nr_tot;
        self.diagnostics.merge(&other.diagnostics);
        Ok(())
    }

    /// Same menu with all counters zeroed and prescale counters back at their starting offset.
    ///
    /// Warnings raised at construction are not carried over.
    pub fn fresh_copy(&self) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.set_mute(self.diagnostics.is_muted());
        Self {
            paths: self.paths.iter().map(TriggerPath::fresh_copy).collect(),
            groups: self.groups.iter().map(TriggerGroup::fresh_copy).collect(),
            nr_columns: self.nr_columns,
            nr_passed: vec![0; self.nr_columns],
            nr_tot: 0,
            diagnostics,
            required_l1_width: self.required_l1_width,
            required_hlt_width: self.required_hlt_width,
        }
    }

    /// Set whether warnings are logged as they occur.
    pub fn set_mute_warnings(&mut self, mute: bool) {
        self.diagnostics.set_mute(mute);
    }

    /// All paths in evaluation order.
    pub fn paths(&self) -> &[TriggerPath] {
        &self.paths
    }

    /// Find a path by name.
    pub fn path(&self, name: &str) -> Option<&TriggerPath> {
        self.paths.iter().find(|p| p.name() == name)
    }

    /// All groups.
    pub fn groups(&self) -> &[TriggerGroup] {
        &self.groups
    }

    /// Global number of prescale columns.
    pub fn nr_columns(&self) -> usize {
        self.nr_columns
    }

    /// Number of events accepted by any physics path, per column.
    pub fn nr_passed(&self) -> &[u64] {
        &self.nr_passed
    }

    /// Number of events processed.
    pub fn nr_tot(&self) -> u64 {
        self.nr_tot
    }

    /// Warnings collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Minimum width of the L1 express vector.
    pub fn required_l1_width(&self) -> usize {
        self.required_l1_width
    }

    /// Minimum width of the HLT vector.
    pub fn required_hlt_width(&self) -> usize {
        self.required_hlt_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bits(s: &str) -> TrigBits {
        s.parse().unwrap()
    }

    fn muon_path(prescales: Vec<u32>, offset: u64) -> TriggerPath {
        TriggerPath::new("HLT_IsoMu24_v", 0, 0, prescales, vec![], true, offset)
    }

    #[test]
    fn test_single_path_scenario_default_offset() {
        let mut menu = TriggerMenu::new(
            vec![muon_path(vec![1, 2], super::super::DEFAULT_PS_COUNT_OFFSET)],
            vec![],
            2,
        )
        .unwrap();
        for event in 0..8 {
            let hlt = if event % 2 == 0 { "1" } else { "0" };
            menu.process_event(&bits("1"), &bits(hlt)).unwrap();
        }
        // psCount is 342, 344, 346, 348 on the accepted events
        assert_eq!(menu.paths()[0].nr_passed(), &[4, 4]);
        assert_eq!(menu.nr_passed(), &[4, 4]);
        assert_eq!(menu.nr_tot(), 8);
    }

    #[test]
    fn test_single_path_scenario_zero_offset() {
        let mut menu = TriggerMenu::new(vec![muon_path(vec![1, 2], 0)], vec![], 2).unwrap();
        for event in 0..8 {
            let hlt = if event % 2 == 0 { "1" } else { "0" };
            menu.process_event(&bits("1"), &bits(hlt)).unwrap();
        }
        assert_eq!(menu.paths()[0].nr_passed(), &[4, 0]);
        assert_eq!(menu.nr_tot(), 8);
    }

    #[test]
    fn test_group_counts_shared_event_once() {
        let paths = vec![
            TriggerPath::new("HLT_A_v", 0, 0, vec![1], vec![], true, 0),
            TriggerPath::new("HLT_B_v", 1, 1, vec![1], vec![], true, 0),
        ];
        let group = TriggerGroup::new(
            "AB",
            vec!["HLT_A_v".to_string(), "HLT_B_v".to_string()],
            vec![0, 1],
            1,
        );
        let mut menu = TriggerMenu::new(paths, vec![group], 1).unwrap();

        for _ in 0..3 {
            menu.process_event(&bits("11"), &bits("00")).unwrap();
        }
        assert_eq!(menu.groups()[0].nr_passed(), &[0]);
        menu.process_event(&bits("11"), &bits("11")).unwrap();
        assert_eq!(menu.groups()[0].nr_passed(), &[1]);
        assert_eq!(menu.paths()[0].nr_passed(), &[1]);
        assert_eq!(menu.paths()[1].nr_passed(), &[1]);
        assert_eq!(menu.nr_passed(), &[1]);
    }

    #[test]
    fn test_non_physics_paths_excluded_from_menu_total() {
        let paths = vec![
            TriggerPath::new("HLT_Phys_v", 0, 0, vec![1, 1], vec![], true, 0),
            TriggerPath::new("AlCa_Calib_v", 1, 1, vec![1, 1], vec![], false, 0),
        ];
        let group = TriggerGroup::new("Calib", vec![], vec![1], 2);
        let mut menu = TriggerMenu::new(paths, vec![group], 2).unwrap();

        menu.process_event(&bits("11"), &bits("01")).unwrap();
        menu.process_event(&bits("11"), &bits("11")).unwrap();
        menu.process_event(&bits("11"), &bits("10")).unwrap();

        assert_eq!(menu.paths()[1].nr_passed(), &[2, 2]);
        assert_eq!(menu.groups()[0].nr_passed(), &[2, 2]);
        assert_eq!(menu.nr_passed(), &[2, 2]);
    }

    #[test]
    fn test_menu_total_is_or_of_physics_paths() {
        let paths = vec![
            TriggerPath::new("HLT_A_v", 0, 0, vec![1], vec![], true, 0),
            TriggerPath::new("HLT_B_v", 1, 0, vec![1], vec![], true, 0),
            TriggerPath::new("MC_C_v", 2, 0, vec![1], vec![], false, 0),
        ];
        let mut menu = TriggerMenu::new(paths, vec![], 1).unwrap();
        let mut expected = 0;
        for word in 0..8u32 {
            let hlt: Vec<bool> = (0..3).map(|i| word >> i & 1 == 1).collect();
            if hlt[0] || hlt[1] {
                expected += 1;
            }
            menu.process_event(&bits("1"), &TrigBits::from_bools(&hlt))
                .unwrap();
            assert_eq!(menu.nr_passed(), &[expected]);
        }
    }

    #[test]
    fn test_too_short_vectors_fail_without_counting() {
        let paths = vec![TriggerPath::new("HLT_A_v", 3, 2, vec![1], vec![], true, 0)];
        let mut menu = TriggerMenu::new(paths, vec![], 1).unwrap();

        let err = menu.process_event(&bits("11"), &bits("1111")).unwrap_err();
        assert_eq!(
            err,
            MenuError::BitVectorTooShort {
                kind: BitsKind::L1Express,
                required: 3,
                got: 2
            }
        );
        let err = menu.process_event(&bits("111"), &bits("111")).unwrap_err();
        assert_eq!(
            err,
            MenuError::BitVectorTooShort {
                kind: BitsKind::Hlt,
                required: 4,
                got: 3
            }
        );
        assert_eq!(menu.nr_tot(), 0);
        assert_eq!(menu.paths()[0].ps_count(), 0);
    }

    #[test]
    fn test_construction_errors() {
        let dup = vec![
            TriggerPath::new("HLT_A_v", 0, 0, vec![1], vec![], true, 0),
            TriggerPath::new("HLT_A_v", 1, 0, vec![1], vec![], true, 0),
        ];
        assert_eq!(
            TriggerMenu::new(dup, vec![], 1).unwrap_err(),
            MenuError::DuplicatePathName("HLT_A_v".into())
        );

        let paths = vec![TriggerPath::new("HLT_A_v", 0, 0, vec![1], vec![], true, 0)];
        let group = TriggerGroup::new("Bad", vec![], vec![0, 4], 1);
        assert_eq!(
            TriggerMenu::new(paths, vec![group], 1).unwrap_err(),
            MenuError::GroupPathIndexOutOfRange {
                group: "Bad".into(),
                index: 4,
                nr_paths: 1
            }
        );
    }

    #[test]
    fn test_column_mismatch_reported_at_construction() {
        let paths = vec![
            TriggerPath::new("HLT_A_v", 0, 0, vec![1, 1], vec![], true, 0),
            TriggerPath::new("HLT_B_v", 1, 0, vec![1], vec![], true, 0),
        ];
        let menu = TriggerMenu::with_diagnostics(paths, vec![], 2, Diagnostics::muted()).unwrap();
        assert_eq!(menu.diagnostics().column_mismatches(), 1);
        assert_eq!(menu.diagnostics().stored()[0].event, None);
    }

    #[test]
    fn test_merge_of_partitions_equals_sequential() {
        let paths = vec![
            TriggerPath::new("HLT_A_v", 0, 0, vec![1, 0], vec![], true, 0),
            TriggerPath::new("HLT_B_v", 1, 1, vec![1, 1], vec![], true, 0),
        ];
        let group = TriggerGroup::new("AB", vec![], vec![0, 1], 2);
        let template = TriggerMenu::new(paths, vec![group], 2).unwrap();

        let events = [("10", "10"), ("01", "01"), ("11", "11"), ("00", "00"), ("11", "01")];
        let mut sequential = template.fresh_copy();
        for (l1, hlt) in events {
            sequential.process_event(&bits(l1), &bits(hlt)).unwrap();
        }

        let mut first = template.fresh_copy();
        let mut second = template.fresh_copy();
        for (l1, hlt) in &events[..2] {
            first.process_event(&bits(l1), &bits(hlt)).unwrap();
        }
        for (l1, hlt) in &events[2..] {
            second.process_event(&bits(l1), &bits(hlt)).unwrap();
        }
        let mut merged = template.fresh_copy();
        merged.merge(&first).unwrap();
        merged.merge(&second).unwrap();

        assert_eq!(merged.nr_tot(), sequential.nr_tot());
        assert_eq!(merged.nr_passed(), sequential.nr_passed());
        assert_eq!(
            merged.groups()[0].nr_passed(),
            sequential.groups()[0].nr_passed()
        );
        for (m, s) in merged.paths().iter().zip(sequential.paths()) {
            assert_eq!(m.nr_passed(), s.nr_passed());
            assert_eq!(m.nr_l1_passed(), s.nr_l1_passed());
        }
    }

    #[test]
    fn test_merge_mismatch() {
        let a = TriggerMenu::new(vec![muon_path(vec![1], 0)], vec![], 1).unwrap();
        let mut b = TriggerMenu::new(
            vec![TriggerPath::new("HLT_Other_v", 0, 0, vec![1], vec![], true, 0)],
            vec![],
            1,
        )
        .unwrap();
        assert!(matches!(b.merge(&a), Err(MenuError::MergeMismatch(_))));
    }
}
