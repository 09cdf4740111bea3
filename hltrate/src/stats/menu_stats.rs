//! Contains [MenuStats], the serializable summary of the counters of a processed menu.
//!
//! [MenuStats] is what gets written with `--output-stats` and what an `--input-stats-file` is compared against.

use crate::menu::{RateCalculator, TrigType, TriggerGroup, TriggerPath};
use crate::pass_counts::PassCounts;
use crate::util::*;

/// Counters of a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStats {
    /// Path name
    pub name: String,
    /// Classification from the name prefix
    pub trig_type: TrigType,
    /// Whether the path counts toward the menu physics total
    pub physics: bool,
    /// Names of the L1 seeds
    pub l1_seeds: Vec<String>,
    /// Prescale per column
    pub prescales: Vec<u32>,
    /// Events where the L1 seed fired
    pub nr_l1_passed: u64,
    /// Accepted events per column
    pub nr_passed: Vec<u64>,
}

impl From<&TriggerPath> for PathStats {
    fn from(path: &TriggerPath) -> Self {
        Self {
            name: path.name().to_string(),
            trig_type: path.trig_type(),
            physics: path.physics(),
            l1_seeds: path.l1_seeds().to_vec(),
            prescales: path.prescales().to_vec(),
            nr_l1_passed: path.nr_l1_passed(),
            nr_passed: path.nr_passed().to_vec(),
        }
    }
}

impl PathStats {
    fn validate_other(&self, other: &Self) -> Result<(), Vec<String>> {
        // A compile error here means a new field also needs to be added to `validate_fields` below
        let Self {
            name: _,
            trig_type: _,
            physics: _,
            l1_seeds: _,
            prescales: _,
            nr_l1_passed: _,
            nr_passed: _,
        } = other;
        self.validate_fields(other).map_err(|errs| {
            errs.into_iter()
                .map(|e| format!("{e} (path {})", self.name))
                .collect()
        })
    }

    crate::validate_fields!(
        PathStats,
        name,
        trig_type,
        physics,
        l1_seeds,
        prescales,
        nr_l1_passed,
        nr_passed
    );
}

/// Counters of a single dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Dataset name
    pub name: String,
    /// Member path names
    pub paths: Vec<String>,
    /// Accepted events per column
    pub nr_passed: Vec<u64>,
}

impl From<&TriggerGroup> for GroupStats {
    fn from(group: &TriggerGroup) -> Self {
        Self {
            name: group.name().to_string(),
            paths: group.path_names().to_vec(),
            nr_passed: group.nr_passed().to_vec(),
        }
    }
}

impl GroupStats {
    fn validate_other(&self, other: &Self) -> Result<(), Vec<String>> {
        let Self {
            name: _,
            paths: _,
            nr_passed: _,
        } = other;
        self.validate_fields(other).map_err(|errs| {
            errs.into_iter()
                .map(|e| format!("{e} (dataset {})", self.name))
                .collect()
        })
    }

    crate::validate_fields!(GroupStats, name, paths, nr_passed);
}

/// Number of warnings of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningStats {
    /// `W01` prescale column count mismatches
    pub column_mismatches: u64,
    /// `W02` HLT accepts without L1 seed
    pub seedless_accepts: u64,
}

impl WarningStats {
    /// Total number of warnings.
    pub fn total(&self) -> u64 {
        self.column_mismatches + self.seedless_accepts
    }
}

/// Number of events where a path fired together with the reference path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoFiring {
    /// HLT path name
    pub path: String,
    /// Events where both fired
    pub count: u64,
}

/// Co-firing counts of all HLT paths with a reference path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationStats {
    /// The reference path
    pub reference: String,
    /// Events where the reference path fired
    pub total: u64,
    /// Paths that fired at least once with the reference path, in HLT bit order
    pub co_firing: Vec<CoFiring>,
}

impl CorrelationStats {
    /// Summarize `pass_counts` where bit `i` is the HLT path `hlt_paths[i]`.
    pub fn new(reference: &str, pass_counts: &PassCounts, hlt_paths: &[String]) -> Self {
        Self {
            reference: reference.to_string(),
            total: pass_counts.total(),
            co_firing: pass_counts
                .counts()
                .iter()
                .zip(hlt_paths)
                .filter(|(&count, _)| count > 0)
                .map(|(&count, path)| CoFiring {
                    path: path.clone(),
                    count,
                })
                .collect(),
        }
    }
}

/// Summary of a processed menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuStats {
    /// Events processed
    pub nr_tot: u64,
    /// Number of prescale columns
    pub nr_columns: usize,
    /// Events accepted by any physics path, per column
    pub nr_passed: Vec<u64>,
    /// Warnings raised while evaluating the menu
    pub warnings: WarningStats,
    /// Per path counters, in evaluation order
    pub paths: Vec<PathStats>,
    /// Per dataset counters
    pub groups: Vec<GroupStats>,
    /// Co-firing counts, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationStats>,
}

impl MenuStats {
    /// Collect the counters of a processed [RateCalculator].
    pub fn new(calc: &RateCalculator, correlation: Option<CorrelationStats>) -> Self {
        let menu = calc.menu();
        Self {
            nr_tot: menu.nr_tot(),
            nr_columns: menu.nr_columns(),
            nr_passed: menu.nr_passed().to_vec(),
            warnings: WarningStats {
                column_mismatches: menu.diagnostics().column_mismatches(),
                seedless_accepts: menu.diagnostics().seedless_accepts(),
            },
            paths: menu.paths().iter().map(PathStats::from).collect(),
            groups: menu.groups().iter().map(GroupStats::from).collect(),
            correlation,
        }
    }

    /// Fraction of all events accepted by the menu in column `col`, 0 if no events were processed.
    pub fn acceptance(&self, col: usize) -> f64 {
        if self.nr_tot == 0 {
            0.0
        } else {
            self.nr_passed.get(col).copied().unwrap_or(0) as f64 / self.nr_tot as f64
        }
    }

    /// Compare with stats from a previous run, every mismatching counter is described in the returned error.
    pub fn validate_other(&self, other: &Self) -> Result<(), Vec<String>> {
        // A compile error here means a new field also needs to be validated
        let Self {
            nr_tot: _,
            nr_columns: _,
            nr_passed: _,
            warnings: _,
            paths: other_paths,
            groups: other_groups,
            correlation: _,
        } = other;
        let mut errs = self.validate_fields(other).err().unwrap_or_default();

        if self.paths.len() == other_paths.len() {
            self.paths
                .iter()
                .zip(other_paths)
                .filter_map(|(a, b)| a.validate_other(b).err())
                .for_each(|path_errs| errs.extend(path_errs));
        } else {
            errs.push(format!(
                "[E9002] Number of paths mismatch: expected {}, found {}",
                other_paths.len(),
                self.paths.len()
            ));
        }

        if self.groups.len() == other_groups.len() {
            self.groups
                .iter()
                .zip(other_groups)
                .filter_map(|(a, b)| a.validate_other(b).err())
                .for_each(|group_errs| errs.extend(group_errs));
        } else {
            errs.push(format!(
                "[E9003] Number of datasets mismatch: expected {}, found {}",
                other_groups.len(),
                self.groups.len()
            ));
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs)
        }
    }

    crate::validate_fields!(
        MenuStats,
        nr_tot,
        nr_columns,
        nr_passed,
        warnings,
        correlation
    );

    /// Serialize and write the stats to file or stdout.
    pub fn write_stats(&self, mode: &DataOutputMode, format: DataOutputFormat) -> io::Result<()> {
        if *mode == DataOutputMode::None {
            return Ok(());
        }
        let stats_str = match format {
            DataOutputFormat::JSON => serde_json::to_string_pretty(&self)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            DataOutputFormat::TOML => toml::to_string_pretty(&self)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        };
        match mode {
            DataOutputMode::File(path) => fs::write(path, stats_str),
            DataOutputMode::Stdout => {
                let mut lock = io::stdout().lock();
                writeln!(lock, "{stats_str}")
            }
            DataOutputMode::None => Ok(()),
        }
    }

    /// Read stats written by [MenuStats::write_stats], the format is chosen from the file extension.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let stats_str = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&stats_str)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Some("toml") => {
                toml::from_str(&stats_str).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Invalid input stats file extension, must be .json or .toml (got: {})",
                    path.display()
                ),
            )),
        }
    }
}
