//! Contains the [MenuCfg] menu definition file format and [build_menu], which turns it into a ready to use [RateCalculator].
//!
//! The menu file is TOML or JSON, chosen by the file extension.
//!
//! # Example
//! ```toml
//! ps_count_offset = 341
//! hlt_paths = ["HLT_IsoMu24_v13", "HLT_Ele32_WPTight_Gsf_v15", "AlCa_EcalPhiSym_v9"]
//!
//! [l1_seeds]
//! L1_SingleMu22 = 0
//! L1_SingleEG36er2p5 = 1
//! L1_ZeroBias = 2
//!
//! [[paths]]
//! name = "HLT_IsoMu24_v"
//! datasets = ["SingleMuon"]
//! l1_seeds = ["L1_SingleMu22"]
//! prescales = [1, 1, 2]
//!
//! [[paths]]
//! name = "AlCa_EcalPhiSym_v"
//! datasets = ["AlCaPhiSym"]
//! l1_seeds = ["L1_ZeroBias"]
//! prescales = [10, 0, 0]
//! physics = false
//! ```

use crate::menu::{
    Diagnostics, MenuError, RateCalculator, SeedIndexResolver, TriggerGroup, TriggerMenu,
    TriggerPath, DEFAULT_PS_COUNT_OFFSET,
};
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;
use std::sync::OnceLock;

/// Seed key of paths that need no L1 seed.
const NO_SEED_KEY: &str = "None";

fn default_ps_count_offset() -> u64 {
    DEFAULT_PS_COUNT_OFFSET
}

fn default_true() -> bool {
    true
}

/// A complete menu definition as read from file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCfg {
    /// Starting value of the prescale counters
    #[serde(default = "default_ps_count_offset")]
    pub ps_count_offset: u64,
    /// HLT path names in the order of the HLT bits
    pub hlt_paths: Vec<String>,
    /// L1 seed name to raw L1 bit index
    #[serde(default)]
    pub l1_seeds: BTreeMap<String, usize>,
    /// The paths of the menu, in evaluation order
    #[serde(default)]
    pub paths: Vec<PathCfg>,
}

/// Definition of a single path in a [MenuCfg].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCfg {
    /// Path name, the version suffix is optional
    pub name: String,
    /// Datasets (groups) the path belongs to
    #[serde(default)]
    pub datasets: Vec<String>,
    /// L1 seeds ORed together, empty if no seed is required
    #[serde(default)]
    pub l1_seeds: Vec<String>,
    /// Prescale per column
    pub prescales: Vec<u32>,
    /// Whether the path counts toward the menu physics total
    #[serde(default = "default_true")]
    pub physics: bool,
    /// Force all prescales to 0
    #[serde(default)]
    pub disable: bool,
}

impl MenuCfg {
    /// Index of the HLT bit of the path called `name`, version suffixes are ignored.
    pub fn hlt_index(&self, name: &str) -> Option<usize> {
        let name = strip_path_version(name);
        self.hlt_paths
            .iter()
            .position(|hlt_path| strip_path_version(hlt_path) == name)
    }

    /// Number of prescale columns: the length of the first non-empty prescale list.
    pub fn nr_columns(&self) -> usize {
        self.paths
            .iter()
            .map(|p| p.prescales.len())
            .find(|&len| len > 0)
            .unwrap_or(0)
    }
}

/// Reads a [MenuCfg] from a `.toml` or `.json` file.
pub fn load_menu_cfg(path: &Path) -> io::Result<MenuCfg> {
    let menu_str = std::fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&menu_str).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to parse menu file {}: {e}", path.display()),
            )
        }),
        Some("json") => serde_json::from_str(&menu_str).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to parse menu file {}: {e}", path.display()),
            )
        }),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Menu file must have a .toml or .json extension (got: {})",
                path.display()
            ),
        )),
    }
}

/// Replaces a trailing version suffix `_v<digits>` with `_v`, e.g. `HLT_Mu50_v12` becomes `HLT_Mu50_v`.
pub fn strip_path_version(name: &str) -> Cow<'_, str> {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE
        .get_or_init(|| Regex::new(r"_v[0-9]+\z").expect("Invalid path version regex"))
        .replace(name, "_v")
}

/// Builds the [SeedIndexResolver] and [TriggerMenu] described by `cfg`.
///
/// Each distinct list of L1 seeds gets one express bit, in order of first appearance.
/// Each distinct dataset becomes a [TriggerGroup], in order of first appearance, with its paths in declaration order.
/// `ps_offset_override` takes precedence over the offset in the file.
pub fn build_menu(
    cfg: &MenuCfg,
    ps_offset_override: Option<u64>,
    diagnostics: Diagnostics,
) -> Result<RateCalculator, MenuError> {
    let ps_count_offset = ps_offset_override.unwrap_or(cfg.ps_count_offset);
    let nr_columns = cfg.nr_columns();
    log::debug!(
        "Building menu with {} paths, {nr_columns} prescale columns, prescale counter offset {ps_count_offset}",
        cfg.paths.len()
    );

    let mut express_keys: HashMap<String, usize> = HashMap::new();
    let mut seed_names: Vec<Vec<String>> = Vec::new();
    let mut seed_indices: Vec<Vec<usize>> = Vec::new();
    let mut paths = Vec::with_capacity(cfg.paths.len());

    for path_cfg in &cfg.paths {
        let hlt_index = cfg
            .hlt_index(&path_cfg.name)
            .ok_or_else(|| MenuError::UnknownHltPath(path_cfg.name.as_str().into()))?;

        let seed_key = if path_cfg.l1_seeds.is_empty() {
            NO_SEED_KEY.to_string()
        } else {
            path_cfg.l1_seeds.join(":")
        };
        let l1_seed_index = match express_keys.get(&seed_key) {
            Some(&idx) => idx,
            None => {
                let raw_indices = path_cfg
                    .l1_seeds
                    .iter()
                    .map(|seed| {
                        cfg.l1_seeds
                            .get(seed)
                            .copied()
                            .ok_or_else(|| MenuError::UnknownL1Seed {
                                path: path_cfg.name.as_str().into(),
                                seed: seed.as_str().into(),
                            })
                    })
                    .collect::<Result<Vec<usize>, MenuError>>()?;
                let idx = seed_indices.len();
                seed_indices.push(raw_indices);
                seed_names.push(path_cfg.l1_seeds.clone());
                let _ = express_keys.insert(seed_key, idx);
                idx
            }
        };

        let prescales = if path_cfg.disable {
            vec![0; path_cfg.prescales.len()]
        } else {
            path_cfg.prescales.clone()
        };

        paths.push(TriggerPath::new(
            path_cfg.name.clone(),
            hlt_index,
            l1_seed_index,
            prescales,
            path_cfg.l1_seeds.clone(),
            path_cfg.physics,
            ps_count_offset,
        ));
    }

    let groups: Vec<TriggerGroup> = cfg
        .paths
        .iter()
        .flat_map(|p| p.datasets.iter())
        .unique()
        .map(|dataset| {
            let (path_names, path_indices): (Vec<String>, Vec<usize>) = cfg
                .paths
                .iter()
                .enumerate()
                .filter(|(_, p)| p.datasets.contains(dataset))
                .map(|(idx, p)| (p.name.clone(), idx))
                .unzip();
            TriggerGroup::new(dataset.clone(), path_names, path_indices, nr_columns)
        })
        .collect();

    log::debug!(
        "{} L1 express bits, {} datasets",
        seed_indices.len(),
        groups.len()
    );

    let menu = TriggerMenu::with_diagnostics(paths, groups, nr_columns, diagnostics)?;
    Ok(RateCalculator::new(
        SeedIndexResolver::with_names(seed_names, seed_indices),
        menu,
    ))
}
