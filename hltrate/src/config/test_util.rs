#![allow(missing_docs)]

use crate::util::*;

#[derive(Debug, Clone)]
/// Complete configurable Mock config for testing
pub struct MockConfig {
    pub verbosity: u8,
    pub input_file: Option<PathBuf>,
    pub exit_code_any_errors: Option<u8>,
    pub mute_warnings: bool,
    pub workers: usize,
    pub batch_size: usize,
    pub menu_file: PathBuf,
    pub ps_offset: Option<u64>,
    pub correlate: Option<String>,
    pub stats_output_mode: DataOutputMode,
    pub stats_output_format: Option<DataOutputFormat>,
    pub stats_input_file: Option<PathBuf>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConfig {
    pub fn new() -> Self {
        Self {
            verbosity: 0,
            input_file: Some(PathBuf::from("../tests/test-data/events.txt")),
            exit_code_any_errors: None,
            mute_warnings: true,
            workers: 1,
            batch_size: 4,
            menu_file: PathBuf::from("../tests/test-data/menu.toml"),
            ps_offset: None,
            correlate: None,
            stats_output_mode: DataOutputMode::None,
            stats_output_format: None,
            stats_input_file: None,
        }
    }
}

impl Config for MockConfig {}

impl UtilOpt for MockConfig {
    fn verbosity(&self) -> u8 {
        self.verbosity
    }
    fn any_errors_exit_code(&self) -> Option<u8> {
        self.exit_code_any_errors
    }
    fn mute_warnings(&self) -> bool {
        self.mute_warnings
    }
    fn workers(&self) -> usize {
        self.workers
    }
    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl InputOutputOpt for MockConfig {
    fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }
    fn stats_output_mode(&self) -> DataOutputMode {
        self.stats_output_mode.clone()
    }
    fn stats_output_format(&self) -> Option<DataOutputFormat> {
        self.stats_output_format
    }
    fn input_stats_file(&self) -> Option<&Path> {
        self.stats_input_file.as_deref()
    }
}

impl MenuOpt for MockConfig {
    fn menu_file(&self) -> &Path {
        &self.menu_file
    }
    fn ps_offset(&self) -> Option<u64> {
        self.ps_offset
    }
    fn correlate(&self) -> Option<&str> {
        self.correlate.as_deref()
    }
}
