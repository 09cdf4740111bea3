//! Contains the [Cfg] struct that parses and stores the command line arguments
//!
//! [Cfg] uses procedural macros from the `clap` library to implement most of the argument parsing and validation logic.
//! The [Cfg] struct implements several option traits, as well as convenience functions to get various parts of the configuration

use crate::util::*;
use clap::Parser;
use clap_complete::Shell;

pub mod inputoutput;
pub mod lib;
pub mod menu_opt;
pub mod prelude;
pub mod test_util;
pub mod util;

/// The [CONFIG] static variable is used to store the [Cfg] created from the parsed command line arguments
pub static CONFIG: OnceLock<Cfg> = OnceLock::new();

/// Default number of events read and dispatched together
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// The [Cfg] struct uses procedural macros and implements the [Config] trait, to provide convenient access to the command line arguments.
#[derive(Parser, Debug)]
#[command(name = "hltrate - trigger menu rate accounting")]
#[command(bin_name = "hltrate", version)]
#[command(about = "hltrate counts the events accepted by each path, dataset and prescale column of a trigger menu.")]
#[command(
    long_about = "\nhltrate counts the events accepted by each path, dataset and prescale column\n\
of a trigger menu, from the recorded L1 seed and HLT path decisions of each event.\n\
\n\
Events are read as text, one event per line: `<l1 bits> <hlt bits>`"
)]
#[command(propagate_version = true)]
pub struct Cfg {
    /// Events file (default: stdin)
    #[arg(name = "Events", value_hint = clap::ValueHint::FilePath)]
    file: Option<PathBuf>,

    /// Menu definition file (TOML or JSON)
    #[arg(
        short = 'm',
        long = "menu",
        visible_alias = "menu-file",
        required_unless_present = "generate_completions",
        value_hint = clap::ValueHint::FilePath
    )]
    menu: Option<PathBuf>,

    /// Verbosity level 0-4 (Errors, Warnings, Info, Debug, Trace)
    #[arg(short = 'v', long = "verbosity", default_value_t = 1)]
    verbosity: u8,

    /// Set the exit code for if any errors or warnings are detected in the input data (cannot be 0)
    #[arg(short = 'E', long = "any-errors-exit-code", visible_alias = "exit-code")]
    any_errors_exit_code: Option<u8>,

    /// Don't show warnings as they occur, they are still counted in the report
    #[arg(short = 'q', long, default_value_t = false)]
    mute_warnings: bool,

    /// Number of worker threads. Each worker evaluates its own copy of the menu on the batches it receives,
    /// prescale phases therefore only match a sequential run with a single worker
    #[arg(short = 'w', long, default_value_t = 1)]
    workers: usize,

    /// Number of events read and dispatched together
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Starting value of the prescale counters, overrides the value in the menu file
    #[arg(short = 'p', long, visible_alias = "ps-count-offset")]
    ps_offset: Option<u64>,

    /// Count how often every HLT path fires together with this path
    #[arg(short = 'c', long, visible_alias = "correlate-path")]
    correlate: Option<String>,

    /// Output stats (default: none), requires setting a data format option (JSON, TOML)
    #[arg(
        name = "OUTPUT FINAL STATS",
        short = 'S',
        long = "output-stats",
        default_value_t = DataOutputMode::None,
        visible_alias = "output-final-stats",
        requires = "STATS FORMAT",
    )]
    stats_output: DataOutputMode,

    /// Output stats format (JSON/TOML), requires setting a stats output option
    #[arg(
        name = "STATS FORMAT",
        short = 'D',
        long = "stats-format",
        visible_alias = "stats-data-format",
        requires = "OUTPUT FINAL STATS"
    )]
    stats_output_format: Option<DataOutputFormat>,

    /// Input stats file to read from and verify match with collected stats at end of processing.
    /// The file extension determines the format (JSON/TOML)
    #[arg(
        name = "INPUT STATS FILE",
        short = 'i',
        long = "input-stats-file",
        visible_aliases = ["input-stats", "verify-stats"],
        value_hint = clap::ValueHint::FilePath
    )]
    input_stats_file: Option<PathBuf>,

    /// Generate completion scripts for the specified shell.
    /// Note: The completion script is printed to stdout
    #[arg(
        long = "generate-completions",
        value_hint = clap::ValueHint::Other,
        value_name = "SHELL"
    )]
    pub generate_completions: Option<Shell>,
}

impl Cfg {
    /// Get a reference to the global config
    pub fn global() -> &'static Cfg {
        CONFIG.get().expect("Config is not initialized")
    }

    /// Generate completion scripts for the specified shell.
    pub fn generate_completion_script(shell: Shell) {
        clap_complete::generate(
            shell,
            &mut <Cfg as clap::CommandFactory>::command(),
            "hltrate",
            &mut io::stdout(),
        );
    }
}

/// Implementing the config super trait requires implementing all the sub traits
impl Config for Cfg {}

impl InputOutputOpt for Cfg {
    #[inline]
    fn input_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn stats_output_mode(&self) -> DataOutputMode {
        self.stats_output.clone()
    }

    fn stats_output_format(&self) -> Option<DataOutputFormat> {
        self.stats_output_format
    }

    fn input_stats_file(&self) -> Option<&Path> {
        self.input_stats_file.as_deref()
    }
}

impl UtilOpt for Cfg {
    #[inline]
    fn verbosity(&self) -> u8 {
        self.verbosity
    }
    fn any_errors_exit_code(&self) -> Option<u8> {
        self.any_errors_exit_code
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

impl MenuOpt for Cfg {
    fn menu_file(&self) -> &Path {
        // Only absent when generating completions, validated by clap
        self.menu.as_deref().unwrap_or(Path::new(""))
    }
    fn ps_offset(&self) -> Option<u64> {
        self.ps_offset
    }
    fn correlate(&self) -> Option<&str> {
        self.correlate.as_deref()
    }
}

/// Get the [config][super::config::Cfg] from the command line arguments and set the static [CONFIG] variable.
pub fn init_config() -> Result<(), String> {
    let cfg = <super::config::Cfg as clap::Parser>::parse();
    // Nothing else is needed to print completions
    if cfg.generate_completions.is_none() {
        cfg.validate_args()?;
    }
    CONFIG
        .set(cfg)
        .map_err(|_| "Config already initialized".to_string())?;
    Ok(())
}
