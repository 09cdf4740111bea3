#![warn(unused_extern_crates)]
#![warn(missing_docs)]
#![warn(missing_copy_implementations)]
// Readability lints
#![warn(
    clippy::option_filter_map,
    clippy::manual_filter_map,
    clippy::if_not_else,
    clippy::nonminimal_bool,
    clippy::single_match_else,
    clippy::range_plus_one,
    clippy::int_plus_one,
    clippy::needless_range_loop,
    clippy::needless_continue,
    clippy::shadow_same,
    clippy::shadow_unrelated
)]
// Performance lints
#![warn(variant_size_differences)]
#![warn(
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,
    clippy::mutex_integer,
    clippy::mem_forget,
    clippy::maybe_infinite_iter
)]
// Safety lints
#![warn(unused_results)]
#![warn(unused_import_braces)]
#![warn(trivial_casts, trivial_numeric_casts)]
// Unhandled results (allow unwrap and expect as there are many cases where the unwrap is totally safe)
#![warn(clippy::map_unwrap_or)]

//! hltrate: trigger menu rate accounting.
//!
//! Counts, for every path, prescale column and dataset of a trigger menu, how many events would have been accepted,
//! given the recorded L1 seed and HLT path decisions of each event.
//!
//! # Usage
//!
//! ## Count the accepted events of a menu
//! ```shell
//! $ hltrate events.txt --menu menu.toml
//! ```
//!
//! ## Read events from stdin, with the historical prescale phase replaced by 0
//! ```shell
//! $ cat events.txt | hltrate -m menu.toml --ps-offset 0
//! ```
//!
//! ## Count which HLT paths fire together with a reference path
//! ```shell
//! $ hltrate events.txt -m menu.toml --correlate HLT_IsoMu24_v
//! ```
//!
//! ## Write the counters as JSON and compare them with a previous run
//! ```shell
//! $ hltrate events.txt -m menu.toml -S stats.json -D json
//! $ hltrate events.txt -m menu.toml -i stats.json -E 3
//! ```
//!
//! ## Split the events over 4 workers
//! Each worker evaluates its own copy of the menu and the counters are summed at the end.
//! ```shell
//! $ hltrate events.txt -m menu.toml -w 4 -b 10000
//! ```

/// Write an error message to stderr.
/// All error messages should be written through this function to ensure consistency.
#[inline]
pub fn display_error(err_msg: &str) {
    log::error!("{}", owo_colors::OwoColorize::red(&err_msg));
}

pub mod config;
pub mod controller;
pub mod init;
pub mod menu;
pub mod menu_cfg;
pub mod pass_counts;
pub mod process;
pub mod stats;
pub mod util;
