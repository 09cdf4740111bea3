//! Miscellaneous utility functions

use crate::config::prelude::*;
use std::sync::{atomic::AtomicBool, Arc};

/// Start the [stderrlog] instance, and immediately use it to log the configured stats [DataOutputMode].
pub fn init_error_logger(cfg: &(impl UtilOpt + InputOutputOpt + MenuOpt + std::fmt::Debug)) {
    if let Err(e) = stderrlog::new()
        .module("hltrate")
        .module("trig_event_reader")
        .verbosity(cfg.verbosity() as usize)
        .init()
    {
        eprintln!("Failed to initialize logger: {e}");
    }
    match cfg.stats_output_mode() {
        DataOutputMode::Stdout => log::trace!("Stats output set to stdout"),
        DataOutputMode::File(path) => log::trace!("Stats output set to file: {}", path.display()),
        DataOutputMode::None => log::trace!("Stats output set to suppressed"),
    }
    log::trace!("Starting hltrate with args: {cfg:#?}");
    log::trace!("Menu file: {}", cfg.menu_file().display());
}

/// Initializes the Ctrl+C handler to facilitate graceful shutdown on Ctrl+C
///
/// Also handles SIGTERM and SIGHUP if the `termination` feature is enabled
pub fn init_ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    // Handles SIGINT, SIGTERM and SIGHUP (as the `termination` feature is  enabled)
    if let Err(e) = ctrlc::set_handler({
        let mut stop_sig_count = 0;
        move || {
            log::warn!(
                "Stop Ctrl+C, SIGTERM, or SIGHUP received, stopping gracefully, please wait..."
            );
            stop_flag.store(true, std::sync::atomic::Ordering::SeqCst);
            stop_sig_count += 1;
            if stop_sig_count > 1 {
                log::warn!("Second stop signal received, ungraceful shutdown.");
                std::process::exit(1);
            }
        }
    }) {
        log::error!("Error setting Ctrl-C handler: {e}");
    }
}

/// Exits the program with the appropriate exit code
pub fn exit(
    exit_code: u8,
    any_errors_flag: &AtomicBool,
    config: &impl UtilOpt,
) -> std::process::ExitCode {
    if exit_code == 0 {
        log::debug!("Exit successful from event processing");
        match config.any_errors_exit_code() {
            Some(code) if any_errors_flag.load(std::sync::atomic::Ordering::Relaxed) => {
                std::process::ExitCode::from(code)
            }
            _ => std::process::ExitCode::SUCCESS,
        }
    } else {
        std::process::ExitCode::from(exit_code)
    }
}
