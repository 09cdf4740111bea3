//! Contains the [run] function that is the entry point for hltrate
use crate::util::lib::{exit, init_ctrlc_handler, init_error_logger};
use crate::{config::init_config, controller::init_controller, process::init_processing, util::*};

/// Entry point for hltrate
pub fn run() -> ExitCode {
    human_panic::setup_panic!();

    if let Err(e) = init_config() {
        eprintln!("{e}");
        return ExitCode::from(1);
    };

    init_error_logger(Cfg::global());

    if let Some(shell) = Cfg::global().generate_completions {
        Cfg::generate_completion_script(shell);
        log::warn!("Completions generated for {shell:?}. Exiting...");
        return ExitCode::from(0);
    }

    // Launch controller thread
    // If a fatal error occurs, the controller thread signals every other thread to stop
    let (controller, stat_send_chan, stop_flag, any_errors_flag) =
        match init_controller(Cfg::global()) {
            Ok(controller) => controller,
            Err(e) => {
                crate::display_error(&format!("Failed to start stats thread: {e}"));
                return ExitCode::from(1);
            }
        };

    // Handles SIGINT, SIGTERM and SIGHUP (as the `termination` feature is  enabled)
    init_ctrlc_handler(stop_flag.clone());

    let exit_code: u8 = match init_reader(Cfg::global().input_file()) {
        Ok(readable) => match init_processing(Cfg::global(), readable, stat_send_chan, stop_flag) {
            Ok(()) => 0,
            Err(e) => {
                crate::display_error(&format!("Init processing failed: {e}"));
                1
            }
        },
        Err(e) => {
            let _ = stat_send_chan.send(StatType::Fatal(e.to_string().into()));
            drop(stat_send_chan);
            1
        }
    };

    if controller.join().is_err() {
        log::error!("Failed to join stats thread");
    }

    exit(exit_code, &any_errors_flag, Cfg::global())
}
