//! Contains the [Controller] that collects stats and reports errors.
//! It also controls the stop flag, which is raised to stop all other threads if a fatal error occurs.
//! Finally when the event loop breaks (at the end of execution), it prints the report, writes the stats output and validates the input stats.
//!
//! Also contains the convenience [init_controller] function, which spawns a thread with the [Controller] running, and returns the thread handle, the channel to send stats to, and the stop flag.

use crate::util::*;

/// Spawns a thread with the [Controller] running, and returns the thread handle, the channel to send stats to, the stop flag and the any errors flag.
pub fn init_controller<C: Config + 'static>(
    config: &'static C,
) -> io::Result<(
    JoinHandle<()>,
    flume::Sender<StatType>,
    Arc<AtomicBool>,
    Arc<AtomicBool>,
)> {
    log::trace!("Initializing stats controller");
    let mut controller = Controller::new(config);
    let stats_send_chan = controller.send_channel();
    let thread_stop_flag = controller.end_processing_flag();
    let any_errors_flag = controller.any_errors_flag();

    let stats_thread = Builder::new()
        .name("stats_thread".to_string())
        .spawn(move || {
            controller.run();
        })?;
    Ok((
        stats_thread,
        stats_send_chan,
        thread_stop_flag,
        any_errors_flag,
    ))
}

/// The Controller receives stats and builds a summary report that is printed at the end of execution.
#[derive(Debug)]
pub struct Controller<C: Config + 'static> {
    /// Time from [Controller] is instantiated, to all processing threads disconnected their [StatType] producer channel.
    pub processing_time: Instant,
    config: &'static C,
    events_read: u64,
    events_processed: u64,
    errors: Vec<Box<str>>,
    fatal_error: Option<Box<str>>,
    menu_stats: Option<Box<MenuStats>>,
    // The channel where stats are received from other threads.
    stats_recv_chan: flume::Receiver<StatType>,
    // Set to None when the event loop starts, the loop breaks once every producer dropped its sender.
    stats_send_chan: Option<flume::Sender<StatType>>,
    end_processing_flag: Arc<AtomicBool>,
    any_errors_flag: Arc<AtomicBool>,
    spinner: Option<ProgressBar>,
    spinner_message: String,
}

impl<C: Config + 'static> Controller<C> {
    /// Creates a new [Controller] from a [Config].
    pub fn new(global_config: &'static C) -> Self {
        let (stats_send_chan, stats_recv_chan): (
            flume::Sender<StatType>,
            flume::Receiver<StatType>,
        ) = flume::unbounded();
        Controller {
            processing_time: Instant::now(),
            config: global_config,
            events_read: 0,
            events_processed: 0,
            errors: Vec::new(),
            fatal_error: None,
            menu_stats: None,
            stats_recv_chan,
            stats_send_chan: Some(stats_send_chan),
            end_processing_flag: Arc::new(AtomicBool::new(false)),
            any_errors_flag: Arc::new(AtomicBool::new(false)),
            spinner: if global_config.verbosity() > 2 {
                // Spinner would be overwritten by the debug log lines
                None
            } else {
                new_styled_spinner()
            },
            spinner_message: String::new(),
        }
    }

    /// Returns a clone of the channel that is used to send stats to the Controller.
    ///
    /// # Panics
    /// If called after [Controller::run] started.
    pub fn send_channel(&self) -> flume::Sender<StatType> {
        match &self.stats_send_chan {
            Some(chan) => chan.clone(),
            None => panic!("Controller send channel is none, most likely it is already running and does not accept new producers"),
        }
    }

    /// Returns a cloned reference to the end processing flag.
    pub fn end_processing_flag(&self) -> Arc<AtomicBool> {
        self.end_processing_flag.clone()
    }

    /// Returns a cloned reference to the any errors flag
    ///
    /// The flag is set if there's any errors or warnings at end of processing.
    pub fn any_errors_flag(&self) -> Arc<AtomicBool> {
        self.any_errors_flag.clone()
    }

    /// Starts the event loop for the Controller
    /// This function will block until the channel is closed
    pub fn run(&mut self) {
        self.stats_send_chan = None;

        while let Ok(stats_update) = self.stats_recv_chan.recv() {
            self.update(stats_update);
        }

        if self.config.stats_output_mode() == DataOutputMode::Stdout {
            log::info!("Stats output is being piped, skipping report summary printout.")
        } else if self.menu_stats.is_some() || self.fatal_error.is_some() {
            self.new_spinner_with_prefix("Generating report".to_string());
            self.print();
        }

        let any_warnings = self
            .menu_stats
            .as_ref()
            .is_some_and(|stats| stats.warnings.total() > 0);
        if !self.errors.is_empty() || self.fatal_error.is_some() || any_warnings {
            self.any_errors_flag.store(true, Ordering::SeqCst);
        }

        let Some(menu_stats) = self.menu_stats.take() else {
            log::debug!("No menu stats received, skipping stats output");
            return;
        };

        if let Some(format) = self.config.stats_output_format() {
            if let Err(e) = menu_stats.write_stats(&self.config.stats_output_mode(), format) {
                log::error!("Failed writing stats output: {e}");
                self.any_errors_flag.store(true, Ordering::SeqCst);
            }
        }

        // User supplied a stats file to compare against, validate the match
        if let Some(input_stats) = self.config.input_stats_file() {
            log::info!("Validating input stats file against collected stats");
            match MenuStats::from_file(input_stats) {
                Ok(input_menu_stats) => {
                    if let Err(mismatches) = menu_stats.validate_other(&input_menu_stats) {
                        mismatches.iter().for_each(|e| log::error!("{e}"));
                        self.any_errors_flag.store(true, Ordering::SeqCst);
                        log::warn!("Input stats did not match collected stats");
                    } else {
                        log::info!("Input stats matched collected stats");
                    }
                }
                Err(e) => {
                    log::error!("Failed reading input stats file: {e}");
                    self.any_errors_flag.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    fn update(&mut self, stat: StatType) {
        match stat {
            StatType::EventsRead(cnt) => self.events_read += u64::from(cnt),
            StatType::EventsProcessed(cnt) => {
                self.events_processed += u64::from(cnt);
                if let Some(spinner) = &self.spinner {
                    spinner.set_prefix(format!("Processed {} events", self.events_processed));
                }
            }
            StatType::MenuStats(menu_stats) => {
                log::debug!("Menu stats received for {} events", menu_stats.nr_tot);
                self.menu_stats = Some(menu_stats);
            }
            StatType::Error(msg) => {
                if self.fatal_error.is_some() {
                    log::trace!("Fatal error already seen, ignoring error: {msg}");
                    return;
                }
                crate::display_error(&msg);
                self.errors.push(msg);
                self.set_spinner_msg(
                    format!("{err_cnt} Errors in data!", err_cnt = self.errors.len())
                        .red()
                        .to_string(),
                );
            }
            StatType::Fatal(err) => {
                if self.fatal_error.is_some() {
                    log::trace!("Fatal error already seen, ignoring error: {err}");
                    return;
                }
                self.end_processing_flag.store(true, Ordering::SeqCst);
                log::error!("FATAL: {err}\nShutting down...");
                self.fatal_error = Some(err);
            }
        }
    }

    /// Builds and prints the report
    fn print(&mut self) {
        let mut report = Report::new(self.processing_time.elapsed());
        if let Some(fatal_error) = &self.fatal_error {
            report.add_fatal_error(fatal_error.to_string());
        }
        self.add_global_stats_to_report(&mut report);
        if let Some(menu_stats) = &self.menu_stats {
            report.add_menu_stats(menu_stats);
        }

        self.append_spinner_msg("... completed");
        if let Some(spinner) = &self.spinner {
            spinner.abandon();
        }

        let mut lock = io::stdout().lock();
        if let Err(e) = writeln!(lock, "{}", report.format()) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                log::warn!("Broken pipe, stdout was closed before report could be written");
            } else {
                log::error!("Failed to write report to stdout: {e}");
            }
        }
    }

    fn add_global_stats_to_report(&self, report: &mut Report) {
        if self.errors.is_empty() {
            report.add_stat(StatSummary::new(
                "Total Errors".green().to_string(),
                "0".green().to_string(),
                None,
            ));
        } else {
            report.add_stat(StatSummary::new(
                "Total Errors".red().to_string(),
                self.errors.len().red().to_string(),
                None,
            ));
        }
        if let Some(menu_stats) = &self.menu_stats {
            let warnings = menu_stats.warnings;
            report.add_stat(StatSummary::new(
                "Total Warnings".to_string(),
                warnings.total().to_string(),
                (warnings.total() > 0).then(|| {
                    format!(
                        "W01: {}, W02: {}",
                        warnings.column_mismatches, warnings.seedless_accepts
                    )
                }),
            ));
        }
        report.add_stat(StatSummary::new(
            "Events read".to_string(),
            self.events_read.to_string(),
            None,
        ));
        report.add_stat(StatSummary::new(
            "Events processed".to_string(),
            self.events_processed.to_string(),
            None,
        ));
        if let Some(menu_stats) = &self.menu_stats {
            report.add_stat(StatSummary::new(
                "Prescale columns".to_string(),
                menu_stats.nr_columns.to_string(),
                None,
            ));
            report.add_stat(StatSummary::new(
                "Paths".to_string(),
                menu_stats.paths.len().to_string(),
                Some(format!(
                    "{} physics",
                    menu_stats.paths.iter().filter(|p| p.physics).count()
                )),
            ));
        }
    }

    /// Add completed message to current spinner and abandon it
    /// Replace it with new spinner with an empty message
    /// Set the new spinners prefix message
    fn new_spinner_with_prefix(&mut self, prefix: String) {
        if self.spinner.is_none() {
            return;
        }
        self.append_spinner_msg("... completed");
        if let Some(spinner) = &self.spinner {
            spinner.abandon();
        }
        self.spinner = new_styled_spinner();
        self.spinner_message = String::new();
        if let Some(spinner) = &self.spinner {
            spinner.set_prefix(prefix);
        }
    }

    fn set_spinner_msg(&mut self, new_msg: String) {
        if let Some(spinner) = &self.spinner {
            self.spinner_message = new_msg;
            spinner.set_message(self.spinner_message.clone());
        }
    }

    fn append_spinner_msg(&mut self, to_append: &str) {
        if let Some(spinner) = &self.spinner {
            self.spinner_message = self.spinner_message.clone() + to_append + " ";
            spinner.set_message(self.spinner_message.clone());
        }
    }
}

fn new_styled_spinner() -> Option<ProgressBar> {
    let spinner_style =
        match ProgressStyle::with_template("{spinner} [ {prefix:.bold.blue} ] {wide_msg}") {
            Ok(style) => style.tick_strings(&[
                "▹▹▹▹▹",
                "▸▹▹▹▹",
                "▹▸▹▹▹",
                "▹▹▸▹▹",
                "▹▹▹▸▹",
                "▹▹▹▹▸",
                "▪▪▪▪▪",
            ]),
            Err(e) => {
                log::debug!("Invalid spinner template: {e}");
                return None;
            }
        };
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}
