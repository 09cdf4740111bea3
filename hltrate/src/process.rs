//! Contains [init_processing], which builds the menu from the configured menu file and drives the events through it.
//!
//! Events are read in batches by the reader thread and evaluated by one or more worker threads,
//! each owning its own [RateCalculator] (and [PassCounts] if correlation is requested).
//! When all events are consumed, the partial counters are merged in worker order and the resulting [MenuStats] are sent to the [Controller](crate::controller::Controller).

use crate::menu::MenuError;
use crate::menu_cfg::{build_menu, load_menu_cfg};
use crate::stats::menu_stats::CorrelationStats;
use crate::util::*;
use crossbeam_channel::Receiver;

/// The counters owned by a single worker.
#[derive(Debug)]
struct WorkerState {
    calc: RateCalculator,
    pass_counts: Option<PassCounts>,
}

impl WorkerState {
    fn fresh_copy(&self) -> Self {
        Self {
            calc: self.calc.fresh_copy(),
            pass_counts: self.pass_counts.as_ref().map(PassCounts::fresh_copy),
        }
    }

    /// Both widths are checked before either accumulator is updated.
    fn process_event(&mut self, event: &TrigEvent) -> Result<(), MenuError> {
        if let Some(pass_counts) = self.pass_counts.as_ref() {
            pass_counts.check_width(&event.hlt)?;
        }
        self.calc.process_event(event)?;
        if let Some(pass_counts) = self.pass_counts.as_mut() {
            pass_counts.add(&event.hlt)?;
        }
        Ok(())
    }

    fn merge(&mut self, other: &WorkerState) -> Result<(), MenuError> {
        self.calc.merge(&other.calc)?;
        match (self.pass_counts.as_mut(), other.pass_counts.as_ref()) {
            (Some(pass_counts), Some(other_counts)) => pass_counts.merge(other_counts),
            (None, None) => Ok(()),
            _ => Err(MenuError::MergeMismatch(
                "only one side has pass counts".into(),
            )),
        }
    }
}

/// Does the initial setup for event processing
///
/// Follows these steps:
/// 1. Load the menu file and build the [RateCalculator] from it.
/// 2. Setup reading (`file` or `stdin`) with [spawn_reader].
/// 3. Spawn the workers and merge their results when the input is exhausted.
/// 4. Send the final [MenuStats] to the stats channel.
#[allow(clippy::needless_pass_by_value)] // The sender has to be dropped when processing is done for the controller to finish
pub fn init_processing(
    config: &'static impl Config,
    reader: Box<dyn io::BufRead + Send>,
    stat_send: flume::Sender<StatType>,
    stop_flag: Arc<AtomicBool>,
) -> io::Result<()> {
    let menu_cfg = load_menu_cfg(config.menu_file())?;

    let diagnostics = if config.mute_warnings() {
        Diagnostics::muted()
    } else {
        Diagnostics::default()
    };
    let calc = build_menu(&menu_cfg, config.ps_offset(), diagnostics)?;
    log::info!(
        "Menu loaded: {} paths, {} datasets, {} prescale columns",
        calc.menu().paths().len(),
        calc.menu().groups().len(),
        calc.menu().nr_columns()
    );

    let pass_counts = match config.correlate() {
        Some(reference) => {
            let trig_bit = menu_cfg.hlt_index(reference).ok_or_else(|| {
                io::Error::from(MenuError::UnknownHltPath(reference.into()))
            })?;
            Some(PassCounts::new(trig_bit, menu_cfg.hlt_paths.len()))
        }
        None => None,
    };

    let state = WorkerState { calc, pass_counts };
    let state = process(config, state, reader, &stat_send, stop_flag)?;

    let correlation = config.correlate().and_then(|reference| {
        state
            .pass_counts
            .as_ref()
            .map(|counts| CorrelationStats::new(reference, counts, &menu_cfg.hlt_paths))
    });
    let menu_stats = MenuStats::new(&state.calc, correlation);
    if stat_send
        .send(StatType::MenuStats(Box::new(menu_stats)))
        .is_err()
    {
        log::error!("Stats channel closed before the menu stats could be sent");
    }
    Ok(())
}

/// Reads all events and evaluates them with `config.workers()` copies of `state`.
///
/// Returns `state` with the counters of every worker merged into it.
fn process<R: io::BufRead + Send + 'static>(
    config: &'static impl Config,
    mut state: WorkerState,
    reader: R,
    stat_send: &flume::Sender<StatType>,
    stop_flag: Arc<AtomicBool>,
) -> io::Result<WorkerState> {
    let (input_stats_send, input_stats_recv): (
        flume::Sender<InputStatType>,
        flume::Receiver<InputStatType>,
    ) = flume::unbounded();
    let scanner = EventScanner::new(reader, Some(input_stats_send));

    // 1. Launch reader thread to read events from file or stdin
    let (reader_handle, batch_recv) =
        spawn_reader(stop_flag.clone(), scanner, config.batch_size());

    // 2. Launch the workers, each with its own zeroed copy of the counters
    if config.workers() > 1 {
        log::info!(
            "Processing with {} workers, prescale phases depend on how batches are distributed",
            config.workers()
        );
    }
    let worker_handles = (0..config.workers())
        .map(|worker_id| {
            spawn_worker(
                worker_id,
                state.fresh_copy(),
                batch_recv.clone(),
                stat_send.clone(),
                stop_flag.clone(),
            )
        })
        .collect::<io::Result<Vec<_>>>()?;
    drop(batch_recv);

    // Breaks when the reader thread drops the scanner
    forward_input_stats_to_stats_collector(&input_stats_recv, stat_send);
    if reader_handle.join().is_err() {
        log::error!("Reader thread terminated early");
        stop_flag.store(true, Ordering::SeqCst);
        let _ = stat_send.send(StatType::Fatal(
            "Reader thread terminated early, not all events were read".into(),
        ));
    }

    // 3. Merge in spawn order
    merge_workers(&mut state, worker_handles, stat_send)?;
    Ok(state)
}

/// Joins the workers in spawn order and adds their counters to `state`.
///
/// A worker that panicked is reported as fatal, the events it held are missing from the counts.
fn merge_workers(
    state: &mut WorkerState,
    worker_handles: Vec<JoinHandle<WorkerState>>,
    stat_send: &flume::Sender<StatType>,
) -> Result<(), MenuError> {
    for (worker_id, handle) in worker_handles.into_iter().enumerate() {
        match handle.join() {
            Ok(worker_state) => state.merge(&worker_state)?,
            Err(e) => {
                log::error!("Worker-{worker_id} terminated early: {e:?}");
                let _ = stat_send.send(StatType::Fatal(
                    format!("Worker-{worker_id} terminated early, its events are missing from the counts")
                        .into(),
                ));
            }
        }
    }
    Ok(())
}

fn spawn_worker(
    worker_id: usize,
    mut state: WorkerState,
    batch_recv: Receiver<EventBatch>,
    stat_send: flume::Sender<StatType>,
    stop_flag: Arc<AtomicBool>,
) -> io::Result<JoinHandle<WorkerState>> {
    Builder::new()
        .name(format!("Worker-{worker_id}"))
        .spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                let Ok(batch) = batch_recv.recv() else {
                    // Reader is done
                    break;
                };
                let mut processed: u32 = 0;
                for event in &batch {
                    if let Err(e) = state.process_event(event) {
                        stop_flag.store(true, Ordering::SeqCst);
                        let _ = stat_send.send(StatType::Fatal(e.to_string().into()));
                        break;
                    }
                    processed += 1;
                }
                let _ = stat_send.send(StatType::EventsProcessed(processed));
            }
            log::trace!("Worker-{worker_id} done");
            state
        })
}

// Glue between the stats the reader sends and the stats the controller expects
fn forward_input_stats_to_stats_collector(
    input_stats_recv: &flume::Receiver<InputStatType>,
    stats_send: &flume::Sender<StatType>,
) {
    while let Ok(input_stat) = input_stats_recv.recv() {
        let stat = match input_stat {
            InputStatType::EventsRead(cnt) => StatType::EventsRead(cnt),
            InputStatType::Error(e) => StatType::Error(e),
            InputStatType::Fatal(e) => StatType::Fatal(e),
        };
        if stats_send.send(stat).is_err() {
            log::trace!("Stats channel closed, dropping input stats");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu_cfg::{MenuCfg, PathCfg};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    /// One path on HLT bit 0 of a menu with 3 HLT paths, correlating against HLT bit 0.
    fn narrow_menu_state() -> WorkerState {
        let cfg = MenuCfg {
            ps_count_offset: 0,
            hlt_paths: vec![
                "HLT_A_v1".to_string(),
                "HLT_B_v1".to_string(),
                "HLT_C_v1".to_string(),
            ],
            l1_seeds: BTreeMap::from([("L1_A".to_string(), 0)]),
            paths: vec![PathCfg {
                name: "HLT_A_v".to_string(),
                datasets: vec!["A".to_string()],
                l1_seeds: vec!["L1_A".to_string()],
                prescales: vec![1],
                physics: true,
                disable: false,
            }],
        };
        WorkerState {
            calc: build_menu(&cfg, None, Diagnostics::muted()).unwrap(),
            pass_counts: Some(PassCounts::new(0, cfg.hlt_paths.len())),
        }
    }

    #[test]
    fn test_hlt_too_narrow_for_pass_counts_changes_nothing() {
        let mut state = narrow_menu_state();
        // Wide enough for the menu, too narrow for the pass counts
        let event: TrigEvent = "1 1".parse().unwrap();
        assert!(matches!(
            state.process_event(&event),
            Err(MenuError::BitVectorTooShort {
                required: 3,
                got: 1,
                ..
            })
        ));
        assert_eq!(state.calc.menu().nr_tot(), 0);
        assert_eq!(state.pass_counts.as_ref().unwrap().total(), 0);

        let event: TrigEvent = "1 100".parse().unwrap();
        state.process_event(&event).unwrap();
        assert_eq!(state.calc.menu().nr_tot(), 1);
        assert_eq!(state.pass_counts.as_ref().unwrap().total(), 1);
    }

    #[test]
    fn test_panicked_worker_is_fatal() {
        let mut state = narrow_menu_state();
        let mut worker_state = state.fresh_copy();
        worker_state
            .process_event(&"1 100".parse().unwrap())
            .unwrap();
        let handles = vec![
            std::thread::spawn(move || worker_state),
            std::thread::spawn(|| -> WorkerState { panic!("worker failure") }),
        ];
        let (sender, receiver) = flume::unbounded();

        merge_workers(&mut state, handles, &sender).unwrap();
        drop(sender);

        assert_eq!(state.calc.menu().nr_tot(), 1);
        let stats: Vec<StatType> = receiver.iter().collect();
        assert!(stats
            .iter()
            .any(|s| matches!(s, StatType::Fatal(e) if e.contains("Worker-1 terminated early"))));
    }

    fn run_processing(config: &'static MockConfig) -> (Vec<StatType>, Arc<AtomicBool>) {
        let reader = init_reader(config.input_file()).unwrap();
        let (sender, receiver): (flume::Sender<StatType>, flume::Receiver<StatType>) =
            flume::unbounded();
        let stop_flag = Arc::new(AtomicBool::new(false));

        init_processing(config, reader, sender, stop_flag.clone()).unwrap();

        (receiver.iter().collect(), stop_flag)
    }

    fn take_menu_stats(stats: &[StatType]) -> &MenuStats {
        stats
            .iter()
            .find_map(|s| match s {
                StatType::MenuStats(menu_stats) => Some(menu_stats.as_ref()),
                _ => None,
            })
            .expect("No menu stats sent")
    }

    static CFG_TEST_INIT_PROCESSING: OnceLock<MockConfig> = OnceLock::new();

    #[test]
    fn test_init_processing() {
        CFG_TEST_INIT_PROCESSING.set(MockConfig::new()).unwrap();
        let (stats, stop_flag) = run_processing(CFG_TEST_INIT_PROCESSING.get().unwrap());

        let mut events_read = 0;
        let mut events_processed = 0;
        for stat in &stats {
            match stat {
                StatType::EventsRead(cnt) => events_read += cnt,
                StatType::EventsProcessed(cnt) => events_processed += cnt,
                StatType::Error(e) | StatType::Fatal(e) => panic!("Error or Fatal: {e}"),
                StatType::MenuStats(_) => (),
            }
        }
        assert_eq!(events_read, 8);
        assert_eq!(events_processed, 8);
        assert!(!stop_flag.load(Ordering::SeqCst));

        let menu_stats = take_menu_stats(&stats);
        assert_eq!(menu_stats.nr_tot, 8);
        assert_eq!(menu_stats.nr_passed, vec![6, 4]);
        let path_counts: Vec<(&str, u64, &[u64])> = menu_stats
            .paths
            .iter()
            .map(|p| (p.name.as_str(), p.nr_l1_passed, p.nr_passed.as_slice()))
            .collect();
        assert_eq!(
            path_counts,
            vec![
                ("HLT_IsoMu24_v", 5, [4, 2].as_slice()),
                ("HLT_Mu50_v", 6, [3, 3].as_slice()),
                ("AlCa_EcalPhiSym_v", 3, [1, 0].as_slice()),
                ("HLT_Random_v", 8, [1, 1].as_slice()),
            ]
        );
        assert_eq!(menu_stats.groups[0].name, "SingleMuon");
        assert_eq!(menu_stats.groups[0].nr_passed, vec![5, 3]);
        assert_eq!(menu_stats.groups[1].nr_passed, vec![1, 0]);
        assert_eq!(menu_stats.warnings.total(), 0);
        assert!(menu_stats.correlation.is_none());
    }

    static CFG_TEST_CORRELATE: OnceLock<MockConfig> = OnceLock::new();

    #[test]
    fn test_init_processing_correlate() {
        let mut mock_config = MockConfig::new();
        mock_config.correlate = Some("HLT_IsoMu24_v".to_string());
        CFG_TEST_CORRELATE.set(mock_config).unwrap();
        let (stats, _) = run_processing(CFG_TEST_CORRELATE.get().unwrap());

        let correlation = take_menu_stats(&stats).correlation.clone().unwrap();
        assert_eq!(correlation.total, 4);
        let co_firing: Vec<(&str, u64)> = correlation
            .co_firing
            .iter()
            .map(|c| (c.path.as_str(), c.count))
            .collect();
        assert_eq!(
            co_firing,
            vec![
                ("HLT_IsoMu24_v13", 4),
                ("HLT_Mu50_v15", 2),
                ("AlCa_EcalPhiSym_v9", 2)
            ]
        );
    }

    static CFG_TEST_WORKERS: OnceLock<MockConfig> = OnceLock::new();

    #[test]
    fn test_init_processing_multiple_workers() {
        let mut mock_config = MockConfig::new();
        mock_config.workers = 3;
        mock_config.batch_size = 2;
        CFG_TEST_WORKERS.set(mock_config).unwrap();
        let (stats, _) = run_processing(CFG_TEST_WORKERS.get().unwrap());

        let menu_stats = take_menu_stats(&stats);
        // Counters that do not depend on the prescale phase
        assert_eq!(menu_stats.nr_tot, 8);
        assert_eq!(menu_stats.paths[1].nr_passed, vec![3, 3]);
        assert_eq!(
            menu_stats
                .paths
                .iter()
                .map(|p| p.nr_l1_passed)
                .collect::<Vec<_>>(),
            vec![5, 6, 3, 8]
        );
    }

    static CFG_TEST_SHORT_EVENTS: OnceLock<MockConfig> = OnceLock::new();

    #[test]
    fn test_events_too_narrow_is_fatal() {
        let mut mock_config = MockConfig::new();
        mock_config.input_file = Some(PathBuf::from("../tests/test-data/short_events.txt"));
        CFG_TEST_SHORT_EVENTS.set(mock_config).unwrap();
        let (stats, stop_flag) = run_processing(CFG_TEST_SHORT_EVENTS.get().unwrap());

        assert!(stop_flag.load(Ordering::SeqCst));
        assert!(stats
            .iter()
            .any(|s| matches!(s, StatType::Fatal(e) if e.contains("requires at least"))));
        assert_eq!(take_menu_stats(&stats).nr_tot, 0);
    }

    static CFG_TEST_UNKNOWN_CORRELATE: OnceLock<MockConfig> = OnceLock::new();

    #[test]
    fn test_unknown_correlate_path() {
        let mut mock_config = MockConfig::new();
        mock_config.correlate = Some("HLT_DoesNotExist_v".to_string());
        CFG_TEST_UNKNOWN_CORRELATE.set(mock_config).unwrap();
        let config = CFG_TEST_UNKNOWN_CORRELATE.get().unwrap();

        let reader = init_reader(config.input_file()).unwrap();
        let (sender, _receiver) = flume::unbounded();
        let err = init_processing(config, reader, sender, Arc::new(AtomicBool::new(false)))
            .unwrap_err();
        assert!(err.to_string().contains("HLT_DoesNotExist_v"));
    }
}
