#![forbid(unused_extern_crates)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unused_results)]
#![warn(unused_import_braces)]
#![warn(variant_size_differences)]
#![warn(
    clippy::option_filter_map,
    clippy::manual_filter_map,
    clippy::if_not_else,
    clippy::nonminimal_bool
)]
// Performance lints
#![warn(
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,
    clippy::mutex_integer,
    clippy::mem_forget,
    clippy::maybe_infinite_iter
)]

//! This crate contains the [TrigBits] fixed-width bit vector, the [TrigEvent] holding the L1 and HLT decisions of one event,
//! and the [EventScanner] that reads events from a plain text source.
//! Additionally it contains a helper function [spawn_reader] that spawns a thread that reads events in batches and sends them to a channel that is returned from the function.
//!
//! # Input format
//! One event per line, the raw L1 bits followed by the HLT bits, as strings of `0`/`1` where the first character is bit 0.
//! ```text
//! # l1 bits   hlt bits
//! 0110_0001   1001
//! 0000_0001   0000
//! ```
//!
//! # Example
//! ```text
//! use trig_event_reader::{init_reader, EventScanner};
//!
//! let reader = init_reader(Some(&events_path)).unwrap();
//! let scanner = EventScanner::minimal(reader);
//!
//! for event in scanner {
//!     let event = event.unwrap();
//!     println!("L1 fired: {}, HLT fired: {}", event.l1.count_ones(), event.hlt.count_ones());
//! }
//! ```

pub mod bits;
pub mod event;
pub mod event_scanner;
pub mod prelude;
pub mod stats;

pub use bits::TrigBits;
pub use event::TrigEvent;
pub use event_scanner::EventScanner;

use crossbeam_channel::Receiver;
use std::io::{self, BufRead, IsTerminal};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Depth of the FIFO where event batches are inserted as they are read
const CHANNEL_BATCH_CAPACITY: usize = 100;
const READER_BUFFER_SIZE: usize = 1024 * 50; // 50KB

/// A batch of consecutive events, in input order
pub type EventBatch = Vec<TrigEvent>;

/// Initializes the reader based on the input mode (file or stdin) and returns it
///
/// The input mode is determined by the presence of the input file path
#[inline]
pub fn init_reader(input_file: Option<&Path>) -> io::Result<Box<dyn BufRead + Send>> {
    if let Some(path) = input_file {
        let f = std::fs::OpenOptions::new().read(true).open(path)?;
        Ok(Box::new(io::BufReader::with_capacity(READER_BUFFER_SIZE, f)))
    } else if !io::stdin().is_terminal() {
        Ok(Box::new(io::BufReader::with_capacity(
            READER_BUFFER_SIZE,
            io::stdin(),
        )))
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "stdin not redirected!",
        ))
    }
}

/// Spawns a reader thread that reads event batches from the input and sends them to a producer channel
///
/// Events are delivered strictly in input order. The thread stops at end of input, on the first read error,
/// when the stop flag is raised, or when all receivers are dropped.
///
/// Returns the thread handle and the receiver channel
pub fn spawn_reader<R: BufRead + Send + 'static>(
    stop_flag: Arc<AtomicBool>,
    event_scanner: EventScanner<R>,
    batch_size: usize,
) -> (std::thread::JoinHandle<()>, Receiver<EventBatch>) {
    debug_assert!(batch_size > 0);
    let reader_thread = std::thread::Builder::new().name("Reader".to_string());
    let (send_chan, recv_chan) = crossbeam_channel::bounded(CHANNEL_BATCH_CAPACITY);
    let thread_handle = reader_thread
        .spawn({
            move || {
                let mut event_scanner = event_scanner;
                let mut stop_on_non_full_batch = false;

                while !stop_flag.load(Ordering::SeqCst) && !stop_on_non_full_batch {
                    let batch = match event_scanner.load_batch(batch_size) {
                        Ok(batch) => {
                            if batch.len() < batch_size {
                                stop_on_non_full_batch = true; // End of input or invalid data
                            }
                            batch
                        }
                        Err(_) => break,
                    };
                    if batch.is_empty() {
                        break;
                    }
                    if send_chan.send(batch).is_err() {
                        break;
                    }
                }
            }
        })
        .expect("Failed to spawn reader thread");
    (thread_handle, recv_chan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stats::InputStatType;
    use std::io::Write;

    #[test]
    fn test_spawn_reader_preserves_order() {
        let mut input = String::new();
        for i in 0..25 {
            input.push_str(&format!("{} 1\n", if i % 2 == 0 { "10" } else { "01" }));
        }
        let scanner = EventScanner::minimal(io::Cursor::new(input));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let (handle, recv) = spawn_reader(stop_flag, scanner, 10);
        let batches: Vec<EventBatch> = recv.iter().collect();
        handle.join().unwrap();

        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
        let events: Vec<TrigEvent> = batches.into_iter().flatten().collect();
        assert!(events
            .iter()
            .enumerate()
            .all(|(i, e)| e.l1.test(0) == (i % 2 == 0)));
    }

    #[test]
    fn test_spawn_reader_stops_on_invalid_data() {
        let (stat_send, stat_recv) = flume::unbounded();
        let scanner = EventScanner::new(io::Cursor::new("1 1\n1 1\n1 2\n1 1\n"), Some(stat_send));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let (handle, recv) = spawn_reader(stop_flag, scanner, 10);
        let events: Vec<TrigEvent> = recv.iter().flatten().collect();
        handle.join().unwrap();

        assert_eq!(events.len(), 2);
        assert!(stat_recv
            .iter()
            .any(|s| matches!(s, InputStatType::Fatal(msg) if msg.contains("Line 3"))));
    }

    #[test]
    fn test_init_reader_file() {
        let tmp_dir = temp_dir::TempDir::new().unwrap();
        let path = tmp_dir.child("events.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"101 1\n").unwrap();
        drop(f);

        let reader = init_reader(Some(path.as_path())).unwrap();
        let events: Vec<TrigEvent> = EventScanner::minimal(reader).map(|e| e.unwrap()).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].l1.count_ones(), 2);
    }

    #[test]
    fn test_init_reader_missing_file() {
        let Err(err) = init_reader(Some(Path::new("does/not/exist.txt"))) else {
            panic!("Opening a missing file should fail");
        };
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
