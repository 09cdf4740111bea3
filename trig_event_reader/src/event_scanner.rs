//! Contains the [EventScanner] that reads [TrigEvent]s line by line from any [BufRead] source.
//!
//! Blank lines and lines starting with `#` are skipped. Parse failures are turned into [io::ErrorKind::InvalidData] errors
//! that carry the 1-based line number.

use crate::event::TrigEvent;
use crate::stats::InputStatType;
use std::io::{self, BufRead};

/// Scans events from a reader and optionally reports [InputStatType] through a [`flume::Sender<InputStatType>`] channel.
#[derive(Debug)]
pub struct EventScanner<R: BufRead> {
    reader: R,
    line_buf: String,
    line_nr: u64,
    events_read: u64,
    stats_send_ch: Option<flume::Sender<InputStatType>>,
}

impl<R: BufRead> EventScanner<R> {
    /// Creates a new [EventScanner] with an optional channel to report stats through.
    pub fn new(reader: R, stats_send_ch: Option<flume::Sender<InputStatType>>) -> Self {
        Self {
            reader,
            line_buf: String::new(),
            line_nr: 0,
            events_read: 0,
            stats_send_ch,
        }
    }

    /// Creates a new [EventScanner] that does not report any stats.
    pub fn minimal(reader: R) -> Self {
        Self::new(reader, None)
    }

    /// Number of events successfully read so far.
    pub fn events_read(&self) -> u64 {
        self.events_read
    }

    /// Reads the next event, returns `Ok(None)` at end of input.
    pub fn load_event(&mut self) -> io::Result<Option<TrigEvent>> {
        loop {
            self.line_buf.clear();
            if self.reader.read_line(&mut self.line_buf)? == 0 {
                return Ok(None);
            }
            self.line_nr += 1;
            let line = self.line_buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return match line.parse::<TrigEvent>() {
                Ok(event) => {
                    self.events_read += 1;
                    Ok(Some(event))
                }
                Err(e) => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Line {line_nr}: {e}", line_nr = self.line_nr),
                )),
            };
        }
    }

    /// Attempts to fill a batch with up to `batch_size` events.
    ///
    /// If an error occurs after one or more events have been read, the batch read so far is returned and the error is reported
    /// as fatal through the stats channel. If the error occurs before any events have been read, the error is returned.
    pub fn load_batch(&mut self, batch_size: usize) -> io::Result<Vec<TrigEvent>> {
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.load_event() {
                Ok(Some(event)) => batch.push(event),
                Ok(None) => break,
                Err(e) if batch.is_empty() => {
                    self.report(InputStatType::Fatal(e.to_string().into()));
                    return Err(e);
                }
                Err(e) => {
                    self.report(InputStatType::Fatal(e.to_string().into()));
                    break;
                }
            }
        }
        if !batch.is_empty() {
            self.report(InputStatType::EventsRead(batch.len() as u32));
        }
        Ok(batch)
    }

    fn report(&self, stat: InputStatType) {
        if let Some(sender) = self.stats_send_ch.as_ref() {
            // The consumer might have hung up already on early termination
            let _ = sender.send(stat);
        }
    }
}

impl<R: BufRead> Iterator for EventScanner<R> {
    type Item = io::Result<TrigEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.load_event().transpose()
    }
}
