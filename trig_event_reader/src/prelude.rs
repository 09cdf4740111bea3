//! Re-exports of the types most users need
pub use super::bits::{ParseBitsError, TrigBits};
pub use super::event::{ParseEventError, TrigEvent};
pub use super::event_scanner::EventScanner;
pub use super::stats::InputStatType;
pub use super::{init_reader, spawn_reader, EventBatch};
