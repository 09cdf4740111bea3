//! Contains the [InputStatType] enum for the statistics the reader reports while scanning input.

#[allow(variant_size_differences)] // The string is already a pointer.
#[derive(Debug, Clone, PartialEq)]
/// Possible stats that the reader sends to a stats consumer.
pub enum InputStatType {
    /// Fatal error, stop processing.
    Fatal(Box<str>),
    /// Non-fatal error, reported but processing continues.
    Error(Box<str>),
    /// Increment the total events read.
    EventsRead(u32),
}

impl std::fmt::Display for InputStatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputStatType::Fatal(e) => write!(f, "Fatal error: {e}"),
            InputStatType::Error(e) => write!(f, "Error: {e}"),
            InputStatType::EventsRead(cnt) => write!(f, "{cnt} events read"),
        }
    }
}
