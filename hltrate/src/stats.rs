//! All stat collecting functionality: the [StatType]s sent to the [Controller](crate::controller::Controller),
//! the serializable [MenuStats](menu_stats::MenuStats) summary of a run and the report printed from it.

pub mod menu_stats;
pub mod report;
mod table_formatter_utils;

#[allow(variant_size_differences)] // The largest variants are already pointers.
#[derive(Debug, Clone, PartialEq)]
/// Possible stats that can be sent to the Controller.
pub enum StatType {
    /// Fatal error, stop processing.
    Fatal(Box<str>),
    /// Non-fatal error, reported but processing continues.
    Error(Box<str>),
    /// Increment the total events read from the input.
    EventsRead(u32),
    /// Increment the total events evaluated by the menu.
    EventsProcessed(u32),
    /// Final counters of the menu, sent once all workers are done.
    MenuStats(Box<menu_stats::MenuStats>),
}

impl std::fmt::Display for StatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatType::Fatal(e) => write!(f, "Fatal error: {e}"),
            StatType::Error(e) => write!(f, "Error: {e}"),
            StatType::EventsRead(cnt) => write!(f, "{cnt} events read"),
            StatType::EventsProcessed(cnt) => write!(f, "{cnt} events processed"),
            StatType::MenuStats(stats) => write!(f, "Menu stats for {} events", stats.nr_tot),
        }
    }
}

/// Implements `validate_fields`, comparing the listed fields of two instances of a struct.
///
/// Each mismatch is described in one message, with the value of `other` as the expected value.
#[macro_export]
macro_rules! validate_fields {
    ($struct_name:ident, $($field:ident),+) => {
        fn validate_fields(&self, other: &$struct_name) -> Result<(), Vec<String>> {
            let mut errs: Vec<String> = Vec::new();
            $(
                if self.$field != other.$field {
                    errs.push(format!(
                        "[E9001] {struct_name}.{field} mismatch: expected {expected:?}, found {found:?}",
                        struct_name = stringify!($struct_name),
                        field = stringify!($field),
                        expected = other.$field,
                        found = self.$field,
                    ));
                }
            )+
            if errs.is_empty() {
                Ok(())
            } else {
                Err(errs)
            }
        }
    };
}
