//! Re-exports of the config traits and types needed by most modules
pub use super::inputoutput::{DataOutputFormat, DataOutputMode, InputOutputOpt};
pub use super::lib::Config;
pub use super::menu_opt::MenuOpt;
pub use super::util::UtilOpt;
