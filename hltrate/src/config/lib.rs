//! Contains the [Config] super trait, and all the sub traits required by it
//!
//! Implementing the [Config] super trait is required by configs passed to structs in other modules as part of instantiation.

use super::{inputoutput::InputOutputOpt, menu_opt::MenuOpt, util::UtilOpt};
use std::path::Path;

/// Super trait for all the traits that needed to be implemented by the config struct
// Generic traits that are required by the config struct
pub trait Config: Send + Sync + std::marker::Sized
where
    // Subtraits that group together related configuration options
    Self: UtilOpt + InputOutputOpt + MenuOpt,
{
    /// Validate the arguments of the config
    fn validate_args(&self) -> Result<(), String> {
        if self.any_errors_exit_code().is_some_and(|val| val == 0) {
            return Err("Invalid config: Exit code for any errors cannot be 0".to_string());
        }
        if self.workers() == 0 {
            return Err("Invalid config: Number of workers cannot be 0".to_string());
        }
        if self.batch_size() == 0 {
            return Err("Invalid config: Batch size cannot be 0".to_string());
        }
        validate_data_file("Menu file", self.menu_file())?;
        if let Some(path) = self.input_stats_file() {
            validate_data_file("Input stats file", path)?;
        }
        Ok(())
    }
}

/// Checks that `path` is an existing file with a JSON or TOML extension
fn validate_data_file(what: &str, path: &Path) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!(
            "Invalid config: {what} does not exist (got: {})",
            path.to_string_lossy()
        ));
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        None => Err(format!(
            "Invalid config: {what} has no extension (got: {})",
            path.to_string_lossy()
        )),
        Some("json") | Some("toml") => Ok(()),
        Some(_) => Err(format!(
            "Invalid config: {what} has invalid extension, should be JSON or TOML (got: {})",
            path.to_string_lossy()
        )),
    }
}

impl<T> Config for &T
where
    T: Config,
{
    fn validate_args(&self) -> Result<(), String> {
        (*self).validate_args()
    }
}

impl<T> Config for Box<T>
where
    T: Config,
{
    fn validate_args(&self) -> Result<(), String> {
        (**self).validate_args()
    }
}
impl<T> Config for std::sync::Arc<T>
where
    T: Config,
{
    fn validate_args(&self) -> Result<(), String> {
        (**self).validate_args()
    }
}
