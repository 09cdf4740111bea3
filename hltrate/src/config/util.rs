//! Contains the [UtilOpt] Trait for all small utility options set by a user, that are not specific to any other subfunctionality.

/// Trait for all small utility options that are not specific to any other trait
pub trait UtilOpt {
    /// Verbosity level of the logger: 0 = error, 1 = warn, 2 = info, 3 = debug, 4 = trace
    fn verbosity(&self) -> u8;
    /// Set the exit code for if any errors or warnings are detected in the input data
    fn any_errors_exit_code(&self) -> Option<u8>;
    /// If set, warnings raised while evaluating the menu are not displayed as they occur
    fn mute_warnings(&self) -> bool;
    /// Number of worker threads evaluating the menu
    fn workers(&self) -> usize;
    /// Number of events read and dispatched together
    fn batch_size(&self) -> usize;
}

impl<T> UtilOpt for &T
where
    T: UtilOpt,
{
    fn verbosity(&self) -> u8 {
        (*self).verbosity()
    }
    fn any_errors_exit_code(&self) -> Option<u8> {
        (*self).any_errors_exit_code()
    }
    fn mute_warnings(&self) -> bool {
        (*self).mute_warnings()
    }
    fn workers(&self) -> usize {
        (*self).workers()
    }
    fn batch_size(&self) -> usize {
        (*self).batch_size()
    }
}

impl<T> UtilOpt for Box<T>
where
    T: UtilOpt,
{
    fn verbosity(&self) -> u8 {
        (**self).verbosity()
    }
    fn any_errors_exit_code(&self) -> Option<u8> {
        (**self).any_errors_exit_code()
    }
    fn mute_warnings(&self) -> bool {
        (**self).mute_warnings()
    }
    fn workers(&self) -> usize {
        (**self).workers()
    }
    fn batch_size(&self) -> usize {
        (**self).batch_size()
    }
}

impl<T> UtilOpt for std::sync::Arc<T>
where
    T: UtilOpt,
{
    fn verbosity(&self) -> u8 {
        (**self).verbosity()
    }
    fn any_errors_exit_code(&self) -> Option<u8> {
        (**self).any_errors_exit_code()
    }
    fn mute_warnings(&self) -> bool {
        (**self).mute_warnings()
    }
    fn workers(&self) -> usize {
        (**self).workers()
    }
    fn batch_size(&self) -> usize {
        (**self).batch_size()
    }
}
