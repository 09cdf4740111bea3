//! Contains the [MenuOpt] Trait for the options describing the trigger menu to evaluate.

use crate::util::*;

/// Options that select and adjust the menu
pub trait MenuOpt {
    /// Menu definition file (TOML or JSON)
    fn menu_file(&self) -> &Path;
    /// Starting value of the prescale counters, overrides the menu file
    fn ps_offset(&self) -> Option<u64>;
    /// HLT path to count co-firing paths against
    fn correlate(&self) -> Option<&str>;
}

impl<T> MenuOpt for &T
where
    T: MenuOpt,
{
    fn menu_file(&self) -> &Path {
        (*self).menu_file()
    }
    fn ps_offset(&self) -> Option<u64> {
        (*self).ps_offset()
    }
    fn correlate(&self) -> Option<&str> {
        (*self).correlate()
    }
}

impl<T> MenuOpt for Box<T>
where
    T: MenuOpt,
{
    fn menu_file(&self) -> &Path {
        (**self).menu_file()
    }
    fn ps_offset(&self) -> Option<u64> {
        (**self).ps_offset()
    }
    fn correlate(&self) -> Option<&str> {
        (**self).correlate()
    }
}

impl<T> MenuOpt for Arc<T>
where
    T: MenuOpt,
{
    fn menu_file(&self) -> &Path {
        (**self).menu_file()
    }
    fn ps_offset(&self) -> Option<u64> {
        (**self).ps_offset()
    }
    fn correlate(&self) -> Option<&str> {
        (**self).correlate()
    }
}
