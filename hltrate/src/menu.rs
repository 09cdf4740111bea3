//! The trigger menu accounting engine.
//!
//! A [TriggerMenu] owns [TriggerPath]s and [TriggerGroup]s and is fed one event at a time with the L1 express bits
//! (produced from the raw L1 decisions by a [SeedIndexResolver]) and the HLT decisions.
//! [RateCalculator] pairs the two so that raw [TrigEvent]s can be processed directly.

pub mod diagnostics;
pub mod error;
pub mod seed_resolver;
pub mod trig_group;
pub mod trig_menu;
pub mod trig_path;

pub use diagnostics::{Diagnostic, DiagnosticRecord, Diagnostics};
pub use error::{BitsKind, MenuError};
pub use seed_resolver::SeedIndexResolver;
pub use trig_group::TriggerGroup;
pub use trig_menu::TriggerMenu;
pub use trig_path::{TrigType, TriggerPath, DEFAULT_PS_COUNT_OFFSET};

use trig_event_reader::TrigEvent;

/// A [TriggerMenu] together with the [SeedIndexResolver] producing its L1 express bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCalculator {
    resolver: SeedIndexResolver,
    menu: TriggerMenu,
}

impl RateCalculator {
    /// Pair a resolver and a menu.
    pub fn new(resolver: SeedIndexResolver, menu: TriggerMenu) -> Self {
        Self { resolver, menu }
    }

    /// Resolve the express bits of the event and feed it to the menu.
    pub fn process_event(&mut self, event: &TrigEvent) -> Result<(), MenuError> {
        let l1_express = self.resolver.resolve(&event.l1)?;
        self.menu.process_event(&l1_express, &event.hlt)
    }

    /// Add the counters of another calculator built from the same configuration.
    pub fn merge(&mut self, other: &RateCalculator) -> Result<(), MenuError> {
        if self.resolver != other.resolver {
            return Err(MenuError::MergeMismatch("L1 seed resolvers differ".into()));
        }
        self.menu.merge(&other.menu)
    }

    /// Same configuration with all counters zeroed.
    pub fn fresh_copy(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            menu: self.menu.fresh_copy(),
        }
    }

    /// The seed resolver.
    pub fn resolver(&self) -> &SeedIndexResolver {
        &self.resolver
    }

    /// The menu and its counters.
    pub fn menu(&self) -> &TriggerMenu {
        &self.menu
    }

    /// Mutable access to the menu.
    pub fn menu_mut(&mut self) -> &mut TriggerMenu {
        &mut self.menu
    }
}
