//! Miscellaneous utility functions
pub mod lib;

pub(crate) use {
    crate::{
        config::{prelude::*, Cfg},
        menu::{Diagnostics, RateCalculator},
        pass_counts::PassCounts,
        stats::{
            menu_stats::MenuStats,
            report::{Report, StatSummary},
            StatType,
        },
    },
    indicatif::{ProgressBar, ProgressStyle},
    owo_colors::OwoColorize,
    serde::{Deserialize, Serialize},
    std::{
        fmt, fs,
        io::{self, Write},
        path::{Path, PathBuf},
        process::ExitCode,
        str::FromStr,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, OnceLock,
        },
        thread::{Builder, JoinHandle},
        time::{Duration, Instant},
    },
    trig_event_reader::prelude::*,
};

#[cfg(test)]
pub(crate) use crate::config::test_util::MockConfig;
