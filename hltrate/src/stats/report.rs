//! The [Report] printed at the end of execution
//!
//! Report contains several [StatSummary] structs that are used to generate the global stats table,
//! and one sub table per part of the [MenuStats].
use super::menu_stats::MenuStats;
use super::table_formatter_utils::{
    format_global_stats_sub_table, format_sub_table, format_super_table, SubtableColor,
};
use owo_colors::OwoColorize;
use tabled::{
    builder::Builder as TableBuilder,
    settings::{object::Rows, Alignment, Format, Modify, Panel, Style},
    Table, Tabled,
};

/// Describes the columns of the report table
#[derive(Tabled, Debug, Default, Clone, PartialEq, Eq)]
pub struct StatSummary {
    /// Name of the statistic
    pub statistic: String,
    /// Value of the statistic
    pub value: String,
    /// Optional notes
    pub notes: String,
}

impl StatSummary {
    /// Create a new summary line, missing notes are left empty.
    pub fn new(statistic: String, value: String, notes: Option<String>) -> Self {
        Self {
            statistic,
            value,
            notes: notes.unwrap_or_default(),
        }
    }
}

/// Structures the report printed by the [Controller](crate::controller::Controller) at the end of execution
///
/// Contains convenience methods to add stats to the report, and to generate the report table
#[derive(Debug)]
pub struct Report {
    stats: Vec<StatSummary>,
    sub_tables: Vec<Table>,
    processing_time: std::time::Duration,
    fatal_error: Option<String>,
}

impl Report {
    /// Create an empty report.
    pub fn new(processing_time: std::time::Duration) -> Self {
        Self {
            stats: Vec::new(),
            sub_tables: Vec::new(),
            processing_time,
            fatal_error: None,
        }
    }

    /// Add a line to the global stats table.
    pub fn add_stat(&mut self, stat: StatSummary) {
        self.stats.push(stat);
    }

    /// Mark the report as the report of a run that terminated early.
    pub fn add_fatal_error(&mut self, error: String) {
        self.fatal_error = Some(error);
    }

    /// Add the tables describing the counters of a processed menu.
    pub fn add_menu_stats(&mut self, menu_stats: &MenuStats) {
        self.sub_tables.push(format_sub_table(
            column_table(menu_stats),
            "Menu",
            SubtableColor::Green,
        ));
        if !menu_stats.paths.is_empty() {
            self.sub_tables.push(format_sub_table(
                path_table(menu_stats),
                "Paths",
                SubtableColor::Blue,
            ));
        }
        if !menu_stats.groups.is_empty() {
            self.sub_tables.push(format_sub_table(
                group_table(menu_stats),
                "Datasets",
                SubtableColor::BrightBlue,
            ));
        }
        if let Some(correlation) = &menu_stats.correlation {
            let mut builder = TableBuilder::default();
            builder.push_record(["path".to_string(), "count".to_string(), "fraction".to_string()]);
            for co_firing in &correlation.co_firing {
                builder.push_record([
                    co_firing.path.clone(),
                    co_firing.count.to_string(),
                    format_fraction(co_firing.count, correlation.total),
                ]);
            }
            self.sub_tables.push(format_sub_table(
                builder.build(),
                &format!(
                    "Fired with {} ({} events)",
                    correlation.reference, correlation.total
                ),
                SubtableColor::Purple,
            ));
        }
        if menu_stats.warnings.total() > 0 {
            let warnings = [
                StatSummary::new(
                    "W01".to_string(),
                    menu_stats.warnings.column_mismatches.to_string(),
                    Some("Prescale column mismatch".to_string()),
                ),
                StatSummary::new(
                    "W02".to_string(),
                    menu_stats.warnings.seedless_accepts.to_string(),
                    Some("HLT accept without L1 seed".to_string()),
                ),
            ];
            self.sub_tables.push(format_sub_table(
                Table::new(warnings),
                "Warnings",
                SubtableColor::Yellow,
            ));
        }
    }

    /// Build the complete report table.
    pub fn format(&self) -> Table {
        let mut global_stats_table = Table::new(&self.stats);
        format_global_stats_sub_table(&mut global_stats_table);

        // One row per table, stacked vertically
        let mut builder = TableBuilder::default();
        builder.push_record([global_stats_table.to_string()]);
        for sub_table in &self.sub_tables {
            builder.push_record([sub_table.to_string()]);
        }
        let mut multi_table = builder.build();
        let _ = multi_table.with(Style::rounded());
        let mut report_table = format_super_table(&multi_table, self.processing_time);

        if let Some(fatal_error) = &self.fatal_error {
            let _ = report_table
                .with(Panel::header(format!(
                    "FATAL ERROR - EARLY TERMINATION: {fatal_error}"
                )))
                .with(
                    Modify::new(Rows::single(0))
                        .with(Alignment::center())
                        .with(Format::content(|x| x.to_uppercase().red().to_string())),
                );
        }
        report_table
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("{final_report}", final_report = self.format());
    }
}

fn format_fraction(passed: u64, total: u64) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.4}", passed as f64 / total as f64)
    }
}

fn column_names(nr_columns: usize) -> impl Iterator<Item = String> {
    (0..nr_columns).map(|col| format!("col {col}"))
}

fn column_table(menu_stats: &MenuStats) -> Table {
    let mut builder = TableBuilder::default();
    builder.push_record(["column", "accepted", "fraction"].map(String::from));
    for col in 0..menu_stats.nr_columns {
        let passed = menu_stats.nr_passed.get(col).copied().unwrap_or(0);
        builder.push_record([
            col.to_string(),
            passed.to_string(),
            format_fraction(passed, menu_stats.nr_tot),
        ]);
    }
    builder.build()
}

fn path_table(menu_stats: &MenuStats) -> Table {
    let mut builder = TableBuilder::default();
    builder.push_record(
        ["path", "type", "physics", "L1 seeds", "prescales", "L1 passed"]
            .map(String::from)
            .into_iter()
            .chain(column_names(menu_stats.nr_columns)),
    );
    for path in &menu_stats.paths {
        let prescales = path
            .prescales
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let l1_seeds = if path.l1_seeds.is_empty() {
            "None".to_string()
        } else {
            path.l1_seeds.join(" OR ")
        };
        builder.push_record(
            [
                path.name.clone(),
                path.trig_type.to_string(),
                if path.physics { "yes" } else { "no" }.to_string(),
                l1_seeds,
                prescales,
                path.nr_l1_passed.to_string(),
            ]
            .into_iter()
            .chain(path.nr_passed.iter().map(u64::to_string)),
        );
    }
    builder.build()
}

fn group_table(menu_stats: &MenuStats) -> Table {
    let mut builder = TableBuilder::default();
    builder.push_record(
        ["dataset", "paths"]
            .map(String::from)
            .into_iter()
            .chain(column_names(menu_stats.nr_columns)),
    );
    for group in &menu_stats.groups {
        builder.push_record(
            [group.name.clone(), group.paths.len().to_string()]
                .into_iter()
                .chain(group.nr_passed.iter().map(u64::to_string)),
        );
    }
    builder.build()
}
