//! Table output formatting using the `tabled` crate

use super::{truncate, OutputConfig};
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Alignment, Modify, Width},
    Table,
};

/// Widest a text cell may grow before it is truncated on a TTY.
const MAX_TEXT_CELL: usize = 40;

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Render rows under `headers`. Columns listed in `numeric` are right-aligned.
    pub fn from_rows(
        headers: &[&str],
        rows: &[Vec<String>],
        numeric: &[usize],
        config: &OutputConfig,
    ) -> String {
        if rows.is_empty() {
            return "(no results)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());
        for row in rows {
            builder.push_record(row.iter().map(|cell| {
                if config.should_truncate() {
                    truncate(cell, MAX_TEXT_CELL)
                } else {
                    cell.clone()
                }
            }));
        }

        let mut table = builder.build();
        Self::style(&mut table, config);
        for &col in numeric {
            table.with(Modify::new(Columns::single(col)).with(Alignment::right()));
        }
        Self::fit(&mut table, config);
        table.to_string()
    }

    /// Two-column label/value table with right-aligned labels.
    pub fn key_value(pairs: &[(&str, String)], config: &OutputConfig) -> String {
        let mut builder = Builder::default();
        for (key, value) in pairs {
            builder.push_record([*key, value.as_str()]);
        }

        let mut table = builder.build();
        Self::style(&mut table, config);
        table.with(Modify::new(Columns::first()).with(Alignment::right()));
        Self::fit(&mut table, config);
        table.to_string()
    }

    fn style(table: &mut Table, config: &OutputConfig) {
        if config.compact {
            table.with(Style::blank());
        } else {
            table.with(Style::rounded());
        }
    }

    fn fit(table: &mut Table, config: &OutputConfig) {
        if config.should_truncate() {
            table.with(Width::wrap(config.effective_width()));
        }
    }
}
