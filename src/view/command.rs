//! Command view: request mix and outcome ratios per command.
//!
//! A ratio is "not applicable" when the command does not report the
//! category or when the command saw no requests; a real zero is shown as
//! `0.0`.

use crate::fmt::{NA, Threshold, format_magnitude, format_rate, format_ratio, percent};
use crate::model::{Category, Command, CommandTable};
use crate::rates::{ClusterRates, Rate};

use super::common::{Cell, RenderBuffer};
use super::field::{FieldSpec, layout_row, resolve_widths, status_line, title_line};

pub const FIELDS: [FieldSpec; 8] = [
    FieldSpec::left("COMMAND", 8),
    FieldSpec::right("REQUEST(/s)", 12),
    FieldSpec::right("MIX(%)", 12),
    FieldSpec::right("SUCCESS(%)", 12),
    FieldSpec::right("HIT(%)", 12),
    FieldSpec::right("MISS(%)", 12),
    FieldSpec::right("EXISTS(%)", 12),
    FieldSpec::right("CMDERR(/s)", 12),
];

const SUCCESS_WARN: Threshold = Threshold::under(90.0);
const HIT_WARN: Threshold = Threshold::under(90.0);
const WRITE_SUCCESS_WARN: Threshold = Threshold::under(99.9);
const ERROR_WARN: Threshold = Threshold::over(0.0);

fn value(table: &CommandTable<Rate>, cmd: Command, cat: Category) -> Option<f64> {
    table.get(cmd, cat).map(Rate::value)
}

/// Sum of `cat` over `cmds`, treating absent pairs as 0.
fn sum_over(table: &CommandTable<Rate>, cat: Category, cmds: impl Iterator<Item = Command>) -> f64 {
    cmds.filter_map(|c| value(table, c, cat)).sum()
}

fn ratio_cell(part: Option<f64>, count: Option<f64>, warn: Option<Threshold>) -> Cell {
    let ratio = match (part, count) {
        (Some(p), Some(c)) => percent(p, c),
        _ => None,
    };
    match (ratio, warn) {
        (Some(r), Some(t)) => Cell::checked(format_ratio(r), r, t),
        (Some(r), None) => Cell::plain(format_ratio(r)),
        (None, _) => Cell::na(),
    }
}

/// Pairs that can be shown this tick. Once a previous snapshot exists, a
/// pair without a baseline of its own has no rate and is dropped, so it
/// renders as not applicable and stays out of every sum.
fn displayable(table: &CommandTable<Rate>, has_previous: bool) -> CommandTable<Rate> {
    let mut shown = CommandTable::new();
    for (cmd, cat, rate) in table.iter() {
        if rate.shown(has_previous).is_some() {
            shown.insert(cmd, cat, rate);
        }
    }
    shown
}

/// Cluster-wide totals shown in the status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandSummary {
    pub total: f64,
    /// Successful writes plus delete hits.
    pub successful: f64,
    pub errors: f64,
}

pub fn summarize(table: &CommandTable<Rate>) -> CommandSummary {
    let all = || Command::ALL.into_iter();
    CommandSummary {
        total: sum_over(table, Category::Count, all()),
        successful: sum_over(table, Category::Success, all())
            + value(table, Command::Delete, Category::Hit).unwrap_or(0.0),
        errors: sum_over(table, Category::Error, all()),
    }
}

pub fn render(rates: &ClusterRates, cols: usize, clock: &str) -> RenderBuffer {
    let table = &displayable(&rates.commands, rates.has_previous);
    let summary = summarize(table);
    let success_rate = percent(summary.successful, summary.total).unwrap_or(0.0);

    let left = format!(
        " - COMMAND VIEW - Successful / Total: {} /{} ({:3.1}%)   Error: {}",
        format_magnitude(summary.successful as i64),
        format_magnitude(summary.total as i64),
        success_rate,
        format_magnitude(summary.errors as i64)
    );
    let widths = resolve_widths(&FIELDS, cols);

    let mut rows = Vec::with_capacity(Command::ALL.len() + 3);
    for cmd in Command::ALL {
        let count = value(table, cmd, Category::Count);
        let cells = vec![
            Cell::plain(cmd.name()),
            count.map_or_else(Cell::na, |c| Cell::plain(format_ratio(c))),
            ratio_cell(count, Some(summary.total), None),
            ratio_cell(value(table, cmd, Category::Success), count, Some(SUCCESS_WARN)),
            ratio_cell(value(table, cmd, Category::Hit), count, Some(HIT_WARN)),
            ratio_cell(value(table, cmd, Category::Miss), count, None),
            ratio_cell(value(table, cmd, Category::Exist), count, None),
            match value(table, cmd, Category::Error) {
                Some(e) => Cell::checked(format_rate(e), e, ERROR_WARN),
                None => Cell::na(),
            },
        ];
        rows.push(layout_row(cells, &FIELDS, &widths));
    }

    // Rollups are only meaningful as rates.
    if rates.has_previous {
        let reads = || Command::ALL.into_iter().filter(|c| c.is_read());
        let writes = || Command::ALL.into_iter().filter(|c| c.is_write());
        let read = sum_over(table, Category::Count, reads());
        let write = sum_over(table, Category::Count, writes());
        let read_error = sum_over(table, Category::Error, reads());
        let write_error = sum_over(table, Category::Error, writes());

        let read_row = vec![
            Cell::plain("READ"),
            Cell::plain(format_ratio(read)),
            ratio_cell(Some(read), Some(summary.total), None),
            Cell::na(),
            ratio_cell(
                Some(sum_over(table, Category::Hit, reads())),
                Some(read),
                Some(HIT_WARN),
            ),
            Cell::na(),
            Cell::na(),
            Cell::checked(format_rate(read_error), read_error, ERROR_WARN),
        ];
        let write_row = vec![
            Cell::plain("WRITE"),
            Cell::plain(format_ratio(write)),
            ratio_cell(Some(write), Some(summary.total), None),
            ratio_cell(
                Some(sum_over(table, Category::Success, writes())),
                Some(write),
                Some(WRITE_SUCCESS_WARN),
            ),
            Cell::na(),
            Cell::na(),
            Cell::na(),
            Cell::checked(format_rate(write_error), write_error, ERROR_WARN),
        ];
        let total_row = vec![
            Cell::plain("TOTAL"),
            Cell::plain(format_ratio(summary.total)),
            Cell::plain(NA),
            Cell::na(),
            Cell::na(),
            Cell::na(),
            Cell::na(),
            Cell::plain(format_ratio(summary.errors)),
        ];
        for cells in [read_row, write_row, total_row] {
            rows.push(layout_row(cells, &FIELDS, &widths));
        }
    }

    RenderBuffer {
        status: status_line(&left, clock, cols),
        title: title_line(&FIELDS, &widths, cols),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClusterSnapshot;
    use crate::view::common::{Row, StyleClass};

    fn cluster(ts: f64, scale: i64) -> ClusterSnapshot {
        let mut c = ClusterSnapshot {
            command_timestamp: ts,
            ..ClusterSnapshot::default()
        };
        for cmd in Command::ALL {
            for cat in Category::ALL {
                if cmd.reports(cat) {
                    c.commands.insert(cmd, cat, 0);
                }
            }
        }
        c.commands.insert(Command::Get, Category::Count, 100 * scale);
        c.commands.insert(Command::Get, Category::Hit, 80 * scale);
        c.commands.insert(Command::Get, Category::Miss, 20 * scale);
        c.commands.insert(Command::Set, Category::Count, 100 * scale);
        c.commands.insert(Command::Set, Category::Success, 100 * scale);
        c
    }

    fn cell_texts(row: &Row) -> Vec<String> {
        row.text().split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn first_tick_has_no_rollups() {
        let c = cluster(100.0, 1);
        let rates = ClusterRates::compute(&c, None);
        let buf = render(&rates, 100, "12:00:00");
        assert_eq!(buf.rows.len(), Command::ALL.len());
        assert!(buf.status.contains("(50.0%)"));
    }

    #[test]
    fn ratios_and_not_applicable() {
        let prev = cluster(100.0, 1);
        let curr = cluster(110.0, 2);
        let rates = ClusterRates::compute(&curr, Some(&prev));
        let buf = render(&rates, 100, "12:00:00");
        assert_eq!(buf.rows.len(), Command::ALL.len() + 3);

        // set: 10/s, half the mix, 100% success, no hit/miss/exist.
        assert_eq!(
            cell_texts(&buf.rows[0]),
            vec!["set", "10.0", "50.0", "100.0", "--", "--", "--", "0.0"]
        );
        // cas: reports everything but saw no requests.
        assert_eq!(
            cell_texts(&buf.rows[1]),
            vec!["cas", "0.0", "0.0", "--", "--", "--", "--", "0.0"]
        );
        // get: hit 80% warns under 90.
        let get = &buf.rows[8];
        assert_eq!(
            cell_texts(get),
            vec!["get", "10.0", "50.0", "--", "80.0", "20.0", "--", "0.0"]
        );
        assert!(
            get.segments
                .iter()
                .any(|s| s.style == StyleClass::Warning && s.text == "80.0")
        );
    }

    #[test]
    fn rollup_rows() {
        let prev = cluster(100.0, 1);
        let curr = cluster(110.0, 2);
        let rates = ClusterRates::compute(&curr, Some(&prev));
        let buf = render(&rates, 100, "12:00:00");
        let n = Command::ALL.len();
        assert_eq!(
            cell_texts(&buf.rows[n]),
            vec!["READ", "10.0", "50.0", "--", "80.0", "--", "--", "0.0"]
        );
        assert_eq!(
            cell_texts(&buf.rows[n + 1]),
            vec!["WRITE", "10.0", "50.0", "100.0", "--", "--", "--", "0.0"]
        );
        assert_eq!(
            cell_texts(&buf.rows[n + 2]),
            vec!["TOTAL", "20.0", "--", "--", "--", "--", "--", "0.0"]
        );
    }

    #[test]
    fn pairs_without_baseline_are_not_applicable() {
        let mut prev = ClusterSnapshot {
            command_timestamp: 100.0,
            ..ClusterSnapshot::default()
        };
        prev.commands.insert(Command::Set, Category::Count, 100);
        prev.commands.insert(Command::Set, Category::Success, 100);
        prev.commands.insert(Command::Get, Category::Count, 100);
        let mut curr = cluster(110.0, 2);
        curr.commands.insert(Command::Delete, Category::Count, 5_000_000);

        let rates = ClusterRates::compute(&curr, Some(&prev));
        let buf = render(&rates, 100, "12:00:00");
        assert!(buf.status.contains("(50.0%)"));
        assert_eq!(
            cell_texts(&buf.rows[8]),
            vec!["get", "10.0", "50.0", "--", "--", "--", "--", "--"]
        );
        assert_eq!(
            cell_texts(&buf.rows[10]),
            vec!["delete", "--", "--", "--", "--", "--", "--", "--"]
        );
        let n = Command::ALL.len();
        assert_eq!(
            cell_texts(&buf.rows[n + 2]),
            vec!["TOTAL", "20.0", "--", "--", "--", "--", "--", "0.0"]
        );
    }

    #[test]
    fn empty_table_is_all_not_applicable() {
        let c = ClusterSnapshot::default();
        let rates = ClusterRates::compute(&c, None);
        let buf = render(&rates, 100, "12:00:00");
        assert_eq!(
            cell_texts(&buf.rows[0]),
            vec!["set", "--", "--", "--", "--", "--", "--", "--"]
        );
        assert!(buf.status.contains("(0.0%)"));
    }
}
