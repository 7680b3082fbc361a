//! Host view: one row per reachable host plus a cluster totals row.

use crate::fmt::{
    NA, Threshold, format_age, format_latency, format_magnitude, format_rate, format_rate_magnitude,
    percent,
};
use crate::model::ClusterSnapshot;
use crate::rates::{ClusterRates, HostRates};

use super::common::{Cell, RenderBuffer};
use super::field::{FieldSpec, layout_row, resolve_widths, status_line, title_line};

pub const FIELDS: [FieldSpec; 11] = [
    FieldSpec::left("INSTANCE", 24),
    FieldSpec::right("UPTIME", 7),
    FieldSpec::right("UTIL(%)", 10),
    FieldSpec::right("CONN", 10),
    FieldSpec::right("LATENCY", 8),
    FieldSpec::right("EXPIRE(/s)", 11),
    FieldSpec::right("EVICT(/s)", 11),
    FieldSpec::right("BYTE_IN/s", 11),
    FieldSpec::right("BYTE_OUT/s", 11),
    FieldSpec::right("REQ(/s)", 11),
    FieldSpec::right("SVRERR(/s)", 11),
];

/// Host names longer than this are cut and marked with `...`.
pub const HOST_NAME_MAX: usize = 15;

const LATENCY_WARN: Threshold = Threshold::over(0.01);
const SVRERR_WARN: Threshold = Threshold::over(0.0);

pub fn render(
    cluster: &ClusterSnapshot,
    rates: &ClusterRates,
    cols: usize,
    clock: &str,
) -> RenderBuffer {
    let mem_total: i64 = cluster.hosts.values().map(|h| h.max_bytes).sum();
    let mem_used: i64 = cluster.hosts.values().map(|h| h.data).sum();
    let total_usage = percent(mem_used as f64, mem_total as f64).unwrap_or(0.0);

    let left = format!(
        " - HOST VIEW - Data size / Available memory: {} /{} ({:3.1}%)",
        format_magnitude(mem_used),
        format_magnitude(mem_total),
        total_usage
    );
    let widths = resolve_widths(&FIELDS, cols);

    let mut rows = Vec::with_capacity(cluster.hosts.len() + 1);
    let mut sums = [0.0f64; 6];
    for (endpoint, counters) in &cluster.hosts {
        let values = rates
            .hosts
            .get(endpoint)
            .map(|r| rate_values(r, rates.has_previous))
            .unwrap_or([None; 6]);
        for (sum, v) in sums.iter_mut().zip(values) {
            *sum += v.unwrap_or(0.0);
        }
        let util = match percent(counters.data as f64, counters.max_bytes as f64) {
            Some(u) => Cell::plain(format!(" {:3.1}", u)),
            None => Cell::na(),
        };
        let mut cells = vec![
            Cell::plain(format!(
                "{:>18}:{:>5}",
                endpoint.display_name(HOST_NAME_MAX),
                endpoint.port
            )),
            Cell::plain(format_age(counters.uptime)),
            util,
            Cell::plain(format_magnitude(counters.connections)),
            Cell::checked(
                format_latency(counters.latency),
                counters.latency,
                LATENCY_WARN,
            ),
        ];
        cells.extend(values[..5].iter().map(|&v| match v {
            Some(v) => Cell::plain(format_rate_magnitude(v)),
            None => Cell::na(),
        }));
        cells.push(match values[5] {
            Some(v) => Cell::checked(format_rate(v), v, SVRERR_WARN),
            None => Cell::na(),
        });
        rows.push(layout_row(cells, &FIELDS, &widths));
    }

    let mut totals = vec![
        Cell::plain(format!("{:3} hosts", cluster.hosts.len())),
        Cell::na(),
        Cell::plain(format!(" {:3.1}", total_usage)),
        Cell::plain(NA),
        Cell::plain(NA),
    ];
    totals.extend(sums[..5].iter().map(|&v| Cell::plain(format_rate_magnitude(v))));
    totals.push(Cell::checked(format_rate(sums[5]), sums[5], SVRERR_WARN));
    rows.push(layout_row(totals, &FIELDS, &widths));

    RenderBuffer {
        status: status_line(&left, clock, cols),
        title: title_line(&FIELDS, &widths, cols),
        rows,
    }
}

fn rate_values(r: &HostRates, has_previous: bool) -> [Option<f64>; 6] {
    [
        r.expire,
        r.evict,
        r.bytes_read,
        r.bytes_written,
        r.requests,
        r.server_errors,
    ]
    .map(|rate| rate.shown(has_previous))
}
