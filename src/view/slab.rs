//! Slab view: one row per slab class, sorted by chunk size.

use crate::fmt::{NA, format_magnitude, format_pct, format_rate, format_rate_magnitude, percent};
use crate::model::{ClusterSnapshot, SlabStats};
use crate::rates::{ClusterRates, SlabRates};

use super::bar::bar_cell;
use super::common::{Cell, RenderBuffer};
use super::field::{FieldSpec, layout_row, resolve_widths, status_line, title_line};

pub const FIELDS: [FieldSpec; 12] = [
    FieldSpec::left("SLAB", 7),
    FieldSpec::right("#SLAB", 7),
    FieldSpec::right("ITEM", 11),
    FieldSpec::right("ITEM(%)", 11),
    FieldSpec::right("KEYVAL(%)", 11),
    FieldSpec::right("VALUE(%)", 11),
    FieldSpec::auto(" "),
    FieldSpec::right("REC(/s)", 8),
    FieldSpec::right("EVT(/s)", 8),
    FieldSpec::right("SEVT(/s)", 9),
    FieldSpec::right("LOCATE(/s)", 11),
    FieldSpec::right("INSERT(/s)", 11),
];

const BAR: usize = 6;

/// Fill ratios of one slab class, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabRatios {
    /// Items over allocated slots.
    pub item: f64,
    /// Item bytes over the chunk bytes holding them.
    pub data: f64,
    /// Value bytes over item bytes.
    pub payload: f64,
}

/// Ratios for one class. Zero denominators give 0.
pub fn slab_ratios(chunk_size: u64, s: &SlabStats) -> SlabRatios {
    SlabRatios {
        item: percent(s.item_curr as f64, s.slots(chunk_size) as f64).unwrap_or(0.0),
        data: percent(s.data_curr as f64, s.mem_used(chunk_size) as f64).unwrap_or(0.0),
        payload: percent(s.data_value as f64, s.data_curr as f64).unwrap_or(0.0),
    }
}

pub fn render(
    cluster: &ClusterSnapshot,
    rates: &ClusterRates,
    cols: usize,
    clock: &str,
) -> RenderBuffer {
    let slabs = &cluster.slabs;
    let slab_total: i64 = slabs.values().map(|s| s.slab_curr).sum();
    let slot_total: i64 = slabs.iter().map(|(&k, s)| s.slots(k)).sum();
    let slot_used: i64 = slabs.values().map(|s| s.item_curr).sum();
    let usage = percent(slot_used as f64, slot_total as f64).unwrap_or(0.0);
    let mem_max = slabs
        .values()
        .map(SlabStats::mem_total)
        .max()
        .filter(|&m| m > 0)
        .unwrap_or(1);

    let left = format!(
        " - SLAB VIEW - Total Slabs:{}; Slot Used / Allocated: {} /{} ({:3.1}%)",
        format_magnitude(slab_total),
        format_magnitude(slot_used),
        format_magnitude(slot_total),
        usage
    );
    let widths = resolve_widths(&FIELDS, cols);
    let bar_width = widths[BAR];

    let mut rows = Vec::with_capacity(slabs.len() + 1);
    let mut sums = [0.0f64; 5];
    for (&chunk_size, stats) in slabs {
        let ratios = slab_ratios(chunk_size, stats);
        let rate = rates.slabs.get(&chunk_size);
        let values = rate
            .map(|r| rate_values(r, rates.has_previous))
            .unwrap_or([None; 5]);
        for (sum, v) in sums.iter_mut().zip(values) {
            *sum += v.unwrap_or(0.0);
        }
        let mut cells = vec![
            Cell::plain(format_magnitude(chunk_size as i64)),
            Cell::plain(format_magnitude(stats.slab_curr)),
            Cell::plain(format_magnitude(stats.item_curr)),
            Cell::plain(format_pct(ratios.item)),
            Cell::plain(format_pct(ratios.data)),
            Cell::plain(format_pct(ratios.payload)),
            bar_cell(
                bar_width,
                mem_max,
                stats.mem_used(chunk_size),
                stats.mem_total(),
            ),
        ];
        cells.extend(values.iter().map(|&v| match v {
            Some(v) => Cell::plain(format_rate(v)),
            None => Cell::na(),
        }));
        rows.push(layout_row(cells, &FIELDS, &widths));
    }

    let mut totals = vec![
        Cell::plain(NA),
        Cell::plain(format_magnitude(slab_total)),
        Cell::plain(format_magnitude(slot_used)),
        Cell::na(),
        Cell::na(),
        Cell::na(),
        bar_cell(bar_width, mem_max, 0, 0),
    ];
    totals.extend(sums.iter().map(|&v| Cell::plain(format_rate_magnitude(v))));
    rows.push(layout_row(totals, &FIELDS, &widths));

    RenderBuffer {
        status: status_line(&left, clock, cols),
        title: title_line(&FIELDS, &widths, cols),
        rows,
    }
}

fn rate_values(r: &SlabRates, has_previous: bool) -> [Option<f64>; 5] {
    [r.expire, r.evict, r.slab_evict, r.locate, r.insert].map(|rate| rate.shown(has_previous))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ClusterSnapshot {
        let mut c = ClusterSnapshot::default();
        c.slabs.insert(
            96,
            SlabStats {
                slab_curr: 2,
                item_curr: 100,
                data_curr: 9600,
                data_value: 8000,
                evictions: 40,
                ..SlabStats::default()
            },
        );
        c
    }

    #[test]
    fn ratios_for_one_class() {
        let c = scenario();
        let r = slab_ratios(96, &c.slabs[&96]);
        assert!((r.item - 0.4578).abs() < 0.001);
        assert_eq!(r.data, 100.0);
        assert!((r.payload - 83.333).abs() < 0.001);
        assert_eq!(format_pct(r.item), "0.5%");
        assert_eq!(format_pct(r.payload), "83.3%");
    }

    #[test]
    fn ratios_with_zero_denominators() {
        let r = slab_ratios(96, &SlabStats::default());
        assert_eq!((r.item, r.data, r.payload), (0.0, 0.0, 0.0));
        // Chunk larger than a slab page has no slots.
        let s = SlabStats {
            slab_curr: 1,
            item_curr: 1,
            ..SlabStats::default()
        };
        assert_eq!(slab_ratios(2 * 1024 * 1024, &s).item, 0.0);
    }

    #[test]
    fn renders_rows_and_totals() {
        let c = scenario();
        let rates = ClusterRates::compute(&c, None);
        let buf = render(&c, &rates, 140, "12:00:00");

        assert_eq!(buf.status.chars().count(), 140);
        assert!(buf.status.starts_with(" - SLAB VIEW - Total Slabs:      2;"));
        assert!(buf.title.starts_with("SLAB     #SLAB"));
        assert_eq!(buf.rows.len(), 2);

        let row = buf.rows[0].text();
        assert!(row.starts_with("     96      2        100"));
        assert!(row.contains("0.5%"));
        assert!(row.contains("100.0%"));
        assert!(row.contains("83.3%"));
        // First tick: raw eviction count.
        assert!(row.contains("   40.0"));

        let total = buf.rows[1].text();
        assert!(total.starts_with(NA));
        assert!(total.contains("     40"));
    }

    #[test]
    fn new_class_has_no_rate_once_a_baseline_exists() {
        let mut prev = scenario();
        prev.slab_timestamp = 100.0;
        let mut curr = scenario();
        curr.slab_timestamp = 110.0;
        if let Some(s) = curr.slabs.get_mut(&96) {
            s.evictions = 140;
        }
        curr.slabs.insert(
            120,
            SlabStats {
                evictions: 5_000_000,
                ..SlabStats::default()
            },
        );
        let rates = ClusterRates::compute(&curr, Some(&prev));
        let buf = render(&curr, &rates, 140, "12:00:00");

        assert!(buf.rows[0].text().contains("   10.0"));
        let new_class = buf.rows[1].text();
        assert!(new_class.trim_start().starts_with("120"));
        assert!(!new_class.contains("5000000"));
        assert_eq!(new_class.matches(NA.trim()).count(), 5);
        let total = buf.rows[2].text();
        assert!(total.contains("     10"));
        assert!(!total.contains("4.8M"));
    }

    #[test]
    fn empty_cluster_renders_totals_only() {
        let c = ClusterSnapshot::default();
        let rates = ClusterRates::compute(&c, None);
        let buf = render(&c, &rates, 120, "12:00:00");
        assert_eq!(buf.rows.len(), 1);
        assert!(buf.status.contains("(0.0%)"));
    }
}
