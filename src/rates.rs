//! Rate computation over consecutive cluster snapshots.
//!
//! Every counter is turned into a per-second rate against the previous
//! tick's snapshot. With no previous snapshot, or when an entity is new
//! since the previous tick, the cumulative value is reported instead and
//! tagged as [`Rate::Absolute`] so views can tell the two apart.
//!
//! Counter resets are not detected: a restarted server yields a large
//! negative rate for one tick.

use std::collections::BTreeMap;

use crate::model::{ClusterSnapshot, CommandTable, GlobalCounters, HostEndpoint, SlabStats};

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

/// A rate, or the raw cumulative counter when no baseline exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    Absolute(f64),
    PerSec(f64),
}

impl Rate {
    pub fn value(self) -> f64 {
        match self {
            Rate::Absolute(v) | Rate::PerSec(v) => v,
        }
    }

    pub fn is_per_sec(self) -> bool {
        matches!(self, Rate::PerSec(_))
    }

    /// Value for a per-second column. On a tick that has a previous
    /// snapshot, an entity without a baseline of its own has no rate and
    /// yields `None`; its lifetime count must not be shown as one.
    pub fn shown(self, has_previous: bool) -> Option<f64> {
        if has_previous && !self.is_per_sec() {
            None
        } else {
            Some(self.value())
        }
    }
}

/// `(curr - prev) / (t_curr - t_prev)`, or 0 when no time has elapsed.
pub fn per_second(curr: i64, prev: i64, t_curr: f64, t_prev: f64) -> f64 {
    let elapsed = t_curr - t_prev;
    if elapsed <= 0.0 {
        return 0.0;
    }
    (curr - prev) as f64 / elapsed
}

/// Rate of one counter against an optional `(value, timestamp)` baseline.
pub fn rate(curr: i64, t_curr: f64, prev: Option<(i64, f64)>) -> Rate {
    match prev {
        Some((prev, t_prev)) => Rate::PerSec(per_second(curr, prev, t_curr, t_prev)),
        None => Rate::Absolute(curr as f64),
    }
}

// ---------------------------------------------------------------------------
// Per-entity rates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabRates {
    pub expire: Rate,
    pub evict: Rate,
    pub slab_evict: Rate,
    pub locate: Rate,
    pub insert: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostRates {
    pub expire: Rate,
    pub evict: Rate,
    pub bytes_read: Rate,
    pub bytes_written: Rate,
    pub requests: Rate,
    pub server_errors: Rate,
}

/// Slab class rates, keyed like `curr.slabs`. Uses the slab timestamps.
pub fn slab_rates(
    curr: &ClusterSnapshot,
    prev: Option<&ClusterSnapshot>,
) -> BTreeMap<u64, SlabRates> {
    let t_curr = curr.slab_timestamp;
    curr.slabs
        .iter()
        .map(|(&chunk_size, now)| {
            let before: Option<(&SlabStats, f64)> = prev
                .and_then(|p| p.slabs.get(&chunk_size).map(|s| (s, p.slab_timestamp)));
            let r = |field: fn(&SlabStats) -> i64| {
                rate(field(now), t_curr, before.map(|(s, t)| (field(s), t)))
            };
            let rates = SlabRates {
                expire: r(|s| s.expirations),
                evict: r(|s| s.evictions),
                slab_evict: r(|s| s.slab_evictions),
                locate: r(|s| s.locate),
                insert: r(|s| s.insert),
            };
            (chunk_size, rates)
        })
        .collect()
}

/// Per-host rates. Each host uses its own sample timestamps.
pub fn host_rates(
    curr: &ClusterSnapshot,
    prev: Option<&ClusterSnapshot>,
) -> BTreeMap<HostEndpoint, HostRates> {
    curr.hosts
        .iter()
        .map(|(endpoint, now)| {
            let before = prev.and_then(|p| p.hosts.get(endpoint));
            let r = |field: fn(&GlobalCounters) -> i64| {
                rate(
                    field(now),
                    now.timestamp,
                    before.map(|b| (field(b), b.timestamp)),
                )
            };
            let rates = HostRates {
                expire: r(|c| c.expirations),
                evict: r(|c| c.evictions),
                bytes_read: r(|c| c.bytes_read),
                bytes_written: r(|c| c.bytes_written),
                requests: r(|c| c.requests),
                server_errors: r(|c| c.server_errors),
            };
            (endpoint.clone(), rates)
        })
        .collect()
}

/// Command category rates over the averaged command timestamps.
///
/// Only pairs present in `curr` appear in the result.
pub fn command_rates(curr: &ClusterSnapshot, prev: Option<&ClusterSnapshot>) -> CommandTable<Rate> {
    let mut table = CommandTable::new();
    for (cmd, cat, value) in curr.commands.iter() {
        let before = prev.and_then(|p| {
            p.commands
                .get(cmd, cat)
                .map(|v| (v, p.command_timestamp))
        });
        table.insert(cmd, cat, rate(value, curr.command_timestamp, before));
    }
    table
}

/// All rates the views need for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRates {
    pub slabs: BTreeMap<u64, SlabRates>,
    pub hosts: BTreeMap<HostEndpoint, HostRates>,
    pub commands: CommandTable<Rate>,
    /// Whether a previous sample existed; rate-only rollups depend on it.
    pub has_previous: bool,
}

impl ClusterRates {
    pub fn compute(curr: &ClusterSnapshot, prev: Option<&ClusterSnapshot>) -> Self {
        Self {
            slabs: slab_rates(curr, prev),
            hosts: host_rates(curr, prev),
            commands: command_rates(curr, prev),
            has_previous: prev.is_some(),
        }
    }
}
