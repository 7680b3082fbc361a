//! Per-host and cluster-wide snapshots.
//!
//! Counter values are signed: the server keeps gauges as signed aggregates of
//! per-thread deltas, and a negative value marks a metric that was never
//! updated.

use std::collections::BTreeMap;

use super::command::CommandTable;
use super::endpoint::HostEndpoint;

/// Bytes per slab page. Used to turn slab counts into slot capacity.
pub const SLAB_SIZE: i64 = 1024 * 1024;

/// Global counters for one host, gathered in one collection pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalCounters {
    /// Seconds since the server started.
    /// Source: `stats` -> `uptime`
    pub uptime: i64,

    /// Open client connections.
    /// Source: `stats` -> `conn_curr`
    pub connections: i64,

    /// Bytes of item data currently stored.
    /// Source: `stats` -> `data_curr`
    pub data: i64,

    /// Configured memory capacity in bytes.
    /// Source: `stats settings` -> `maxbytes`
    pub max_bytes: i64,

    /// Total requests over the tracked command set.
    /// Source: sum of per-command counts
    pub requests: i64,

    /// Items removed because their lifetime ran out.
    /// Source: `stats` -> `item_expire`
    pub expirations: i64,

    /// Live items removed to reclaim memory.
    /// Source: `stats` -> `item_evict`
    pub evictions: i64,

    /// Bytes read from clients.
    /// Source: `stats` -> `data_read`
    pub bytes_read: i64,

    /// Bytes written to clients.
    /// Source: `stats` -> `data_written`
    pub bytes_written: i64,

    /// Requests answered with a server error.
    /// Source: `stats` -> `server_error`
    pub server_errors: i64,

    /// Wall-clock duration of the `stats` exchange, in seconds.
    pub latency: f64,

    /// Sample time, seconds since the epoch.
    /// Source: `stats` -> `aggregate_ts`, or the probe's wall clock
    pub timestamp: f64,
}

/// Metrics for one slab class (one chunk size).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlabStats {
    /// Slab pages allocated to the class.
    /// Source: `stats slabs` -> `<id>:slab_curr`
    pub slab_curr: i64,

    /// Items stored in the class.
    /// Source: `stats slabs` -> `<id>:item_curr`
    pub item_curr: i64,

    /// Item bytes including key and header.
    /// Source: `stats slabs` -> `<id>:data_curr`
    pub data_curr: i64,

    /// Value payload bytes.
    /// Source: `stats slabs` -> `<id>:data_value_curr`
    pub data_value: i64,

    /// Source: `stats slabs` -> `<id>:item_evict`
    pub evictions: i64,

    /// Whole slabs evicted.
    /// Source: `stats slabs` -> `<id>:slab_evict`
    pub slab_evictions: i64,

    /// Source: `stats slabs` -> `<id>:item_expire`
    pub expirations: i64,

    /// Successful lookups, summed over the hit/miss commands.
    pub locate: i64,

    /// Successful inserts, summed over the write commands.
    pub insert: i64,
}

impl SlabStats {
    /// Slots (chunks) allocated across all pages of the class.
    pub fn slots(&self, chunk_size: u64) -> i64 {
        if chunk_size == 0 {
            return 0;
        }
        (SLAB_SIZE / chunk_size as i64) * self.slab_curr
    }

    /// Bytes allocated to the class.
    pub fn mem_total(&self) -> i64 {
        SLAB_SIZE * self.slab_curr
    }

    /// Bytes of allocated chunks holding items.
    pub fn mem_used(&self, chunk_size: u64) -> i64 {
        chunk_size as i64 * self.item_curr
    }

    /// Field-wise sum, used by the aggregator.
    pub fn add(&mut self, other: &SlabStats) {
        self.slab_curr += other.slab_curr;
        self.item_curr += other.item_curr;
        self.data_curr += other.data_curr;
        self.data_value += other.data_value;
        self.evictions += other.evictions;
        self.slab_evictions += other.slab_evictions;
        self.expirations += other.expirations;
        self.locate += other.locate;
        self.insert += other.insert;
    }
}

/// Everything one collection pass gathered from one host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSnapshot {
    pub endpoint: HostEndpoint,
    pub counters: GlobalCounters,
    /// Slab classes keyed by chunk size.
    pub slabs: BTreeMap<u64, SlabStats>,
    pub commands: CommandTable<i64>,
}

/// All reachable hosts of one tick, folded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSnapshot {
    /// Per-host counters, passed through unchanged.
    pub hosts: BTreeMap<HostEndpoint, GlobalCounters>,
    /// Slab classes summed over the hosts that reported each chunk size.
    pub slabs: BTreeMap<u64, SlabStats>,
    /// Command categories summed over the hosts that reported each pair.
    pub commands: CommandTable<i64>,
    /// Aggregation wall clock; slab blocks carry no timestamp of their own.
    pub slab_timestamp: f64,
    /// Mean of the per-host sample timestamps.
    pub command_timestamp: f64,
}
