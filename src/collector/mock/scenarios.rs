//! Canned protocol transcripts and snapshots.

use crate::collector::protocol::{self, RawStats, StatLine};
use crate::model::{HostEndpoint, HostSnapshot};

/// `stats` response of a small, lightly loaded server.
pub const STATS: &str = "\
STAT pid 4242\r
STAT version 2.6.0\r
STAT uptime 3600\r
STAT aggregate_ts 1700000000.500000\r
STAT conn_curr 12\r
STAT data_curr 9600\r
STAT item_expire 5\r
STAT item_evict 3\r
STAT data_read 204800\r
STAT data_written 409600\r
STAT server_error 0\r
STAT set 100\r
STAT set_success 95\r
STAT get 300\r
STAT get_key_hit 250\r
STAT get_key_miss 50\r
STAT delete 10\r
STAT delete_hit 8\r
STAT delete_miss 2\r
END\r
";

/// `stats settings` response with a 64 MiB memory limit.
pub const SETTINGS: &str = "\
STAT prefix_delimiter :\r
STAT maxbytes 67108864\r
STAT evict_opt 1\r
END\r
";

/// `stats slabs` response with a single populated class.
pub const SLABS: &str = "\
STAT 1:chunk_size 96\r
STAT 1:slab_curr 1\r
STAT 1:item_curr 100\r
STAT 1:data_curr 9600\r
STAT 1:data_value_curr 8000\r
STAT 1:item_expire 5\r
STAT 1:item_evict 3\r
STAT 1:slab_evict 0\r
STAT 1:get_key_hit 250\r
STAT 1:set_success 95\r
STAT active_slabs 1\r
STAT total_malloced 1048576\r
END\r
";

/// Responses in request order, as `MockServer` expects them.
pub fn full_transcript() -> Vec<String> {
    vec![STATS.to_string(), SETTINGS.to_string(), SLABS.to_string()]
}

fn block(text: &str) -> Vec<StatLine> {
    let mut reader = text.as_bytes();
    protocol::read_block(&mut reader).unwrap_or_default()
}

pub fn raw_stats() -> RawStats {
    RawStats {
        stats: block(STATS),
        settings: block(SETTINGS),
        slabs: block(SLABS),
        latency: 0.0005,
        probed_at: 1_700_000_000.0,
    }
}

/// The canned host, reported under `endpoint`.
pub fn host_snapshot(endpoint: &HostEndpoint) -> HostSnapshot {
    protocol::build_snapshot(endpoint.clone(), &raw_stats()).unwrap_or_else(|_| HostSnapshot {
        endpoint: endpoint.clone(),
        counters: Default::default(),
        slabs: Default::default(),
        commands: Default::default(),
    })
}
