//! Folds per-host snapshots into one cluster snapshot.

use tracing::debug;

use crate::collector::ProbeResult;
use crate::model::{ClusterSnapshot, HostSnapshot};

/// Aggregates the successful probes of a tick, dropping the failed ones.
pub fn aggregate_results(results: Vec<ProbeResult>, now: f64) -> ClusterSnapshot {
    let total = results.len();
    let snapshots: Vec<HostSnapshot> = results
        .into_iter()
        .filter_map(|(_, result)| result.ok())
        .collect();
    if snapshots.len() < total {
        debug!(
            reachable = snapshots.len(),
            configured = total,
            "aggregating partial cluster"
        );
    }
    aggregate(&snapshots, now)
}

/// Sums slab and command metrics over `snapshots`.
///
/// Pairs absent from every host stay absent. The command timestamp is the
/// mean of the host sample timestamps (`now` when there are no hosts); slab
/// blocks carry no timestamp of their own, so the slab timestamp is `now`.
pub fn aggregate(snapshots: &[HostSnapshot], now: f64) -> ClusterSnapshot {
    let mut cluster = ClusterSnapshot {
        slab_timestamp: now,
        command_timestamp: now,
        ..ClusterSnapshot::default()
    };

    for snap in snapshots {
        cluster
            .hosts
            .insert(snap.endpoint.clone(), snap.counters.clone());
        for (&chunk_size, stats) in &snap.slabs {
            cluster.slabs.entry(chunk_size).or_default().add(stats);
        }
        for (cmd, cat, value) in snap.commands.iter() {
            cluster.commands.accumulate(cmd, cat, value);
        }
    }

    if !snapshots.is_empty() {
        let sum: f64 = snapshots.iter().map(|s| s.counters.timestamp).sum();
        cluster.command_timestamp = sum / snapshots.len() as f64;
    }
    cluster
}
