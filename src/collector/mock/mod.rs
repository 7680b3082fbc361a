//! Test doubles for the collector.
//!
//! `MockSource` answers probes from canned snapshots without touching the
//! network; `MockServer` is a loopback listener that replays protocol
//! transcripts for exercising `TcpStatsSource` end to end. `scenarios` holds
//! the shared fixtures.

pub mod scenarios;
mod server;
mod source;

pub use server::MockServer;
pub use source::MockSource;
