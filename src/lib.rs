//! mctop - top-style monitor for a cluster of cache servers.
//!
//! The library provides the metrics pipeline and the screen controller used
//! by the `mctop` binary:
//! - `collector` - per-host `stats` probes over the text protocol
//! - `aggregate` - folds host snapshots into a cluster snapshot
//! - `rates` - per-second rates against the previous cluster snapshot
//! - `view` - slab/host/command table rendering into a text buffer
//! - `tui` - terminal session, poll/render/input loop
//! - `config` - endpoint lists, YAML cluster config, display options

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod fmt;
pub mod model;
pub mod rates;
pub mod tui;
pub mod util;
pub mod view;
