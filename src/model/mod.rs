//! Metric data structures shared by the collector, aggregator, rate engine
//! and view renderers.

mod command;
mod endpoint;
mod snapshot;

pub use command::{Category, Command, CommandTable};
pub use endpoint::{DEFAULT_PORT, EndpointParseError, HostEndpoint};
pub use snapshot::{ClusterSnapshot, GlobalCounters, HostSnapshot, SLAB_SIZE, SlabStats};
