//! UI-agnostic table rendering.
//!
//! Each sub-module turns a cluster snapshot and its rates into a
//! [`common::RenderBuffer`] for one view mode. The TUI (or the plain
//! printer) then maps the buffer to terminal output.

pub mod bar;
pub mod command;
pub mod common;
pub mod field;
pub mod host;
pub mod slab;

use std::fmt;

use crate::model::ClusterSnapshot;
use crate::rates::ClusterRates;

pub use common::{Cell, RenderBuffer, Row, Segment, StyleClass};

/// Which table is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Slab,
    Host,
    Command,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Slab => "slab",
            Mode::Host => "host",
            Mode::Command => "command",
        };
        f.write_str(name)
    }
}

/// Renders `mode` for a terminal `cols` wide.
pub fn render(
    mode: Mode,
    cluster: &ClusterSnapshot,
    rates: &ClusterRates,
    cols: usize,
    clock: &str,
) -> RenderBuffer {
    match mode {
        Mode::Slab => slab::render(cluster, rates, cols, clock),
        Mode::Host => host::render(cluster, rates, cols, clock),
        Mode::Command => command::render(rates, cols, clock),
    }
}
