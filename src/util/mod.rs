//! Utility helpers for mctop.

mod clock;

pub use clock::{local_clock, now_secs};
