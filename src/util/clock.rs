//! Wall-clock helpers.

use chrono::{Local, Utc};

/// Current time as fractional seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Current local time as `HH:MM:SS`, shown at the right of the status line.
pub fn local_clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
