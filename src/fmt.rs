//! Cell formatting helpers shared by all views.
//!
//! Pure functions over plain numbers; no styling or layout. Widths are
//! chosen so each helper fills its column without further padding.

/// Placeholder for "not applicable" cells.
pub const NA: &str = " -- ";

const KIB: f64 = 1024.0;

// ---------------------------------------------------------------------------
// Magnitudes
// ---------------------------------------------------------------------------

/// Binary-scaled count or byte size, 7 characters wide.
///
/// A unit is used only from 1.1x its size upward, so values just under the
/// next unit (e.g. 1000 bytes) keep the smaller unit instead of reading as
/// `1.0K`.
///
/// `"    512"`, `"   1.5K"`, `"  64.0M"`
pub fn format_magnitude(v: i64) -> String {
    let f = v as f64;
    if f < 1.1 * KIB {
        format!("{:7}", v)
    } else if f < 1.1 * KIB.powi(2) {
        format!("{:6.1}K", f / KIB)
    } else if f < 1.1 * KIB.powi(3) {
        format!("{:6.1}M", f / KIB.powi(2))
    } else if f < 1.1 * KIB.powi(4) {
        format!("{:6.1}G", f / KIB.powi(3))
    } else {
        format!("{:6.1}T", f / KIB.powi(4))
    }
}

/// Same as [`format_magnitude`] for a rate, truncated toward zero.
pub fn format_rate_magnitude(v: f64) -> String {
    format_magnitude(v as i64)
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Age in whole seconds: seconds up to 90s, minutes up to 90min, then hours.
pub fn format_age(secs: i64) -> String {
    if secs <= 90 {
        format!("{:4}s", secs)
    } else if secs <= 90 * 60 {
        format!("{:4}m", secs / 60)
    } else {
        format!("{:4}h", secs / 3600)
    }
}

/// Short duration in fractional seconds: microseconds up to 1.5ms,
/// milliseconds up to 1.5s, then seconds, minutes and hours.
pub fn format_latency(secs: f64) -> String {
    if secs <= 0.0015 {
        format!("{:4}us", (secs * 1_000_000.0) as i64)
    } else if secs <= 1.5 {
        format!("{:4}ms", (secs * 1000.0) as i64)
    } else if secs <= 90.0 {
        format!("{:3}sec", secs as i64)
    } else if secs <= 90.0 * 60.0 {
        format!("{:3}min", (secs / 60.0) as i64)
    } else {
        format!("{:4}hr", (secs / 3600.0) as i64)
    }
}

// ---------------------------------------------------------------------------
// Ratios and rates
// ---------------------------------------------------------------------------

/// Percentage with a trailing `%`: `"83.3%"`.
pub fn format_pct(v: f64) -> String {
    format!("{:3.1}%", v)
}

/// Bare one-decimal number: `"83.3"`.
pub fn format_ratio(v: f64) -> String {
    format!("{:3.1}", v)
}

/// Per-second rate, 7 characters wide: `"   50.0"`.
pub fn format_rate(v: f64) -> String {
    format!("{:7.1}", v)
}

/// `num * 100 / den`, or `None` when the denominator is not positive.
pub fn percent(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num * 100.0 / den)
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Over,
    Under,
}

/// Warning threshold for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub level: f64,
    pub direction: Direction,
}

impl Threshold {
    pub const fn over(level: f64) -> Self {
        Self {
            level,
            direction: Direction::Over,
        }
    }

    pub const fn under(level: f64) -> Self {
        Self {
            level,
            direction: Direction::Under,
        }
    }

    /// Whether `value` crosses the threshold. Negative values mark metrics
    /// that were never updated and never warn.
    pub fn warns(&self, value: f64) -> bool {
        if value < 0.0 {
            return false;
        }
        match self.direction {
            Direction::Over => value > self.level,
            Direction::Under => value < self.level,
        }
    }
}
