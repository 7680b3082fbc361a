//! Two-segment utilization bar.

use super::common::{Cell, Segment, StyleClass};

fn scale(value: i64, max: i64, width: usize) -> usize {
    let v = value.max(0) as f64 / max as f64 * width as f64;
    ((v + 0.5).floor() as usize).min(width)
}

/// Widths of the `used` and `allocated - used` segments for a bar of
/// `width` cells whose full length stands for `max`.
///
/// Each end is rounded half-up; the two widths never sum past `width`.
pub fn bar_extents(width: usize, max: i64, used: i64, total: i64) -> (usize, usize) {
    if width == 0 || max <= 0 {
        return (0, 0);
    }
    let used_ext = scale(used, max, width);
    let total_ext = scale(total, max, width);
    (used_ext, total_ext.saturating_sub(used_ext))
}

/// Bar cell `" " + bar + " "` filling `cell_width` columns.
pub fn bar_cell(cell_width: usize, max: i64, used: i64, total: i64) -> Cell {
    if cell_width < 2 {
        return Cell::plain(" ".repeat(cell_width));
    }
    let width = cell_width - 2;
    let (used_ext, alloc_ext) = bar_extents(width, max, used, total);
    Cell::from_segments(vec![
        Segment::plain(" "),
        Segment::new("#".repeat(used_ext), StyleClass::Used),
        Segment::new("-".repeat(alloc_ext), StyleClass::Allocated),
        Segment::plain(" ".repeat(width - used_ext - alloc_ext + 1)),
    ])
}
