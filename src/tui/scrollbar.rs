//! Left-margin scrollbar.

use crate::view::{Segment, StyleClass};

/// Thumb geometry on a track of `visible - 2` cells (the ends hold arrows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thumb {
    pub top: usize,
    pub extent: usize,
    pub bottom: usize,
}

fn round_half_up(v: f64) -> usize {
    (v + 0.5).floor().max(0.0) as usize
}

/// Thumb for rows `view_top..view_bottom` of `total`, or `None` when
/// everything fits or the track has no room.
pub fn thumb(visible: usize, total: usize, view_top: usize, view_bottom: usize) -> Option<Thumb> {
    if total <= visible || visible <= 2 {
        return None;
    }
    let track = visible - 2;
    let scale = |row: usize| round_half_up(row as f64 / total as f64 * track as f64).min(track);
    let top = scale(view_top);
    let extent = scale(view_bottom).saturating_sub(top);
    Some(Thumb {
        top,
        extent,
        bottom: track - top - extent,
    })
}

/// One gutter segment per visible row: `^`, track, thumb, track, `v`.
pub fn scrollbar(visible: usize, total: usize, view_top: usize, view_bottom: usize) -> Option<Vec<Segment>> {
    let t = thumb(visible, total, view_top, view_bottom)?;
    let mut cells = Vec::with_capacity(visible);
    cells.push(Segment::new("^", StyleClass::Accent));
    cells.extend((0..t.top).map(|_| Segment::plain(" ")));
    cells.extend((0..t.extent).map(|_| Segment::new(" ", StyleClass::Thumb)));
    cells.extend((0..t.bottom).map(|_| Segment::plain(" ")));
    cells.push(Segment::new("v", StyleClass::Accent));
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumb_geometry() {
        let t = thumb(20, 50, 10, 30).unwrap();
        assert_eq!(t, Thumb { top: 4, extent: 7, bottom: 7 });
    }

    #[test]
    fn omitted_when_everything_fits() {
        assert_eq!(thumb(20, 20, 0, 20), None);
        assert_eq!(thumb(20, 5, 0, 5), None);
        assert!(scrollbar(20, 10, 0, 10).is_none());
    }

    #[test]
    fn thumb_stays_on_track() {
        for visible in 3..30 {
            for total in (visible + 1)..80 {
                for top in 0..=(total - visible) {
                    let t = thumb(visible, total, top, top + visible).unwrap();
                    assert_eq!(t.top + t.extent + t.bottom, visible - 2);
                }
            }
        }
    }

    #[test]
    fn one_segment_per_row() {
        let bar = scrollbar(20, 50, 10, 30).unwrap();
        assert_eq!(bar.len(), 20);
        assert_eq!(bar[0].text, "^");
        assert_eq!(bar[19].text, "v");
        let thumb_cells = bar.iter().filter(|s| s.style == StyleClass::Thumb).count();
        assert_eq!(thumb_cells, 7);
    }
}
