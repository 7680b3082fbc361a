//! Column definitions and width resolution.

use super::common::{Cell, Row, Segment};

/// Columns left free to the right of the table when sizing an auto column.
pub const AUTO_MARGIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Fixed(usize),
    /// Takes the terminal width not used by the fixed columns.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// Static description of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub title: &'static str,
    pub width: Width,
    pub justify: Justify,
}

impl FieldSpec {
    pub const fn left(title: &'static str, width: usize) -> Self {
        Self {
            title,
            width: Width::Fixed(width),
            justify: Justify::Left,
        }
    }

    pub const fn right(title: &'static str, width: usize) -> Self {
        Self {
            title,
            width: Width::Fixed(width),
            justify: Justify::Right,
        }
    }

    pub const fn auto(title: &'static str) -> Self {
        Self {
            title,
            width: Width::Auto,
            justify: Justify::Right,
        }
    }
}

/// Concrete widths for `cols` terminal columns.
///
/// At most one field per view is `Auto`; it gets
/// `cols - sum(fixed) - AUTO_MARGIN`, never less than zero.
pub fn resolve_widths(fields: &[FieldSpec], cols: usize) -> Vec<usize> {
    let fixed: usize = fields
        .iter()
        .map(|f| match f.width {
            Width::Fixed(w) => w,
            Width::Auto => 0,
        })
        .sum();
    let auto = cols.saturating_sub(fixed + AUTO_MARGIN);
    fields
        .iter()
        .map(|f| match f.width {
            Width::Fixed(w) => w,
            Width::Auto => auto,
        })
        .collect()
}

fn pad(text: &str, width: usize, justify: Justify) -> String {
    match justify {
        Justify::Left => format!("{:<width$}", text, width = width),
        Justify::Right => format!("{:>width$}", text, width = width),
    }
}

/// Column-title line, padded with spaces to `cols`.
pub fn title_line(fields: &[FieldSpec], widths: &[usize], cols: usize) -> String {
    let mut line: String = fields
        .iter()
        .zip(widths)
        .map(|(f, &w)| pad(f.title, w, f.justify))
        .collect();
    let used = line.chars().count();
    line.extend(std::iter::repeat_n(' ', cols.saturating_sub(used)));
    line
}

/// Lays `cells` out in their columns. Cells wider than their column are
/// kept whole.
pub fn layout_row(cells: Vec<Cell>, fields: &[FieldSpec], widths: &[usize]) -> Row {
    let mut row = Row::default();
    for ((cell, field), &width) in cells.into_iter().zip(fields).zip(widths) {
        let fill = width.saturating_sub(cell.width());
        if field.justify == Justify::Right {
            row.push(Segment::plain(" ".repeat(fill)));
        }
        for seg in cell.segments {
            row.push(seg);
        }
        if field.justify == Justify::Left {
            row.push(Segment::plain(" ".repeat(fill)));
        }
    }
    row
}

/// Status line: `left` at the start and `clock` flush right, exactly `cols`
/// wide. `left` is cut when the terminal is too narrow for both, and the
/// clock keeps only its first `cols` characters when it does not fit alone.
pub fn status_line(left: &str, clock: &str, cols: usize) -> String {
    let clock: String = clock.chars().take(cols).collect();
    let clock_w = clock.chars().count();
    let room = cols.saturating_sub(clock_w + 1);
    let left: String = left.chars().take(room).collect();
    let fill = cols.saturating_sub(left.chars().count() + clock_w);
    let mut line = left;
    line.extend(std::iter::repeat_n(' ', fill));
    line.push_str(&clock);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::common::StyleClass;

    const FIELDS: [FieldSpec; 3] = [
        FieldSpec::left("NAME", 6),
        FieldSpec::auto(" "),
        FieldSpec::right("N", 4),
    ];

    #[test]
    fn auto_width_takes_the_rest() {
        assert_eq!(resolve_widths(&FIELDS, 40), vec![6, 27, 4]);
        assert_eq!(resolve_widths(&FIELDS, 10), vec![6, 0, 4]);
    }

    #[test]
    fn title_is_padded() {
        let widths = resolve_widths(&FIELDS, 20);
        let title = title_line(&FIELDS, &widths, 20);
        assert_eq!(title.len(), 20);
        assert!(title.starts_with("NAME  "));
    }

    #[test]
    fn row_cells_are_justified() {
        let fields = [FieldSpec::left("A", 5), FieldSpec::right("B", 5)];
        let row = layout_row(
            vec![Cell::plain("ab"), Cell::styled("1", StyleClass::Warning)],
            &fields,
            &[5, 5],
        );
        assert_eq!(row.text(), "ab       1");
        assert_eq!(row.segments.last().map(|s| s.style), Some(StyleClass::Warning));
    }

    #[test]
    fn status_line_is_exact_width() {
        let line = status_line(" - SLAB VIEW", "12:00:00", 30);
        assert_eq!(line.len(), 30);
        assert!(line.ends_with("12:00:00"));
        let narrow = status_line(" - SLAB VIEW - lots of text", "12:00:00", 15);
        assert_eq!(narrow.len(), 15);
        assert!(narrow.ends_with(" 12:00:00"));
    }

    #[test]
    fn status_line_narrower_than_clock() {
        assert_eq!(status_line(" - HOST VIEW", "12:00:00", 5), "12:00");
        assert_eq!(status_line(" - HOST VIEW", "12:00:00", 8), "12:00:00");
        assert_eq!(status_line(" - HOST VIEW", "12:00:00", 0), "");
    }
}
