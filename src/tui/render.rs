//! Drawing a render buffer: ratatui frames for the interactive screen and
//! a line printer for plain and single-shot output.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color as AnsiColor, Print, SetAttribute, SetForegroundColor};
use ratatui::Frame;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::help::HELP_LINES;
use super::scrollbar::scrollbar;
use super::state::ViewState;
use super::style::{Styles, ansi_for_class};
use crate::view::{RenderBuffer, Row, StyleClass};

/// Data rows on screen for the current scroll offset, with the scrollbar
/// drawn over the first column when the buffer overflows.
pub fn window(buf: &RenderBuffer, state: &ViewState, with_scrollbar: bool) -> Vec<Row> {
    let visible = state.visible_rows();
    let total = buf.rows.len();
    let top = state.scroll.min(total.saturating_sub(visible));
    let bottom = total.min(top + visible);
    let rows = &buf.rows[top..bottom];

    match scrollbar(visible, total, top, bottom).filter(|_| with_scrollbar) {
        Some(gutter) => rows
            .iter()
            .zip(gutter)
            .map(|(row, g)| row.with_gutter(g))
            .collect(),
        None => rows.to_vec(),
    }
}

fn to_line(row: &Row) -> Line<'static> {
    Line::from(
        row.segments
            .iter()
            .map(|s| Span::styled(s.text.clone(), Styles::for_class(s.style)))
            .collect::<Vec<_>>(),
    )
}

/// Draws the whole screen for one frame.
pub fn draw(frame: &mut Frame, buf: &RenderBuffer, state: &ViewState) {
    let mut lines = Vec::with_capacity(state.visible_rows() + RenderBuffer::HEADER_LINES);
    lines.push(Line::raw(buf.status.clone()));
    lines.push(Line::styled(buf.title.clone(), Styles::title()));
    lines.extend(window(buf, state, true).iter().map(to_line));
    frame.render_widget(Paragraph::new(lines), frame.area());
}

pub fn draw_help(frame: &mut Frame) {
    let lines: Vec<Line> = HELP_LINES.iter().map(|l| Line::raw(*l)).collect();
    frame.render_widget(Paragraph::new(lines), frame.area());
}

fn write_row<W: Write>(out: &mut W, row: &Row, color: bool) -> io::Result<()> {
    for seg in &row.segments {
        if !color || seg.style == StyleClass::Normal {
            out.write_all(seg.text.as_bytes())?;
            continue;
        }
        let (fg, reverse) = ansi_for_class(seg.style);
        if let Some(c) = fg {
            queue!(out, SetForegroundColor(c))?;
        }
        if reverse {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(out, Print(&seg.text))?;
        if reverse {
            queue!(out, SetAttribute(Attribute::NoReverse))?;
        }
        if fg.is_some() {
            queue!(out, SetForegroundColor(AnsiColor::Reset))?;
        }
    }
    Ok(())
}

/// Prints every row of `buf` as text lines, with ANSI styling when `color`
/// is set.
pub fn print_buffer<W: Write>(out: &mut W, buf: &RenderBuffer, color: bool) -> io::Result<()> {
    writeln!(out, "{}", buf.status)?;
    if color {
        queue!(
            out,
            SetAttribute(Attribute::Reverse),
            Print(&buf.title),
            SetAttribute(Attribute::NoReverse)
        )?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", buf.title)?;
    }
    for row in &buf.rows {
        write_row(out, row, color)?;
        writeln!(out)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Mode, Segment};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Modifier;

    fn buffer(rows: usize) -> RenderBuffer {
        RenderBuffer {
            status: "status".to_string(),
            title: "TITLE".to_string(),
            rows: (0..rows)
                .map(|i| Row::from(Segment::plain(format!("row{:02}", i))))
                .collect(),
        }
    }

    fn state(rows: u16, total: usize, scroll: usize) -> ViewState {
        let mut s = ViewState::new(Mode::Slab);
        s.resize(40, rows);
        s.set_total_rows(total);
        s.scroll = scroll;
        s
    }

    #[test]
    fn window_without_overflow_has_no_scrollbar() {
        let buf = buffer(5);
        let rows = window(&buf, &state(23, 5, 0), true);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].text(), "row00");
    }

    #[test]
    fn window_applies_scroll_and_gutter() {
        let buf = buffer(50);
        let rows = window(&buf, &state(23, 50, 10), true);
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].text(), "^ow10");
        assert_eq!(rows[19].text(), "vow29");

        let plain = window(&buf, &state(23, 50, 10), false);
        assert_eq!(plain[0].text(), "row10");
    }

    #[test]
    fn print_plain_has_no_escapes() {
        let mut buf = buffer(1);
        buf.rows[0].push(Segment::new("!", StyleClass::Warning));
        let mut out = Vec::new();
        print_buffer(&mut out, &buf, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "status\nTITLE\nrow00!\n");
    }

    #[test]
    fn print_color_wraps_styled_segments() {
        let mut buf = buffer(1);
        buf.rows[0].push(Segment::new("!", StyleClass::Warning));
        let mut out = Vec::new();
        print_buffer(&mut out, &buf, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{1b}[7mTITLE"));
        assert!(text.contains("row00\u{1b}["));
        assert!(text.contains('!'));
    }

    #[test]
    fn draw_reverses_title() {
        let buf = buffer(3);
        let st = state(6, 3, 0);
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal.draw(|f| draw(f, &buf, &st)).unwrap();
        let screen = terminal.backend().buffer();
        assert_eq!(screen[(0, 0)].symbol(), "s");
        assert!(screen[(0, 1)].modifier.contains(Modifier::REVERSED));
        assert_eq!(screen[(0, 2)].symbol(), "r");
    }
}
