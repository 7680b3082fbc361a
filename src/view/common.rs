//! UI-agnostic view model types.
//!
//! Views produce styled text without depending on a rendering framework.
//! The TUI maps [`StyleClass`] to ratatui styles; the plain printer maps it
//! to ANSI color codes or drops it.

use crate::fmt::{NA, Threshold};

/// Style classification for a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StyleClass {
    #[default]
    Normal,
    /// Value crossed its warning threshold (red).
    Warning,
    /// Bar segment for memory holding items (red).
    Used,
    /// Bar segment for allocated but unused memory (green).
    Allocated,
    /// Scrollbar arrows (cyan).
    Accent,
    /// Scrollbar thumb (reversed cyan).
    Thumb,
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: StyleClass,
}

impl Segment {
    pub fn new(text: impl Into<String>, style: StyleClass) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, StyleClass::Normal)
    }

    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// One table cell, possibly made of several styled segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub segments: Vec<Segment>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::plain(text)],
        }
    }

    pub fn styled(text: impl Into<String>, style: StyleClass) -> Self {
        Self {
            segments: vec![Segment::new(text, style)],
        }
    }

    pub fn na() -> Self {
        Self::plain(NA)
    }

    /// `text`, in the warning style when `value` crosses `threshold`.
    pub fn checked(text: impl Into<String>, value: f64, threshold: Threshold) -> Self {
        if threshold.warns(value) {
            Self::styled(text, StyleClass::Warning)
        } else {
            Self::plain(text)
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }
}

/// One output line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub segments: Vec<Segment>,
}

impl Row {
    pub fn push(&mut self, segment: Segment) {
        if segment.text.is_empty() {
            return;
        }
        // Merge adjacent runs of the same style.
        if let Some(last) = self.segments.last_mut()
            && last.style == segment.style
        {
            last.text.push_str(&segment.text);
            return;
        }
        self.segments.push(segment);
    }

    /// Text without styling.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }

    /// Replaces the first character of the row with `gutter`.
    pub fn with_gutter(&self, gutter: Segment) -> Row {
        let mut out = Row::default();
        out.push(gutter);
        let mut skipped = false;
        for seg in &self.segments {
            if skipped {
                out.push(seg.clone());
                continue;
            }
            let mut chars = seg.text.chars();
            if chars.next().is_some() {
                skipped = true;
                out.push(Segment::new(chars.as_str(), seg.style));
            }
        }
        out
    }
}

impl From<Segment> for Row {
    fn from(segment: Segment) -> Self {
        let mut row = Row::default();
        row.push(segment);
        row
    }
}

/// Output of one view render: status line, column titles and data rows.
///
/// Rebuilt in full every tick and handed to the screen as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderBuffer {
    pub status: String,
    /// Column titles, drawn reversed.
    pub title: String,
    pub rows: Vec<Row>,
}

impl RenderBuffer {
    /// Lines taken by the status and title headers.
    pub const HEADER_LINES: usize = 2;
}
