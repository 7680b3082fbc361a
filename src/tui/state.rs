//! Screen state owned by the control loop.

use crate::view::{Mode, RenderBuffer};

/// Terminal size used until the real one is known, or when it cannot be
/// queried (output redirected).
pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 1000;

/// Current mode, scroll position and terminal geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub mode: Mode,
    /// Index of the first data row shown.
    pub scroll: usize,
    pub rows: u16,
    pub cols: u16,
    /// Data rows in the current buffer.
    pub total_rows: usize,
    /// Set on a resize event, consumed at the next draw.
    pub resize_pending: bool,
}

impl ViewState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            scroll: 0,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            total_rows: 0,
            resize_pending: false,
        }
    }

    /// Data rows that fit below the headers, keeping the last line free.
    pub fn visible_rows(&self) -> usize {
        (self.rows as usize).saturating_sub(RenderBuffer::HEADER_LINES + 1)
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.total_rows.saturating_sub(self.visible_rows())
    }

    pub fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
        self.clamp_scroll();
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.scroll = 0;
    }

    pub fn set_total_rows(&mut self, total: usize) {
        self.total_rows = total;
        self.clamp_scroll();
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.resize_pending = false;
        self.clamp_scroll();
    }
}
