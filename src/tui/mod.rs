//! Terminal user interface for mctop.
//!
//! Owns the terminal session and drives the poll/render/input loop in the
//! style of top: one collection pass per interval, keyboard polled in short
//! slices in between.

mod app;
mod help;
mod input;
mod render;
mod scrollbar;
mod session;
mod state;
mod style;

pub use app::{App, MIN_WAIT, POLL_SLICE};
pub use input::{KeyAction, handle_key};
pub use render::print_buffer;
pub use scrollbar::{Thumb, thumb};
pub use state::{DEFAULT_COLS, DEFAULT_ROWS, ViewState};
