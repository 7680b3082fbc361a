//! Raw-mode terminal session.

use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::debug;

/// Holds the terminal in raw mode on the alternate screen.
///
/// The previous terminal state is restored when the guard is dropped, on
/// early return and on unwind alike.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn start() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        let session = Self { _private: () };
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        debug!("terminal session started");
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore();
        debug!("terminal session restored");
    }
}

fn restore() {
    let _ = disable_raw_mode();
    let mut out = io::stdout();
    let _ = execute!(out, Show, LeaveAlternateScreen);
    let _ = out.flush();
}

/// Restores the terminal before the default panic message is printed.
/// Release builds abort on panic, so `Drop` would not run there.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        default_hook(info);
    }));
}
