//! Color scheme for view style classes.

use crossterm::style::Color as AnsiColor;
use ratatui::style::{Color, Modifier, Style};

use crate::view::StyleClass;

pub struct Theme;

impl Theme {
    pub const WARNING: Color = Color::Red;
    pub const USED: Color = Color::Red;
    pub const ALLOCATED: Color = Color::Green;
    pub const ACCENT: Color = Color::Cyan;
}

pub struct Styles;

impl Styles {
    /// Column-title line.
    pub fn title() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn for_class(class: StyleClass) -> Style {
        match class {
            StyleClass::Normal => Style::default(),
            StyleClass::Warning => Style::default().fg(Theme::WARNING),
            StyleClass::Used => Style::default().fg(Theme::USED),
            StyleClass::Allocated => Style::default().fg(Theme::ALLOCATED),
            StyleClass::Accent => Style::default().fg(Theme::ACCENT),
            StyleClass::Thumb => Style::default()
                .fg(Theme::ACCENT)
                .add_modifier(Modifier::REVERSED),
        }
    }
}

/// Foreground color and reverse flag for the ANSI printer.
pub fn ansi_for_class(class: StyleClass) -> (Option<AnsiColor>, bool) {
    match class {
        StyleClass::Normal => (None, false),
        StyleClass::Warning | StyleClass::Used => (Some(AnsiColor::Red), false),
        StyleClass::Allocated => (Some(AnsiColor::Green), false),
        StyleClass::Accent => (Some(AnsiColor::Cyan), false),
        StyleClass::Thumb => (Some(AnsiColor::Cyan), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_is_red() {
        assert_eq!(Styles::for_class(StyleClass::Warning).fg, Some(Color::Red));
        assert_eq!(Styles::for_class(StyleClass::Normal).fg, None);
        assert!(
            Styles::for_class(StyleClass::Thumb)
                .add_modifier
                .contains(Modifier::REVERSED)
        );
        assert_eq!(ansi_for_class(StyleClass::Allocated), (Some(AnsiColor::Green), false));
    }
}
