//! Colours and glyphs for the MKS OS desktop.
//!
//! One fixed palette. The persisted theme choice does not re-colour anything.

use ratatui::style::{Color, Modifier, Style};

use mks_engine::DESKTOP_BACKGROUND;

mod colors {
    use super::Color;

    // === Desktop ===
    pub const GRID: Color = Color::Rgb(0x0f, 0x2a, 0x6b);
    pub const ICON_FILL: Color = Color::Rgb(0x33, 0x66, 0x99);
    pub const ICON_EDGE: Color = Color::Rgb(0x66, 0x99, 0xcc);

    // === Chrome ===
    pub const TASKBAR: Color = Color::Rgb(0x17, 0x17, 0x17);
    pub const MENU: Color = Color::Rgb(0x11, 0x11, 0x11);
    pub const WINDOW: Color = Color::Rgb(0x1e, 0x1e, 0x24);
    pub const WINDOW_BORDER: Color = Color::Rgb(0x55, 0x5a, 0x66);
    pub const FOCUS_BORDER: Color = ICON_EDGE;
    pub const HIGHLIGHT: Color = Color::Rgb(0x2a, 0x4d, 0x7a);

    // === Text ===
    pub const TEXT: Color = Color::Rgb(0xe6, 0xe6, 0xe6);
    pub const TEXT_MUTED: Color = Color::Rgb(0x8a, 0x8a, 0x8a);
    pub const HEADING: Color = ICON_EDGE;
    pub const ERROR: Color = Color::Rgb(0xff, 0x5d, 0x62);
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub desktop: Color,
    pub grid: Color,
    pub icon_fill: Color,
    pub icon_edge: Color,
    pub taskbar: Color,
    pub menu: Color,
    pub window: Color,
    pub window_border: Color,
    pub focus_border: Color,
    pub highlight: Color,
    pub text: Color,
    pub text_muted: Color,
    pub heading: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        let (r, g, b) = DESKTOP_BACKGROUND;
        Self {
            desktop: Color::Rgb(r, g, b),
            grid: colors::GRID,
            icon_fill: colors::ICON_FILL,
            icon_edge: colors::ICON_EDGE,
            taskbar: colors::TASKBAR,
            menu: colors::MENU,
            window: colors::WINDOW,
            window_border: colors::WINDOW_BORDER,
            focus_border: colors::FOCUS_BORDER,
            highlight: colors::HIGHLIGHT,
            text: colors::TEXT,
            text_muted: colors::TEXT_MUTED,
            heading: colors::HEADING,
            error: colors::ERROR,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

/// Single-cell glyphs used by the desktop chrome.
pub mod glyphs {
    pub const GRID_DOT: &str = "·";
    pub const CLOCK_SEPARATOR: &str = "│";
    pub const CLOSE_BUTTON: &str = "[X]";
    pub const MENU_POINTER: &str = "▸";
}

pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn taskbar(palette: &Palette) -> Style {
        Style::default().fg(palette.text).bg(palette.taskbar)
    }

    #[must_use]
    pub fn start_button(palette: &Palette, menu_open: bool) -> Style {
        let style = Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD);
        if menu_open {
            style.bg(palette.highlight)
        } else {
            style.bg(palette.taskbar)
        }
    }

    #[must_use]
    pub fn window_border(palette: &Palette, focused: bool) -> Style {
        if focused {
            Style::default().fg(palette.focus_border)
        } else {
            Style::default().fg(palette.window_border)
        }
    }

    #[must_use]
    pub fn selected(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text)
            .bg(palette.highlight)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn heading(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.heading)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn muted(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_muted)
            .add_modifier(Modifier::ITALIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_colour_matches_the_surface_background() {
        assert_eq!(Palette::standard().desktop, Color::Rgb(0x0b, 0x25, 0x45));
    }

    #[test]
    fn focused_border_stands_out() {
        let palette = Palette::standard();
        assert_ne!(
            styles::window_border(&palette, true),
            styles::window_border(&palette, false)
        );
    }
}
