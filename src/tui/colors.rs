//! Colors for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, Status};
use crate::labels::label_color;
use crate::theme::Theme;

/// Colors that change with the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub card: Color,
    pub accent: Color,
    pub status_bar: Color,
}

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(248, 249, 250),
    fg: Color::Rgb(33, 37, 41),
    muted: Color::Rgb(108, 117, 125),
    card: Color::Rgb(233, 236, 239),
    accent: Color::Rgb(52, 152, 219),
    status_bar: Color::Rgb(52, 73, 94),
};

pub const DARK: Palette = Palette {
    bg: Color::Rgb(26, 26, 46),
    fg: Color::Rgb(224, 224, 224),
    muted: Color::Rgb(140, 140, 160),
    card: Color::Rgb(45, 45, 68),
    accent: Color::Rgb(93, 173, 226),
    status_bar: Color::Rgb(15, 52, 96),
};

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => LIGHT,
        Theme::Dark => DARK,
    }
}

/// Parse `#rrggbb`. Anything else yields `None`.
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub fn label_fg(label: &str) -> Color {
    hex_to_color(label_color(label)).unwrap_or(Color::Gray)
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Rgb(46, 204, 113),
        Priority::Medium => Color::Rgb(243, 156, 18),
        Priority::High => Color::Rgb(230, 126, 34),
        Priority::Urgent => Color::Rgb(231, 76, 60),
    }
}

/// Border color of a status column.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::Backlog => Color::Rgb(149, 165, 166),
        Status::Todo => Color::Rgb(52, 152, 219),
        Status::InProgress => Color::Rgb(243, 156, 18),
        Status::Review => Color::Rgb(155, 89, 182),
        Status::Done => Color::Rgb(46, 204, 113),
    }
}

/// Overdue and due-today highlights.
pub const OVERDUE: Color = Color::Rgb(231, 76, 60);
pub const DUE_TODAY: Color = Color::Rgb(243, 156, 18);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(hex_to_color("#3498db"), Some(Color::Rgb(0x34, 0x98, 0xdb)));
        assert_eq!(hex_to_color("3498db"), None);
        assert_eq!(hex_to_color("#zzzzzz"), None);
    }

    #[test]
    fn unknown_labels_use_fallback() {
        assert_eq!(label_fg("whatever"), Color::Rgb(0x95, 0xa5, 0xa6));
        assert_eq!(label_fg("Bug"), Color::Rgb(0xf3, 0x9c, 0x12));
    }
}
