// Color palette for the TUI
use ratatui::style::Color;

/// Warnings, errors, "previous"
pub const ACCENT_PRIMARY: Color = Color::Rgb(214, 96, 77);
/// Favorites and "next"
pub const ACCENT_SECONDARY: Color = Color::Rgb(233, 118, 150);
/// Titles, focus, gauge fill
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(222, 184, 110);

pub const TEXT_PRIMARY: Color = Color::Rgb(236, 232, 224);
pub const TEXT_SECONDARY: Color = Color::Rgb(150, 146, 138);
pub const TEXT_DISABLED: Color = Color::Rgb(96, 94, 90);

pub const BG_DARK: Color = Color::Rgb(28, 27, 25);
pub const BORDER_COLOR: Color = Color::Rgb(88, 84, 78);
