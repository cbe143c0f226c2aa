use ratatui::style::{Color, Modifier, Style};

// Centralized theme colors for the page chrome and the overlay layer.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);
pub const ACCENT_ALT_RGB: (u8, u8, u8) = (255, 165, 0);

pub fn rgb_to_color(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn accent() -> Color {
    rgb_to_color(ACCENT_RGB)
}

pub fn accent_alt() -> Color {
    rgb_to_color(ACCENT_ALT_RGB)
}

// Page header / sidebar
pub fn header_bg() -> Color {
    Color::DarkGray
}
pub fn header_fg() -> Color {
    Color::White
}
pub fn sidebar_fg() -> Color {
    Color::Gray
}
pub fn input_bg() -> Color {
    Color::Black
}
pub fn focus_border() -> Color {
    accent_alt()
}

// Overlay surfaces
pub fn overlay_bg() -> Color {
    Color::Black
}
pub fn overlay_fg() -> Color {
    Color::White
}
pub fn overlay_border() -> Color {
    Color::DarkGray
}
pub fn muted_fg() -> Color {
    Color::DarkGray
}
pub fn group_header() -> Style {
    Style::default()
        .fg(accent())
        .add_modifier(Modifier::BOLD)
}
pub fn active_row() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
pub fn unread_fg() -> Color {
    accent_alt()
}

// Badge on the notification bell
pub fn badge_bg() -> Color {
    Color::Red
}
pub fn badge_fg() -> Color {
    Color::White
}

// Log tail
pub fn log_highlight() -> Color {
    accent_alt()
}

pub fn overlay_style() -> Style {
    Style::default().fg(overlay_fg()).bg(overlay_bg())
}
