use ratatui::style::Color;
use std::str::FromStr;

/// Format a 1-based position within a deck, e.g. `3/10`
pub fn format_position(position: usize, total: usize) -> String {
    format!("{}/{}", position, total)
}

/// Format elapsed seconds as `m:ss`
pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Parse a configured color name or `#rrggbb` value.
///
/// Falls back to blue for anything ratatui doesn't understand.
pub fn parse_color(color: &str) -> Color {
    Color::from_str(color.trim()).unwrap_or(Color::Blue)
}
