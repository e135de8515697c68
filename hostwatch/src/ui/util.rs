//! Small UI helpers: human-readable sizes and percent colors.

use ratatui::style::Color;

/// Binary-prefixed size with two decimals above one KB, e.g. "1.50 KB".
pub fn format_bytes(b: u64) -> String {
    const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];
    const K: u64 = 1024;
    if b < K {
        return format!("{b} B");
    }
    let mut div = K;
    let mut exp = 0;
    let mut n = b / K;
    while n >= K && exp < UNITS.len() - 1 {
        div *= K;
        exp += 1;
        n /= K;
    }
    format!("{:.2} {}", b as f64 / div as f64, UNITS[exp])
}

/// Green below 60%, yellow below 85%, red above.
pub fn percent_color(pct: f64) -> Color {
    match pct {
        x if x < 60.0 => Color::Green,
        x if x < 85.0 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn gauge_percent(pct: f64) -> u16 {
    if pct.is_finite() {
        pct.clamp(0.0, 100.0).round() as u16
    } else {
        0
    }
}
