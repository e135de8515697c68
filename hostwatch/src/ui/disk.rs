//! Disk usage gauge for the filesystem the agent reports.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
};

use crate::types::Snapshot;
use crate::ui::util::{format_bytes, gauge_percent, percent_color};

pub fn draw_disk(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&Snapshot>) {
    let (label, pct) = match m {
        Some(s) => (
            format!(
                "{} / {} ({} free)",
                format_bytes(s.disk.used),
                format_bytes(s.disk.total),
                format_bytes(s.disk.free)
            ),
            s.disk.used_percent,
        ),
        None => ("-".into(), 0.0),
    };
    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Disk"))
        .gauge_style(Style::default().fg(percent_color(pct)))
        .percent(gauge_percent(pct))
        .label(label);
    f.render_widget(g, area);
}
