//! Memory gauge and usage history.

use std::collections::VecDeque;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge, Sparkline},
};

use crate::history::tail;
use crate::types::Snapshot;
use crate::ui::util::{format_bytes, gauge_percent, percent_color};

pub fn draw_mem_gauge(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&Snapshot>) {
    let (label, pct) = match m {
        Some(s) => (
            format!(
                "{} / {} ({} available)",
                format_bytes(s.memory.used),
                format_bytes(s.memory.total),
                format_bytes(s.memory.available)
            ),
            s.memory.used_percent,
        ),
        None => ("-".into(), 0.0),
    };
    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Memory"))
        .gauge_style(Style::default().fg(percent_color(pct)))
        .percent(gauge_percent(pct))
        .label(label);
    f.render_widget(g, area);
}

pub fn draw_mem_graph(f: &mut ratatui::Frame<'_>, area: Rect, hist: &VecDeque<u64>) {
    let data = tail(hist, area.width.saturating_sub(2) as usize);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title("Memory history"))
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Magenta));
    f.render_widget(spark, area);
}
