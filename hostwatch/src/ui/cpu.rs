//! CPU usage sparkline.

use std::collections::VecDeque;

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Sparkline},
};

use crate::history::tail;
use crate::types::Snapshot;
use crate::ui::util::percent_color;

pub fn draw_cpu_graph(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    hist: &VecDeque<u64>,
    m: Option<&Snapshot>,
) {
    let (title, color) = match m {
        Some(s) => (
            format!(
                "CPU ({} cores, now: {:>5.1}%)",
                s.cpu.cores, s.cpu.usage_percent
            ),
            percent_color(s.cpu.usage_percent),
        ),
        None => ("CPU".into(), percent_color(0.0)),
    };
    let data = tail(hist, area.width.saturating_sub(2) as usize);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(100)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}
