//! Uptime and host information panels.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use time::macros::format_description;

use crate::types::Snapshot;

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

pub fn draw_uptime(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&Snapshot>) {
    let text = m.map(|s| or_dash(&s.uptime_human).to_string()).unwrap_or_else(|| "-".into());
    let line = Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Uptime"));
    f.render_widget(p, area);
}

pub fn system_lines(s: &Snapshot) -> Vec<Line<'static>> {
    let sampled = s
        .timestamp
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "-".into());
    let row = |k: &str, v: &str| {
        Line::from(vec![
            Span::styled(format!("{k:<10}"), Style::default().fg(Color::DarkGray)),
            Span::raw(or_dash(v).to_string()),
        ])
    };
    vec![
        row("Hostname", &s.system.hostname),
        row("OS", &s.system.os),
        row(
            "Platform",
            format!("{} {}", s.system.platform, s.system.platform_version).trim(),
        ),
        row("Sampled", &sampled),
    ]
}

pub fn draw_system_info(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&Snapshot>) {
    let lines = m.map(system_lines).unwrap_or_default();
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("System"));
    f.render_widget(p, area);
}
