//! Top header with hostname, platform and connection state.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::ConnState;
use crate::types::Snapshot;

pub fn header_text(m: Option<&Snapshot>) -> String {
    let host = match m {
        Some(s) if !s.system.hostname.is_empty() => format!(
            "host: {} | {} {} {}",
            s.system.hostname, s.system.os, s.system.platform, s.system.platform_version
        ),
        Some(_) => "host: unknown".into(),
        None => "waiting for data".into(),
    };
    format!("hostwatch | {}  (press 'q' to quit)", host.trim_end())
}

fn conn_span(conn: &ConnState) -> Span<'static> {
    match conn {
        ConnState::Connecting => {
            Span::styled(" connecting... ", Style::default().fg(Color::Yellow))
        }
        ConnState::Connected => Span::styled(" connected ", Style::default().fg(Color::Green)),
        ConnState::Disconnected(reason) => Span::styled(
            format!(" disconnected ({reason}), retrying "),
            Style::default().fg(Color::Red),
        ),
    }
}

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    m: Option<&Snapshot>,
    conn: &ConnState,
) {
    let line = Line::from(vec![Span::raw(header_text(m)), conn_span(conn)]);
    f.render_widget(Paragraph::new(line), area);
}
