//! App state and main loop: input handling, applying feed events, drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::history::{PercentHistory, HISTORY_CAP};
use crate::types::Snapshot;
use crate::ui::{
    cpu::draw_cpu_graph,
    disk::draw_disk,
    header::draw_header,
    mem::{draw_mem_gauge, draw_mem_graph},
    system::{draw_system_info, draw_uptime},
};
use crate::ws::{spawn_feed, FeedEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnState {
    Connecting,
    Connected,
    Disconnected(String),
}

pub struct App {
    last: Option<Snapshot>,
    hist: PercentHistory,
    conn: ConnState,
    should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            last: None,
            hist: PercentHistory::new(HISTORY_CAP),
            conn: ConnState::Connecting,
            should_quit: false,
        }
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    pub fn conn(&self) -> &ConnState {
        &self.conn
    }

    pub fn history(&self) -> &PercentHistory {
        &self.hist
    }

    /// Fold one feed event into the view state. The last snapshot stays on
    /// screen while disconnected.
    pub fn apply(&mut self, ev: FeedEvent) {
        match ev {
            FeedEvent::Connected => self.conn = ConnState::Connected,
            FeedEvent::Disconnected(reason) => self.conn = ConnState::Disconnected(reason),
            FeedEvent::Snapshot(s) => {
                self.hist.push(s.cpu.usage_percent, s.memory.used_percent);
                self.last = Some(*s);
            }
        }
    }

    pub async fn run(&mut self, url: &str) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel(64);
        let feed = spawn_feed(url.to_string(), tx);

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, &mut rx).await;

        // Teardown
        feed.abort();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        rx: &mut mpsc::Receiver<FeedEvent>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press
                        && matches!(k.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
                    {
                        self.should_quit = true;
                    }
                }
            }
            if self.should_quit {
                break;
            }

            while let Ok(ev) = rx.try_recv() {
                self.apply(ev);
            }

            terminal.draw(|f| self.draw(f))?;
            sleep(Duration::from_millis(100)).await;
        }
        Ok(())
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),   // header
                Constraint::Ratio(1, 3), // cpu history
                Constraint::Length(3),   // memory gauge
                Constraint::Min(5),      // memory history
                Constraint::Length(3),   // disk
                Constraint::Length(7),   // uptime + system info
            ])
            .split(f.area());

        draw_header(f, rows[0], self.last.as_ref(), &self.conn);
        draw_cpu_graph(f, rows[1], &self.hist.cpu, self.last.as_ref());
        draw_mem_gauge(f, rows[2], self.last.as_ref());
        draw_mem_graph(f, rows[3], &self.hist.mem);
        draw_disk(f, rows[4], self.last.as_ref());

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
            .split(rows[5]);
        draw_uptime(f, bottom[0], self.last.as_ref());
        draw_system_info(f, bottom[1], self.last.as_ref());
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
