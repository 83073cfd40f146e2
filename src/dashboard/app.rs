//! Terminal setup and the redraw loop.
//!
//! The poller runs as its own task and writes into the shared dashboard; this
//! loop only reads it. Redraws happen on their own tick so the screen stays
//! responsive while a slow request is outstanding.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio_util::sync::CancellationToken;

use super::ui::{self, StatusLine};
use crate::poller::Poller;
use crate::source::SnapshotSource;

const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

/// Keyboard state for the terminal UI.
#[derive(Debug, Default)]
pub struct App {
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
            self.should_quit = true;
        }
    }
}

pub fn status_line<S: SnapshotSource>(poller: &Poller<S>) -> StatusLine {
    StatusLine {
        source: poller.source().describe(),
        counts: poller.counts(),
        in_flight: poller.in_flight(),
    }
}

/// Run the poller and draw the dashboard until the user quits or `shutdown` fires.
pub async fn run<S: SnapshotSource>(
    poller: Poller<S>,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll_handle = tokio::spawn(poller.clone().run(shutdown.clone()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &poller, &shutdown).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    shutdown.cancel();
    if let Err(e) = poll_handle.await {
        tracing::error!(error = %e, "Poller task failed");
    }

    result
}

async fn event_loop<S: SnapshotSource>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    poller: &Poller<S>,
    shutdown: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new();
    let dashboard = poller.dashboard();

    while !shutdown.is_cancelled() {
        let status = status_line(poller);
        {
            let dash = dashboard.read().await;
            terminal.draw(|f| ui::draw(f, &dash, &status))?;
        }

        if event::poll(REDRAW_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit {
            tracing::info!("Quit requested");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        for key in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            let mut app = App::new();
            app.handle_key(key);
            assert!(app.should_quit, "{key:?} should quit");
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut app = App::new();
        app.handle_key(KeyCode::Char('r'));
        app.handle_key(KeyCode::Enter);
        assert!(!app.should_quit);
    }
}
