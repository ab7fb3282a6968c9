use ai_coach_session::{
    Clock, DriverExit, FeedbackSink, Notice, Session, SessionDriver, SessionHandle,
    SessionObserver, Snapshot,
};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    Frame, Terminal,
};
use std::io;
use std::ops::ControlFlow;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;

use super::app::{self, Input};
use super::widgets;
use crate::config::Config;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Rendering and timing knobs taken from the config file
#[derive(Debug, Clone)]
pub struct ScreenOptions {
    pub tick_period: Duration,
    pub accent: Color,
    pub show_key_hints: bool,
}

impl ScreenOptions {
    pub fn from_config(config: &Config) -> Self {
        let accent = Color::from_str(&config.ui.accent_color).unwrap_or_else(|_| {
            tracing::warn!("Unknown accent color '{}', using cyan", config.ui.accent_color);
            Color::Cyan
        });

        Self {
            tick_period: config.session.tick_period(),
            accent,
            show_key_hints: config.ui.show_key_hints,
        }
    }
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// SessionScreen manages the TUI lifecycle around one session
pub struct SessionScreen {
    terminal: Term,
}

impl SessionScreen {
    /// Take over the terminal
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self { terminal })
    }

    /// Run `session` until it ends and the user leaves, or until unmounted
    pub async fn run<C: Clock>(
        &mut self,
        session: Session<C>,
        sink: &dyn FeedbackSink,
        options: &ScreenOptions,
    ) -> Result<DriverExit> {
        let (driver, handle) = SessionDriver::with_tick_period(session, options.tick_period);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        let input = tokio::task::spawn_blocking(move || read_input(handle, snapshot_rx));

        let mut observer = TerminalObserver {
            terminal: &mut self.terminal,
            snapshots: snapshot_tx,
            notice: None,
            options,
            render_error: None,
        };
        let exit = driver.run(sink, &mut observer).await;

        if let Some(e) = observer.render_error.take() {
            // Closing the snapshot channel releases the input thread
            drop(observer);
            let _ = input.await;
            return Err(anyhow::Error::new(e).context("Failed to draw session screen"));
        }

        // After a natural end the last screen stays up until the user leaves
        input.await.context("Input thread panicked")??;

        Ok(exit)
    }

    /// Cleanup terminal on exit
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to restore terminal")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for SessionScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Blocking keyboard loop. Returns once the user unmounts, the driver is gone
/// mid-session, or the screen stopped drawing.
fn read_input(
    handle: SessionHandle,
    snapshots: watch::Receiver<Option<Snapshot>>,
) -> io::Result<()> {
    loop {
        let ended = snapshots
            .borrow()
            .as_ref()
            .is_some_and(|s| s.ended.is_some());
        if (handle.is_closed() && !ended) || snapshots.has_changed().is_err() {
            return Ok(());
        }

        if !event::poll(INPUT_POLL)? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let snapshot = snapshots.borrow().clone();
        let Some(snapshot) = snapshot else {
            continue;
        };

        match app::map_key(&snapshot, key) {
            Some(Input::Dispatch(action)) => {
                handle.dispatch(action);
            }
            Some(Input::Unmount) => {
                handle.unmount();
                return Ok(());
            }
            None => {}
        }
    }
}

struct TerminalObserver<'a> {
    terminal: &'a mut Term,
    snapshots: watch::Sender<Option<Snapshot>>,
    notice: Option<String>,
    options: &'a ScreenOptions,
    render_error: Option<io::Error>,
}

impl SessionObserver for TerminalObserver<'_> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) -> ControlFlow<()> {
        self.snapshots.send_replace(Some(snapshot.clone()));

        let notice = self.notice.as_deref();
        let options = self.options;
        match self.terminal.draw(|f| ui(f, snapshot, notice, options)) {
            Ok(_) => ControlFlow::Continue(()),
            Err(e) => {
                tracing::error!("Failed to draw: {}", e);
                self.render_error = Some(e);
                ControlFlow::Break(())
            }
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        tracing::debug!("Notice: {:?}", notice);
        self.notice = Some(app::describe_notice(notice));
    }
}

/// Render the UI
fn ui(f: &mut Frame, snapshot: &Snapshot, notice: Option<&str>, options: &ScreenOptions) {
    let size = f.area();

    // Header, body and status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    // Exercise details on the left, timer on the right
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    let right_panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(columns[1]);

    widgets::render_header(main_chunks[0], f.buffer_mut(), snapshot, options.accent);
    widgets::render_exercise(columns[0], f.buffer_mut(), snapshot, options.accent);
    widgets::render_timer(right_panels[0], f.buffer_mut(), snapshot, options.accent);

    let hints = options.show_key_hints.then(|| app::key_hints(snapshot));
    widgets::render_status_bar(main_chunks[2], f.buffer_mut(), notice, hints);

    if let Some(prompt) = &snapshot.exit {
        let area = centered_rect(50, 60, size);
        widgets::render_exit_prompt(area, f.buffer_mut(), prompt, options.accent);
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
