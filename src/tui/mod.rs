//! Terminal User Interface for jqmon
//!
//! This module provides an interactive dashboard over a PBS status service.
//! It features:
//! - Jobs and queues views refreshed by independent background fetchers
//! - Dual-channel event architecture (priority input, backpressure-aware data)
//! - Keyboard-driven navigation with live regex search
//! - Graceful degradation when data is unavailable

pub mod app;
pub mod event;
pub mod runtime;
pub mod theme;
pub mod ui;

use std::io::{self, IsTerminal, stdout};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use jqmon::models::{EntityKind, JqmonConfig};
use jqmon::query::StatusClient;

use crate::tui::app::App;
use crate::tui::runtime::{
    FetcherParams, FetcherThrottle, RefreshTriggers, TuiRuntime, create_channels, run_event_loop,
    spawn_animation_tick, spawn_fetcher, spawn_input_task, spawn_throttle_decay,
};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
    pub supports_alternate_screen: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        let is_tty = stdout().is_terminal();
        let term_type = std::env::var("TERM").unwrap_or_default();

        // Check for known problematic terminals
        let supports_alternate_screen = !matches!(term_type.as_str(), "dumb" | "" | "unknown");

        Self {
            is_tty,
            term_type,
            supports_alternate_screen,
        }
    }

    /// Check if terminal is suitable for TUI mode
    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen
    }

    /// Get error message for unsuitable terminal
    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use non-TUI commands like 'jqmon <server> jobs' instead."
                .to_string()
        } else if !self.supports_alternate_screen {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use CLI mode.",
                if self.term_type.is_empty() {
                    "(unset)"
                } else {
                    &self.term_type
                }
            )
        } else {
            "Unknown terminal capability issue.".to_string()
        }
    }
}

/// Run the TUI application
pub async fn run_tui(
    config: JqmonConfig,
    config_warnings: Vec<String>,
    client: StatusClient,
    server: String,
) -> Result<()> {
    // Check terminal capabilities before attempting TUI mode
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let refresh = RefreshTriggers::default();
    let idle_threshold = config
        .refresh
        .idle_slowdown
        .then(|| Duration::from_secs(config.refresh.idle_threshold));
    let intervals = [
        (EntityKind::Job, config.refresh.jobs_interval),
        (EntityKind::Queue, config.refresh.queues_interval),
    ];

    // Create the application state
    let app = App::new(config, config_warnings, server, refresh.clone());

    // Setup terminal
    let mut terminal = setup_terminal()?;

    // Create dual channels
    let (input_tx, input_rx, data_tx, data_rx) = create_channels();

    // Create runtime and shared state
    let mut runtime = TuiRuntime::new();
    let throttle = Arc::new(FetcherThrottle::new(idle_threshold));
    let animation_visible = Arc::new(AtomicBool::new(true));

    // Spawn background tasks
    runtime.track(spawn_input_task(input_tx, runtime.cancel_token()));

    for (kind, interval) in intervals {
        let params = FetcherParams {
            kind,
            client: client.clone(),
            interval: Duration::from_secs(interval),
            refresh: refresh.for_kind(kind).clone(),
        };
        runtime.track(spawn_fetcher(
            params,
            data_tx.clone(),
            runtime.cancel_token(),
            throttle.clone(),
        ));
    }

    runtime.track(spawn_animation_tick(
        data_tx.clone(),
        runtime.cancel_token(),
        animation_visible,
    ));

    runtime.track(spawn_throttle_decay(runtime.cancel_token(), throttle.clone()));

    // Run the main event loop
    let result = run_event_loop(app, input_rx, data_rx, throttle, |app| {
        let completed = terminal.draw(|frame| ui::render(app, frame))?;
        // Page navigation follows the real table height
        let body = completed.area.height.saturating_sub(ui::CHROME_HEIGHT);
        app.current_mut().list_state.visible_count = (body as usize).max(1);
        if let Some(max_scroll) = ui::max_detail_scroll(app, completed.area)
            && let Some(detail) = app.modal.detail_mut()
        {
            detail.scroll = detail.scroll.min(max_scroll);
        }
        Ok(())
    })
    .await;

    // Shutdown background tasks
    runtime.shutdown().await;

    // Restore terminal
    restore_terminal(&mut terminal)?;

    result
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
