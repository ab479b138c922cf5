//! Application state and event handling for the TUI
//!
//! This module is organized into submodules:
//! - `types`: Snapshot container with generation tracking (DataSlice)
//! - `state`: View, modal, navigation, and feedback state types
//! - `export`: Export of the current rows to JSON/CSV

mod export;
mod state;
mod types;

// Re-export public types
pub use state::{
    ClipboardFeedback, DetailState, ExportFormat, FeedbackState, ListState, ModalState,
    TimingState, View, ViewState,
};

use std::time::{Duration, Instant};

use jqmon::models::{Entity, EntityKind, JqmonConfig, Snapshot};
use jqmon::search::{Search, SearchMode};
use jqmon::tables::list_schema;

use crate::tui::event::{DataEvent, EventResult, InputEvent, InputMode, KeyAction};
use crate::tui::runtime::RefreshTriggers;

use export::{export_filename, export_rows};

/// Main application state
///
/// Related fields are grouped:
/// - `modal`: the one active overlay, if any
/// - `jobs`/`queues`: per-view snapshot, search and rows
/// - `feedback`: transient errors, config warnings and action results
/// - `timing`: activity tracking
pub struct App {
    // Lifecycle
    pub running: bool,

    // View State
    pub current_view: View,
    pub modal: ModalState,

    // Per-View States
    pub jobs: ViewState,
    pub queues: ViewState,

    pub feedback: FeedbackState,
    pub timing: TimingState,

    // Configuration
    pub config: JqmonConfig,
    /// Host the dashboard is connected to (shown in the header)
    pub server: String,

    // Communication
    refresh: RefreshTriggers,
}

impl App {
    /// Create a new App.
    ///
    /// Staleness thresholds are three refresh intervals of the matching
    /// fetcher.
    pub fn new(
        config: JqmonConfig,
        config_warnings: Vec<String>,
        server: String,
        refresh: RefreshTriggers,
    ) -> Self {
        let mode = if config.display.deep_search {
            SearchMode::Deep
        } else {
            SearchMode::Shallow
        };
        let jobs_stale = Duration::from_secs(config.refresh.jobs_interval * 3);
        let queues_stale = Duration::from_secs(config.refresh.queues_interval * 3);

        Self {
            running: true,
            current_view: View::from_name(&config.display.default_view),
            modal: ModalState::None,

            jobs: ViewState::new(EntityKind::Job, jobs_stale, mode),
            queues: ViewState::new(EntityKind::Queue, queues_stale, mode),

            feedback: FeedbackState::new(config_warnings),
            timing: TimingState::default(),

            config,
            server,
            refresh,
        }
    }

    /// Handle an input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventResult {
        self.timing.last_input = Instant::now();

        match event {
            InputEvent::Key(key_event) => {
                let action = KeyAction::from_key_event(key_event, self.input_mode());
                self.handle_action(action)
            }
            InputEvent::Resize(_, _) => EventResult::Continue,
            InputEvent::Mouse(mouse_event) => {
                let action = KeyAction::from_mouse_event(mouse_event);
                self.handle_action(action)
            }
        }
    }

    fn input_mode(&self) -> InputMode {
        match self.modal {
            ModalState::Search => InputMode::Search,
            ModalState::Detail(_) => InputMode::Detail,
            ModalState::None | ModalState::Help => InputMode::Normal,
        }
    }

    /// Handle a key action
    fn handle_action(&mut self, action: KeyAction) -> EventResult {
        // Help overlay takes priority
        if matches!(self.modal, ModalState::Help) {
            match action {
                KeyAction::Escape | KeyAction::ShowHelp | KeyAction::Quit => {
                    self.modal = ModalState::None;
                    return EventResult::Continue;
                }
                _ => return EventResult::Unchanged,
            }
        }

        // Modal modes take priority over normal navigation
        match &self.modal {
            ModalState::Search => return self.handle_search_action(action),
            ModalState::Detail(_) => return self.handle_detail_action(action),
            _ => {}
        }

        // Handle navigation actions first (common pattern: call method, return Continue)
        if let Some(result) = self.handle_navigation(&action) {
            return result;
        }

        // Handle view switching actions
        if let Some(result) = self.handle_view_switch(&action) {
            return result;
        }

        match action {
            KeyAction::Quit => self.quit(),

            KeyAction::Select => {
                if let Some(id) = self.current().selected_id() {
                    self.modal = ModalState::Detail(DetailState {
                        kind: self.current_view.kind(),
                        id: id.to_string(),
                        show_env: false,
                        scroll: 0,
                    });
                }
                EventResult::Continue
            }
            KeyAction::Refresh => {
                let kind = self.current_view.kind();
                tracing::debug!(%kind, "manual refresh requested");
                self.refresh.trigger(kind);
                self.timing.last_refresh = Some(Instant::now());
                EventResult::Continue
            }
            KeyAction::QuickSearch => {
                self.modal = ModalState::Search;
                EventResult::Continue
            }
            KeyAction::YankId => {
                if let Some(id) = self.current().selected_id().map(str::to_string) {
                    self.yank(&id);
                }
                EventResult::Continue
            }
            KeyAction::ShowHelp => {
                self.modal = ModalState::Help;
                EventResult::Continue
            }
            KeyAction::ExportData => {
                self.export_current_view(ExportFormat::Json);
                EventResult::Continue
            }
            KeyAction::ExportDataCsv => {
                self.export_current_view(ExportFormat::Csv);
                EventResult::Continue
            }
            KeyAction::Escape => {
                // Clear active search when pressing escape
                if !self.current().search.input().is_empty() {
                    self.update_search(|search| {
                        search.clear();
                        Ok(())
                    });
                }
                EventResult::Continue
            }

            // Mouse click (scroll handled by handle_navigation)
            KeyAction::MouseClick { row, column: _ } => {
                self.handle_mouse_click(row);
                EventResult::Continue
            }

            _ => EventResult::Unchanged,
        }
    }

    fn quit(&mut self) -> EventResult {
        self.running = false;
        EventResult::Quit
    }

    /// Handle navigation actions (returns Some if action was handled)
    fn handle_navigation(&mut self, action: &KeyAction) -> Option<EventResult> {
        match action {
            KeyAction::MoveUp | KeyAction::MouseScrollUp => {
                self.with_current_list(|state, len| state.move_up(len));
            }
            KeyAction::MoveDown | KeyAction::MouseScrollDown => {
                self.with_current_list(|state, len| state.move_down(len));
            }
            KeyAction::MoveToTop => {
                self.with_current_list(|state, _len| state.move_to_top());
            }
            KeyAction::MoveToBottom => {
                self.with_current_list(|state, len| state.move_to_bottom(len));
            }
            KeyAction::PageUp => {
                self.with_current_list(|state, len| state.page_up(len));
            }
            KeyAction::PageDown => {
                self.with_current_list(|state, len| state.page_down(len));
            }
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    /// Handle view switching actions (returns Some if action was handled)
    fn handle_view_switch(&mut self, action: &KeyAction) -> Option<EventResult> {
        let view = match action {
            KeyAction::SwitchToJobs => View::Jobs,
            KeyAction::SwitchToQueues => View::Queues,
            KeyAction::NextView => self.current_view.next(),
            _ => return None,
        };
        self.current_view = view;
        Some(EventResult::Continue)
    }

    /// Handle mouse click to select row in list views
    fn handle_mouse_click(&mut self, row: u16) {
        // Skip if in a modal mode
        if self.modal.is_active() {
            return;
        }

        // Layout: row 0 = tabs, row 1 = info bar, row 2 = table border,
        // row 3 = column headers
        const CONTENT_START: u16 = 4;

        if row < CONTENT_START {
            return;
        }

        let clicked_index = (row - CONTENT_START) as usize;
        self.with_current_list(|state, len| {
            let target = state.scroll_offset + clicked_index;
            if target < len {
                state.selected = target;
            }
        });
    }

    /// Handle actions while typing a search
    ///
    /// The search is live: every keystroke recompiles the pattern and
    /// refilters the rows.
    fn handle_search_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Quit => self.quit(),
            KeyAction::Escape => {
                // Abandon the search entirely
                self.update_search(|search| {
                    search.clear();
                    Ok(())
                });
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::Select => {
                // Keep the search applied
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::FilterClear => {
                self.update_search(|search| {
                    search.clear();
                    Ok(())
                });
                EventResult::Continue
            }
            KeyAction::FilterBackspace => {
                self.update_search(Search::pop);
                EventResult::Continue
            }
            KeyAction::FilterChar(c) => {
                self.update_search(|search| search.push(c));
                EventResult::Continue
            }
            KeyAction::ToggleSearchMode => {
                self.update_search(|search| {
                    search.mode = search.mode.toggle();
                    Ok(())
                });
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Apply `edit` to the current view's search and refilter.
    ///
    /// An invalid pattern is reported in the status bar; the rows keep
    /// showing the last pattern that compiled.
    fn update_search(&mut self, edit: impl FnOnce(&mut Search) -> jqmon::Result<()>) {
        let view = self.current_mut();
        let result = edit(&mut view.search).and_then(|()| view.rebuild_rows());
        if let Err(e) = result {
            self.feedback.set_error(e.to_string());
        }
    }

    /// Handle actions in detail view mode
    fn handle_detail_action(&mut self, action: KeyAction) -> EventResult {
        let Some(detail) = self.modal.detail_mut() else {
            return EventResult::Unchanged;
        };

        match action {
            KeyAction::Quit => self.quit(),
            KeyAction::Escape => {
                // Environment view goes back to the sections first
                if detail.show_env {
                    detail.show_env = false;
                    detail.scroll = 0;
                } else {
                    self.modal = ModalState::None;
                }
                EventResult::Continue
            }
            KeyAction::ShowEnvironment => {
                if detail.kind == EntityKind::Job {
                    detail.show_env = !detail.show_env;
                    detail.scroll = 0;
                }
                EventResult::Continue
            }
            KeyAction::MoveDown | KeyAction::MouseScrollDown => {
                detail.scroll = detail.scroll.saturating_add(1);
                EventResult::Continue
            }
            KeyAction::MoveUp | KeyAction::MouseScrollUp => {
                detail.scroll = detail.scroll.saturating_sub(1);
                EventResult::Continue
            }
            KeyAction::PageDown => {
                detail.scroll = detail.scroll.saturating_add(10);
                EventResult::Continue
            }
            KeyAction::PageUp => {
                detail.scroll = detail.scroll.saturating_sub(10);
                EventResult::Continue
            }
            KeyAction::MoveToTop => {
                detail.scroll = 0;
                EventResult::Continue
            }
            KeyAction::MoveToBottom => {
                // The renderer clamps to the content height
                detail.scroll = usize::MAX / 2;
                EventResult::Continue
            }
            KeyAction::YankId => {
                let id = detail.id.clone();
                self.yank(&id);
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Copy text to the system clipboard
    fn yank(&mut self, text: &str) {
        if !self.config.behavior.copy_to_clipboard {
            self.feedback.set_clipboard_feedback(ClipboardFeedback::failure(
                "Clipboard disabled in config".to_string(),
            ));
            return;
        }

        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        self.feedback.set_clipboard_feedback(match result {
            Ok(()) => ClipboardFeedback::success(format!("Copied: {}", text)),
            Err(e) => {
                tracing::debug!("clipboard unavailable: {}", e);
                ClipboardFeedback::failure("Failed to copy (no clipboard)".to_string())
            }
        });
    }

    /// Handle a data event
    pub fn handle_data(&mut self, event: DataEvent) -> EventResult {
        match event {
            DataEvent::SnapshotUpdated {
                source,
                generation,
                snapshot,
            } => match self.view_mut(source).apply_snapshot(generation, snapshot) {
                Ok(true) => {
                    self.timing.last_refresh = Some(Instant::now());
                    EventResult::Continue
                }
                Ok(false) => EventResult::Unchanged,
                Err(e) => {
                    tracing::warn!(%source, error = %e, "could not render snapshot");
                    self.feedback.set_error(format!("{}: {}", source, e));
                    EventResult::Continue
                }
            },
            DataEvent::FetchError {
                source,
                generation,
                error,
            } => {
                self.feedback.set_error(format!("{}: {}", source, error));
                // A failed fetch shows as "no data" rather than old data
                let view = self.view_mut(source);
                if view.data.accepts(generation)
                    && let Err(e) = view.apply_snapshot(generation, Snapshot::empty(source))
                {
                    tracing::debug!("clearing {} failed: {}", source, e);
                }
                EventResult::Continue
            }
            DataEvent::AnimationTick => {
                // Only redraw while the loading spinner is visible
                if self.current().data.is_loaded() {
                    EventResult::Unchanged
                } else {
                    EventResult::Continue
                }
            }
        }
    }

    /// Helper to apply a navigation operation to the currently active list.
    /// The closure receives a mutable reference to the active ListState and the list length.
    fn with_current_list<F>(&mut self, f: F)
    where
        F: FnOnce(&mut ListState, usize),
    {
        let view = self.current_mut();
        let len = view.rows().len();
        f(&mut view.list_state, len);
    }

    #[must_use]
    pub fn view(&self, kind: EntityKind) -> &ViewState {
        match kind {
            EntityKind::Job => &self.jobs,
            EntityKind::Queue => &self.queues,
        }
    }

    fn view_mut(&mut self, kind: EntityKind) -> &mut ViewState {
        match kind {
            EntityKind::Job => &mut self.jobs,
            EntityKind::Queue => &mut self.queues,
        }
    }

    /// State of the visible view
    #[must_use]
    pub fn current(&self) -> &ViewState {
        self.view(self.current_view.kind())
    }

    pub fn current_mut(&mut self) -> &mut ViewState {
        self.view_mut(self.current_view.kind())
    }

    /// The entity shown in the detail popup, if it is still in the snapshot
    #[must_use]
    pub fn detail_entity(&self) -> Option<(&DetailState, Option<&Entity>)> {
        let detail = self.modal.detail()?;
        let entity = self.view(detail.kind).data.snapshot().get(&detail.id);
        Some((detail, entity))
    }

    /// Get the current error message if it should be shown
    #[must_use]
    pub fn current_error(&self) -> Option<&str> {
        self.feedback.current_error()
    }

    /// Export the rows of the current view to a file in the working directory
    pub fn export_current_view(&mut self, format: ExportFormat) {
        let view = self.current();
        let kind = view.kind();
        let headers = list_schema(kind).headers();
        let content = export_rows(&headers, view.rows(), format);
        let count = view.rows().len();
        let filename = export_filename(kind, format);

        match std::fs::write(&filename, content) {
            Ok(()) => {
                tracing::info!(%filename, count, "exported rows");
                self.feedback.set_clipboard_feedback(ClipboardFeedback::success(format!(
                    "Exported {} {}s to {}",
                    count, kind, filename
                )));
            }
            Err(e) => {
                self.feedback.set_clipboard_feedback(ClipboardFeedback::failure(format!(
                    "Failed to write {}: {}",
                    filename, e
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use jqmon::models::{Normalizer, Record};
    use std::collections::BTreeMap;

    fn app() -> App {
        App::new(
            JqmonConfig::default(),
            Vec::new(),
            "pbs-head".to_string(),
            RefreshTriggers::default(),
        )
    }

    fn snapshot(kind: EntityKind, json: &str) -> Snapshot {
        let raw: BTreeMap<String, Record> = serde_json::from_str(json).unwrap();
        Snapshot::from_raw(kind, raw, &Normalizer::default())
    }

    fn jobs() -> Snapshot {
        snapshot(
            EntityKind::Job,
            r#"{
                "1.srv": {"attributes": {"job_state": "R", "queue": "workq",
                          "variable_list": "HOME=/home/a,PBS_O_QUEUE=workq"}},
                "2.srv": {"attributes": {"job_state": "Q", "queue": "gpu"}},
                "10.srv": {"attributes": {"job_state": "H", "queue": "workq"}}
            }"#,
        )
    }

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        app.handle_input(InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(app: &mut App, c: char) -> EventResult {
        app.handle_input(InputEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn update(app: &mut App, generation: u64, snapshot: Snapshot) -> EventResult {
        app.handle_data(DataEvent::SnapshotUpdated {
            source: snapshot.kind(),
            generation,
            snapshot,
        })
    }

    fn job_ids(app: &App) -> Vec<&str> {
        app.jobs.rows().iter().map(|r| r[0].as_str()).collect()
    }

    #[test]
    fn test_snapshot_update_sorts_rows() {
        let mut app = app();
        assert_eq!(update(&mut app, 1, jobs()), EventResult::Continue);
        assert_eq!(job_ids(&app), ["1.srv", "2.srv", "10.srv"]);
        assert!(app.timing.last_refresh.is_some());
    }

    #[test]
    fn test_outdated_generation_is_dropped() {
        let mut app = app();
        update(&mut app, 2, jobs());
        let result = update(&mut app, 1, Snapshot::empty(EntityKind::Job));
        assert_eq!(result, EventResult::Unchanged);
        assert_eq!(app.jobs.rows().len(), 3);
    }

    #[test]
    fn test_fetch_error_clears_view_and_reports() {
        let mut app = app();
        update(&mut app, 1, jobs());
        app.handle_data(DataEvent::FetchError {
            source: EntityKind::Job,
            generation: 2,
            error: "connection refused".to_string(),
        });
        assert!(app.jobs.rows().is_empty());
        assert_eq!(app.current_error(), Some("job: connection refused"));
    }

    #[test]
    fn test_outdated_fetch_error_keeps_rows() {
        let mut app = app();
        update(&mut app, 3, jobs());
        app.handle_data(DataEvent::FetchError {
            source: EntityKind::Job,
            generation: 2,
            error: "timeout".to_string(),
        });
        assert_eq!(app.jobs.rows().len(), 3);
    }

    #[test]
    fn test_malformed_queue_data_keeps_rows_and_reports() {
        let mut app = app();
        update(
            &mut app,
            1,
            snapshot(EntityKind::Queue, r#"{"workq": {"attributes": {"state_count": "Queued:2"}}}"#),
        );
        update(
            &mut app,
            2,
            snapshot(EntityKind::Queue, r#"{"workq": {"attributes": {"state_count": "Queued"}}}"#),
        );
        assert_eq!(app.queues.rows().len(), 1);
        assert!(app.current_error().unwrap().starts_with("queue: malformed state count"));
    }

    #[test]
    fn test_live_search_and_escape() {
        let mut app = app();
        update(&mut app, 1, jobs());

        press(&mut app, KeyCode::Char('/'));
        assert!(app.modal.is_searching());
        type_text(&mut app, "gpu");
        assert_eq!(job_ids(&app), ["2.srv"]);

        // Enter keeps the search applied
        press(&mut app, KeyCode::Enter);
        assert!(!app.modal.is_active());
        assert_eq!(job_ids(&app), ["2.srv"]);

        // Esc in normal mode clears it
        press(&mut app, KeyCode::Esc);
        assert_eq!(job_ids(&app).len(), 3);
    }

    #[test]
    fn test_invalid_pattern_keeps_rows() {
        let mut app = app();
        update(&mut app, 1, jobs());

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "work");
        assert_eq!(job_ids(&app), ["1.srv", "10.srv"]);

        type_text(&mut app, "(");
        assert_eq!(job_ids(&app), ["1.srv", "10.srv"]);
        assert!(app.current_error().unwrap().contains("invalid search pattern"));
        assert_eq!(app.jobs.search.input(), "work(");
    }

    #[test]
    fn test_toggle_deep_search() {
        let mut app = app();
        update(&mut app, 1, jobs());

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "HOME");
        assert!(app.jobs.rows().is_empty());

        ctrl(&mut app, 'd');
        assert_eq!(app.jobs.search.mode, SearchMode::Deep);
        assert_eq!(job_ids(&app), ["1.srv"]);
    }

    #[test]
    fn test_detail_and_environment() {
        let mut app = app();
        update(&mut app, 1, jobs());

        press(&mut app, KeyCode::Enter);
        let (detail, entity) = app.detail_entity().unwrap();
        assert_eq!(detail.id, "1.srv");
        assert!(entity.is_some());

        press(&mut app, KeyCode::Char('e'));
        assert!(app.modal.detail().unwrap().show_env);

        // first Esc leaves the environment, second closes the popup
        press(&mut app, KeyCode::Esc);
        assert!(!app.modal.detail().unwrap().show_env);
        press(&mut app, KeyCode::Esc);
        assert!(!app.modal.is_active());
    }

    #[test]
    fn test_queue_detail_has_no_environment() {
        let mut app = app();
        update(&mut app, 1, snapshot(EntityKind::Queue, r#"{"workq": {}}"#));
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('e'));
        assert!(!app.modal.detail().unwrap().show_env);
    }

    #[test]
    fn test_view_switching_and_navigation() {
        let mut app = app();
        update(&mut app, 1, jobs());

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.jobs.selected_id(), Some("10.srv"));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.jobs.selected_id(), Some("10.srv"));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Queues);
        // empty queue list: selecting does nothing
        press(&mut app, KeyCode::Enter);
        assert!(!app.modal.is_active());
    }

    #[test]
    fn test_refresh_triggers_current_fetcher() {
        let triggers = RefreshTriggers::default();
        let mut app = App::new(
            JqmonConfig::default(),
            Vec::new(),
            "pbs-head".to_string(),
            triggers.clone(),
        );
        press(&mut app, KeyCode::Char('r'));

        // the stored permit makes this resolve immediately
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let notified = runtime.block_on(async {
            tokio::time::timeout(Duration::from_millis(100), triggers.jobs.notified())
                .await
                .is_ok()
        });
        assert!(notified);
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.modal, ModalState::Help));
        // q closes help instead of quitting
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::Quit);
        assert!(!app.running);
    }

    #[test]
    fn test_default_view_from_config() {
        let mut config = JqmonConfig::default();
        config.display.default_view = "queues".to_string();
        let app = App::new(config, Vec::new(), "h".to_string(), RefreshTriggers::default());
        assert_eq!(app.current_view, View::Queues);
    }
}
