//! Application state types for the TUI
//!
//! This module contains all the state management types:
//! - View states (Jobs, Queues)
//! - Modal states (Help, Search, Detail)
//! - Selection and navigation state (ListState)
//! - Per-view data with the last good row set (ViewState)
//! - Feedback state for errors and notifications

use std::time::{Duration, Instant};

use jqmon::models::{EntityKind, Snapshot};
use jqmon::search::{Search, SearchMode};
use jqmon::tables::{Row, list_view};

use super::types::DataSlice;

// ============================================================================
// Export Types
// ============================================================================

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

// ============================================================================
// Clipboard Feedback
// ============================================================================

/// Clipboard/export result for visual feedback
#[derive(Debug, Clone)]
pub struct ClipboardFeedback {
    pub message: String,
    pub success: bool,
    pub timestamp: Instant,
}

impl ClipboardFeedback {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
            timestamp: Instant::now(),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
            timestamp: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.timestamp.elapsed() < Duration::from_secs(2)
    }
}

// ============================================================================
// List Navigation State
// ============================================================================

/// List state with selection and scroll tracking
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected: usize,
    pub scroll_offset: usize,
    pub visible_count: usize,
}

impl ListState {
    pub fn clamp(&mut self, list_len: usize) {
        if list_len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else {
            self.selected = self.selected.min(list_len - 1);
            if self.selected < self.scroll_offset {
                self.scroll_offset = self.selected;
            } else if self.visible_count > 0
                && self.selected >= self.scroll_offset + self.visible_count
            {
                self.scroll_offset = self.selected.saturating_sub(self.visible_count - 1);
            }
        }
    }

    pub fn move_up(&mut self, list_len: usize) {
        if self.selected > 0 {
            self.selected -= 1;
            self.clamp(list_len);
        }
    }

    pub fn move_down(&mut self, list_len: usize) {
        if list_len > 0 && self.selected < list_len - 1 {
            self.selected += 1;
            self.clamp(list_len);
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn move_to_bottom(&mut self, list_len: usize) {
        if list_len > 0 {
            self.selected = list_len - 1;
            if self.visible_count > 0 {
                self.scroll_offset = list_len.saturating_sub(self.visible_count);
            }
        }
    }

    pub fn page_up(&mut self, list_len: usize) {
        let jump = self.visible_count.max(1) / 2;
        self.selected = self.selected.saturating_sub(jump);
        self.clamp(list_len);
    }

    pub fn page_down(&mut self, list_len: usize) {
        let jump = self.visible_count.max(1) / 2;
        self.selected = self.selected.saturating_add(jump);
        self.clamp(list_len);
    }
}

// ============================================================================
// Per-View State Types
// ============================================================================

/// Everything a list view needs: the snapshot, the search, and the rows
/// derived from both.
///
/// `rows` always holds the last row set that was computed successfully. A
/// snapshot whose rows cannot be extracted (malformed server data) or a
/// search that fails to compile leaves it untouched.
#[derive(Debug)]
pub struct ViewState {
    pub list_state: ListState,
    pub search: Search,
    pub data: DataSlice,
    rows: Vec<Row>,
}

impl ViewState {
    pub fn new(kind: EntityKind, stale_threshold: Duration, mode: SearchMode) -> Self {
        Self {
            list_state: ListState::default(),
            search: Search::new(mode),
            data: DataSlice::new(kind, stale_threshold),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.data.snapshot().kind()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// ID of the highlighted row
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.rows
            .get(self.list_state.selected)
            .and_then(|row| row.first())
            .map(String::as_str)
    }

    /// Recompute rows from the current snapshot and search.
    ///
    /// The selection follows the previously selected ID when it is still
    /// present. On error the previous rows stay in place.
    pub fn rebuild_rows(&mut self) -> jqmon::Result<()> {
        let rows = list_view(self.data.snapshot(), self.search.pattern(), self.search.mode)?;

        let previous = self.selected_id().map(str::to_string);
        self.rows = rows;
        if let Some(id) = previous
            && let Some(index) = self.rows.iter().position(|row| row[0] == id)
        {
            self.list_state.selected = index;
        }
        self.list_state.clamp(self.rows.len());
        Ok(())
    }

    /// Apply a fetch result. Returns `Ok(false)` for an outdated generation.
    pub fn apply_snapshot(&mut self, generation: u64, snapshot: Snapshot) -> jqmon::Result<bool> {
        if !self.data.update(generation, snapshot) {
            return Ok(false);
        }
        self.rebuild_rows()?;
        Ok(true)
    }
}

// ============================================================================
// View Enum
// ============================================================================

/// Current view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Jobs,
    Queues,
}

impl View {
    pub const ALL: [View; 2] = [View::Jobs, View::Queues];

    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            View::Jobs => View::Queues,
            View::Queues => View::Jobs,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            View::Jobs => "Jobs",
            View::Queues => "Queues",
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            View::Jobs => EntityKind::Job,
            View::Queues => EntityKind::Queue,
        }
    }

    /// Parse the `default_view` config value; unknown names fall back to jobs.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "queues" | "queue" => View::Queues,
            _ => View::Jobs,
        }
    }
}

// ============================================================================
// Modal State
// ============================================================================

/// The entity shown in the detail popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub kind: EntityKind,
    pub id: String,
    /// Show the environment variables instead of the sections (jobs only)
    pub show_env: bool,
    pub scroll: usize,
}

/// Modal overlay state - only one modal can be active at a time.
///
/// The search text itself lives in the view's `Search`, so leaving the
/// search modal keeps the filter applied.
#[derive(Debug, Default)]
pub enum ModalState {
    #[default]
    None,
    Help,
    Search,
    Detail(DetailState),
}

impl ModalState {
    /// Check if any modal is currently active
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, ModalState::None)
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self, ModalState::Search)
    }

    #[must_use]
    pub fn detail(&self) -> Option<&DetailState> {
        match self {
            ModalState::Detail(detail) => Some(detail),
            _ => None,
        }
    }

    #[must_use]
    pub fn detail_mut(&mut self) -> Option<&mut DetailState> {
        match self {
            ModalState::Detail(detail) => Some(detail),
            _ => None,
        }
    }
}

// ============================================================================
// Feedback State
// ============================================================================

/// Unified feedback state for errors, warnings, and transient messages
#[derive(Debug)]
pub struct FeedbackState {
    last_error: Option<(String, Instant)>,
    error_display_duration: Duration,
    pub config_warnings: Vec<String>,
    clipboard_feedback: Option<ClipboardFeedback>,
}

impl FeedbackState {
    /// Create a new FeedbackState with config warnings
    pub fn new(config_warnings: Vec<String>) -> Self {
        Self {
            last_error: None,
            error_display_duration: Duration::from_secs(5),
            config_warnings,
            clipboard_feedback: None,
        }
    }

    /// Set an error message to display
    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some((msg, Instant::now()));
    }

    /// Check if error should still be displayed
    #[must_use]
    pub fn should_show_error(&self) -> bool {
        self.last_error
            .as_ref()
            .map(|(_, t)| t.elapsed() < self.error_display_duration)
            .unwrap_or(false)
    }

    /// Get the current error message if it should be shown
    #[must_use]
    pub fn current_error(&self) -> Option<&str> {
        if self.should_show_error() {
            self.last_error.as_ref().map(|(msg, _)| msg.as_str())
        } else {
            None
        }
    }

    /// Set clipboard operation feedback
    pub fn set_clipboard_feedback(&mut self, feedback: ClipboardFeedback) {
        self.clipboard_feedback = Some(feedback);
    }

    /// Get current clipboard feedback if visible
    #[must_use]
    pub fn current_clipboard_feedback(&self) -> Option<&ClipboardFeedback> {
        self.clipboard_feedback.as_ref().filter(|f| f.is_visible())
    }
}

// ============================================================================
// Timing State
// ============================================================================

/// Grouped timing state for activity tracking
#[derive(Debug)]
pub struct TimingState {
    pub last_input: Instant,
    pub last_refresh: Option<Instant>,
}

impl Default for TimingState {
    fn default() -> Self {
        Self {
            last_input: Instant::now(),
            last_refresh: None,
        }
    }
}
