//! Theme definitions for the TUI
//!
//! This module provides colorblind-safe themes for both dark and light terminals.
//! The default is "dark" but users can configure "light" via config file or env var.

use ratatui::style::Color;

use jqmon::models::JobStateClass;

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,

    // Base colors
    pub fg: Color,
    pub border: Color,
    pub border_focused: Color,

    // Job state colors (colorblind-safe)
    pub running: Color,
    pub queued: Color,
    pub held: Color,
    pub finished: Color,

    // UI elements
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub stale_indicator: Color,
    pub placeholder: Color,
    pub warn: Color,
    pub error: Color,

    // Tab numbers, search indicator
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            fg: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            // Colorblind-safe palette for dark backgrounds
            running: Color::Rgb(0, 200, 0),     // Bright green
            queued: Color::Rgb(255, 180, 0),    // Orange (not yellow - better visibility)
            held: Color::Rgb(180, 100, 180),    // Muted purple
            finished: Color::Rgb(80, 160, 255), // Light blue

            selected_bg: Color::Rgb(60, 60, 80),
            selected_fg: Color::White,
            header_bg: Color::Rgb(40, 80, 120),
            header_fg: Color::White,
            stale_indicator: Color::Rgb(255, 100, 100),
            placeholder: Color::DarkGray,
            warn: Color::Rgb(255, 180, 0),
            error: Color::Rgb(255, 80, 80),

            highlight: Color::Cyan,
        }
    }

    /// Create a light theme
    /// Uses darker, more saturated colors for visibility on light backgrounds
    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,

            fg: Color::Black,
            border: Color::Rgb(120, 120, 120),
            border_focused: Color::Rgb(0, 100, 180),

            running: Color::Rgb(0, 140, 0),   // Dark green
            queued: Color::Rgb(200, 120, 0),  // Dark orange
            held: Color::Rgb(140, 60, 140),   // Dark muted purple
            finished: Color::Rgb(0, 80, 180), // Dark blue

            selected_bg: Color::Rgb(200, 220, 255),
            selected_fg: Color::Black,
            header_bg: Color::Rgb(180, 200, 230),
            header_fg: Color::Black,
            stale_indicator: Color::Rgb(200, 0, 0),
            placeholder: Color::Rgb(150, 150, 150),
            warn: Color::Rgb(200, 120, 0),
            error: Color::Rgb(200, 0, 0),

            highlight: Color::Rgb(0, 100, 180),
        }
    }

    /// Create theme from name string
    pub fn from_name(name: &str) -> Self {
        match ThemeName::parse(name) {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Get color for a job state code or label
    pub fn job_state_color(&self, state: &str) -> Color {
        match JobStateClass::classify(state) {
            JobStateClass::Running => self.running,
            JobStateClass::Queued => self.queued,
            JobStateClass::Held => self.held,
            JobStateClass::Finished => self.finished,
            JobStateClass::Other => self.fg,
        }
    }

    /// Color for a boolean queue flag (`enabled`, `started`)
    pub fn flag_color(&self, value: &str) -> Color {
        match value {
            "True" => self.running,
            "False" => self.error,
            _ => self.placeholder,
        }
    }
}
