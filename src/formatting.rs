//! Shared formatting utilities used by both CLI and TUI
//!
//! String truncation for long cells and compact durations for data ages.

use std::time::Duration;

/// Column width limits shared by the CLI tables
pub mod layout {
    /// Widest any CLI table cell may grow
    pub const MAX_CELL_WIDTH: usize = 60;
    /// Environment variable values are often long paths
    pub const MAX_ENV_VALUE_WIDTH: usize = 100;
}

/// Truncate a string to a maximum length (in characters), adding "..." at the end if truncated.
///
/// This function is Unicode-safe and counts characters, not bytes.
///
/// # Examples
/// ```
/// use jqmon::formatting::truncate_string;
/// assert_eq!(truncate_string("relax", 10), "relax");
/// assert_eq!(truncate_string("vasp_relax_step2", 8), "vasp_...");
/// assert_eq!(truncate_string("ab", 2), "ab");
/// ```
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        // No room for an ellipsis
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format duration in verbose human-readable style (e.g., "2d 3h", "5h 30m").
///
/// Shows at most 2 time units for readability.
///
/// # Examples
/// ```
/// use jqmon::formatting::format_duration_human;
/// assert_eq!(format_duration_human(0), "0s");
/// assert_eq!(format_duration_human(45), "45s");
/// assert_eq!(format_duration_human(3660), "1h 1m");
/// assert_eq!(format_duration_human(90000), "1d 1h");
/// ```
#[must_use]
pub fn format_duration_human(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }

    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let (major, minor) = if days > 0 {
        ((days, "d"), (hours, "h"))
    } else if hours > 0 {
        ((hours, "h"), (minutes, "m"))
    } else if minutes > 0 {
        ((minutes, "m"), (secs, "s"))
    } else {
        return format!("{}s", secs);
    };

    if minor.0 > 0 {
        format!("{}{} {}{}", major.0, major.1, minor.0, minor.1)
    } else {
        format!("{}{}", major.0, major.1)
    }
}

/// Age of a snapshot for status lines: "12s ago", or "never" before the first fetch
#[must_use]
pub fn format_age(age: Option<Duration>) -> String {
    match age {
        Some(age) => format!("{} ago", format_duration_human(age.as_secs())),
        None => "never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("relax", 10), "relax");
        assert_eq!(truncate_string("relax", 5), "relax");
        assert_eq!(truncate_string("abcd", 3), "abc");
        assert_eq!(truncate_string("md_production_run", 10), "md_prod...");
    }

    #[test]
    fn test_truncate_string_unicode() {
        // 6 characters, 18 bytes
        let name = "\u{8ba1}\u{7b97}\u{4efb}\u{52a1}\u{4e00}\u{4e8c}";
        assert_eq!(truncate_string(name, 6), name);
        assert_eq!(truncate_string(name, 5), "\u{8ba1}\u{7b97}...");
        assert_eq!(truncate_string(name, 2), "\u{8ba1}\u{7b97}");
    }

    #[test]
    fn test_format_duration_human() {
        assert_eq!(format_duration_human(0), "0s");
        assert_eq!(format_duration_human(59), "59s");
        assert_eq!(format_duration_human(65), "1m 5s");
        assert_eq!(format_duration_human(120), "2m");
        assert_eq!(format_duration_human(3600), "1h");
        assert_eq!(format_duration_human(86400), "1d");
        assert_eq!(format_duration_human(93600), "1d 2h");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(None), "never");
        assert_eq!(format_age(Some(Duration::from_secs(7))), "7s ago");
        assert_eq!(format_age(Some(Duration::from_millis(500))), "0s ago");
    }
}
