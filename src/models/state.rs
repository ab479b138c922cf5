//! Job state codes and queue state counts.
//!
//! PBS reports a job's state as a single letter and a queue's per-state job
//! counts as a compact `"Name:count Name:count"` string.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

// ============================================================================
// Job State Codes
// ============================================================================

/// Single-letter job state codes and their display labels.
pub const JOB_STATES: &[(&str, &str)] = &[
    ("R", "running"),
    ("Q", "queued"),
    ("H", "on hold"),
    ("B", "begun"),
    ("E", "exiting"),
    ("F", "finished"),
    ("M", "moved"),
    ("S", "suspended"),
    ("T", "transiting"),
    ("W", "waiting"),
    ("U", "user suspended"),
    ("X", "expired"),
];

/// Translate a job state code to its label; unknown codes pass through.
#[must_use]
pub fn job_state_label(code: &str) -> &str {
    JOB_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Coarse grouping of job states used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStateClass {
    Running,
    Queued,
    Held,
    Finished,
    Other,
}

impl JobStateClass {
    /// Classify either a raw code or an already translated label.
    #[must_use]
    pub fn classify(state: &str) -> Self {
        match state {
            "R" | "running" | "B" | "begun" | "E" | "exiting" => JobStateClass::Running,
            "Q" | "queued" | "W" | "waiting" | "T" | "transiting" => JobStateClass::Queued,
            "H" | "on hold" | "S" | "suspended" | "U" | "user suspended" => JobStateClass::Held,
            "F" | "finished" | "X" | "expired" | "M" | "moved" => JobStateClass::Finished,
            _ => JobStateClass::Other,
        }
    }
}

// ============================================================================
// State Counts
// ============================================================================

/// Per-state job counts keyed by lower-cased state name.
pub type StateCounts = BTreeMap<String, u64>;

/// Decode a whitespace separated list of `name:count` pairs.
///
/// The parse is atomic: the first malformed pair fails the whole input.
///
/// ```
/// use jqmon::models::decode_state_count;
/// let counts = decode_state_count("Q:3 R:5 H:1").unwrap();
/// assert_eq!(counts["r"], 5);
/// ```
pub fn decode_state_count(input: &str) -> Result<StateCounts> {
    let mut counts = StateCounts::new();

    for pair in input.split_whitespace() {
        let mut parts = pair.split(':');
        let (name, count) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(count), None) => (name, count),
            _ => {
                return Err(Error::format(
                    input,
                    format!("'{}' is not a name:count pair", pair),
                ));
            }
        };

        if name.is_empty() {
            return Err(Error::format(input, format!("'{}' has an empty name", pair)));
        }

        // u64::from_str accepts a leading '+', the wire format never does
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::format(
                input,
                format!("count '{}' is not a base-10 integer", count),
            ));
        }
        let count: u64 = count
            .parse()
            .map_err(|e| Error::format(input, format!("count '{}': {}", count, e)))?;

        counts.insert(name.to_lowercase(), count);
    }

    Ok(counts)
}

/// Format counts back into the wire representation.
#[must_use]
pub fn encode_state_count(counts: &StateCounts) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{}:{}", name, count))
        .collect::<Vec<_>>()
        .join(" ")
}
