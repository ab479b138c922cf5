//! Utility functions shared across modules.

use std::cmp::Ordering;

/// A run of ASCII digits compared by numeric value.
///
/// Stored as a string with leading zeros stripped so arbitrarily long runs
/// (e.g. array job indices glued to timestamps) never overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits(String);

impl Digits {
    fn new(run: &str) -> Self {
        let trimmed = run.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One piece of a natural sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortToken {
    Text(String),
    Number(Digits),
}

/// Comparable key produced by [`natural_sort_key`].
///
/// Tokens alternate text / number starting with text, so two keys never
/// compare a number against a string at the same position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<SortToken>);

/// Build a key that orders identifiers the way a human reads them.
///
/// # Example
/// ```
/// use jqmon::utils::natural_sort_key;
/// assert!(natural_sort_key("job2") < natural_sort_key("job10"));
/// ```
#[must_use]
pub fn natural_sort_key(value: &str) -> NaturalKey {
    let bytes = value.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push(SortToken::Text(value[text_start..start].to_string()));
            tokens.push(SortToken::Number(Digits::new(&value[start..i])));
            text_start = i;
        } else {
            i += 1;
        }
    }
    tokens.push(SortToken::Text(value[text_start..].to_string()));

    NaturalKey(tokens)
}

/// Find a key in a collection that matches the target case-insensitively.
pub fn find_key_ci<'a>(
    keys: impl Iterator<Item = &'a String>,
    wanted: &str,
) -> Option<&'a String> {
    keys.into_iter().find(|k| k.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural_cmp(a: &str, b: &str) -> Ordering {
        natural_sort_key(a).cmp(&natural_sort_key(b))
    }

    #[test]
    fn test_numeric_runs_compare_as_integers() {
        assert!(natural_sort_key("job2") < natural_sort_key("job10"));
        assert!(natural_sort_key("job10") < natural_sort_key("job10a"));
        assert!(natural_sort_key("9.server") < natural_sort_key("14.server"));
    }

    #[test]
    fn test_empty_string_is_single_empty_token() {
        assert_eq!(
            natural_sort_key(""),
            NaturalKey(vec![SortToken::Text(String::new())])
        );
    }

    #[test]
    fn test_leading_digits() {
        let key = natural_sort_key("12abc");
        assert_eq!(
            key,
            NaturalKey(vec![
                SortToken::Text(String::new()),
                SortToken::Number(Digits::new("12")),
                SortToken::Text("abc".to_string()),
            ])
        );
    }

    #[test]
    fn test_huge_digit_runs() {
        let a = "x99999999999999999999999";
        let b = "x100000000000000000000000";
        assert_eq!(natural_cmp(a, b), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_are_numeric() {
        assert_eq!(natural_cmp("a007", "a7"), Ordering::Equal);
        assert_eq!(natural_cmp("a007", "a8"), Ordering::Less);
    }

    #[test]
    fn test_sorting_ids() {
        let mut ids = vec!["10", "2", "1"];
        ids.sort_by_key(|id| natural_sort_key(id));
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_find_key_ci() {
        let keys = vec!["Job_State".to_string(), "queue".to_string()];
        assert_eq!(find_key_ci(keys.iter(), "job_state"), Some(&keys[0]));
        assert_eq!(find_key_ci(keys.iter(), "QUEUE"), Some(&keys[1]));
        assert_eq!(find_key_ci(keys.iter(), "owner"), None);
    }
}
