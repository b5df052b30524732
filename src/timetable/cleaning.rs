use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Collapse whitespace runs to a single space and trim both ends.
pub fn clean_cell_text(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned()
}

/// Current timetables carry stray one-character cells inside the course grid
/// that are not courses. Drop this rule once the published sheet is fixed.
pub fn is_single_char_artifact(cleaned: &str) -> bool {
    cleaned.chars().count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_trims() {
        assert_eq!(clean_cell_text("  CS  101 \t"), "CS 101");
        assert_eq!(clean_cell_text("EE\n 210\tLab"), "EE 210 Lab");
        assert_eq!(clean_cell_text("plain"), "plain");
        assert_eq!(clean_cell_text(" \t "), "");
    }

    #[test]
    fn test_single_char_artifact() {
        assert!(is_single_char_artifact("a"));
        assert!(is_single_char_artifact("é"));
        assert!(!is_single_char_artifact(""));
        assert!(!is_single_char_artifact("CS"));
    }
}
