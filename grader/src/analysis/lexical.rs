//! Whitespace lint, applied before any parse.
//!
//! Runs over raw text so it also fires on code the parser would accept.
//! First offending line wins.

use super::{SafetyViolation, ViolationRule};

/// Flag tab indentation and trailing whitespace.
///
/// Returns the first problem found, scanning top to bottom. A line that is
/// entirely whitespace still counts as trailing whitespace.
pub fn lint(source: &str) -> Option<SafetyViolation> {
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        let indent_end = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        // Indentation is spaces and tabs only, so byte offset equals column.
        if let Some(tab_at) = line[..indent_end].find('\t') {
            return Some(SafetyViolation {
                rule: ViolationRule::TabIndentation,
                message: format!("Use spaces instead of tabs on line {number}."),
                location: Some((number, tab_at + 1)),
            });
        }
        if line != line.trim_end() {
            return Some(SafetyViolation {
                rule: ViolationRule::TrailingWhitespace,
                message: format!("Remove trailing whitespace on line {number}."),
                location: Some((number, line.trim_end().len() + 1)),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_source_passes() {
        assert_eq!(lint("x = 1\nif x:\n    y = 2\n"), None);
    }

    #[test]
    fn tab_indentation_is_flagged_with_line() {
        let violation = lint("if True:\n\tx = 1\n").expect("tab should be flagged");
        assert_eq!(violation.rule, ViolationRule::TabIndentation);
        assert_eq!(violation.message, "Use spaces instead of tabs on line 2.");
        assert_eq!(violation.location, Some((2, 1)));
    }

    #[test]
    fn trailing_whitespace_is_flagged_with_column() {
        let violation = lint("x = 1  \n").expect("trailing blank should be flagged");
        assert_eq!(violation.rule, ViolationRule::TrailingWhitespace);
        assert_eq!(violation.location, Some((1, 6)));
    }

    #[test]
    fn whitespace_only_lines_count_as_trailing_whitespace() {
        let violation = lint("x = 1\n    \ny = 2\n").expect("blank indent should be flagged");
        assert_eq!(violation.rule, ViolationRule::TrailingWhitespace);
        assert_eq!(violation.message, "Remove trailing whitespace on line 2.");
        assert_eq!(violation.location, Some((2, 1)));
    }

    #[test]
    fn tab_column_points_at_the_tab() {
        let violation = lint("if True:\n  \tx = 1\n").expect("tab should be flagged");
        assert_eq!(violation.rule, ViolationRule::TabIndentation);
        assert_eq!(violation.location, Some((2, 3)));
    }

    #[test]
    fn first_offense_wins() {
        let violation = lint("a = 1 \n\tb = 2\n").expect("line 1 should be flagged first");
        assert_eq!(violation.rule, ViolationRule::TrailingWhitespace);
        assert_eq!(violation.location, Some((1, 6)));
    }
}
