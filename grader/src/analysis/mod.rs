//! Static safety analysis of learner source, before any execution.
//!
//! Two independent policies gate the two executors:
//!
//! - [`coarse::blocked_import`] is permissive: it only refuses imports of a
//!   denylisted module and tolerates unparsable source (the process sandbox
//!   surfaces those as execution errors).
//! - [`strict::analyze`] is the grading gate: syntax errors are reported
//!   with line/column, and imports, scope mutation, dunder access, and a
//!   fixed list of reflection/IO/eval builtins are rejected with the
//!   offending construct's category.
//!
//! A purely lexical pass ([`lexical::lint`]) runs before either policy and
//! flags tab indentation and trailing whitespace with 1-based positions.

pub mod coarse;
pub mod lexical;
pub mod strict;
mod walk;

use std::fmt;

/// Category of a recognized disallowed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationRule {
    Import,
    ScopeMutation,
    DunderName,
    DunderAttribute,
    BannedCall,
    BlockedImport,
    TabIndentation,
    TrailingWhitespace,
}

impl ViolationRule {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationRule::Import => "import",
            ViolationRule::ScopeMutation => "scope-mutation",
            ViolationRule::DunderName => "dunder-name",
            ViolationRule::DunderAttribute => "dunder-attribute",
            ViolationRule::BannedCall => "banned-call",
            ViolationRule::BlockedImport => "blocked-import",
            ViolationRule::TabIndentation => "tab-indentation",
            ViolationRule::TrailingWhitespace => "trailing-whitespace",
        }
    }
}

impl fmt::Display for ViolationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized disallowed construct. Always terminal for the attempted
/// execution; no partial run happens once one is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyViolation {
    pub rule: ViolationRule,
    /// Learner-facing message naming the construct, not a generic refusal.
    pub message: String,
    /// 1-based line and column of the offending construct, when known.
    pub location: Option<(usize, usize)>,
}

/// Outcome of the strict analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Source failed to parse.
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    /// Source parsed but contains a disallowed construct.
    Violation(SafetyViolation),
}

/// 1-based line/column of a byte offset in `source`.
pub(crate) fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(source.len());
    let prefix = &source[..clamped];
    let line = prefix.bytes().filter(|b| *b == b'\n').count() + 1;
    let column = clamped - prefix.rfind('\n').map_or(0, |pos| pos + 1) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let source = "a = 1\nb = 2\n";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 4), (1, 5));
        assert_eq!(line_col(source, 6), (2, 1));
        assert_eq!(line_col(source, 10), (2, 5));
    }

    #[test]
    fn line_col_clamps_past_the_end() {
        assert_eq!(line_col("ab", 99), (1, 3));
    }
}
