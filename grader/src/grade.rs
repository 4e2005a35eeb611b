//! Grading orchestration: one attempt against one exercise.
//!
//! Order of gates: whitespace lint, then the strict in-process execution
//! (which runs its own safety analysis), then the checks. The first gate
//! that fires decides the result; notes from the checks are appended to the
//! feedback line whether the attempt passed or failed.

use catalog::Exercise;
use tracing::{debug, instrument};

use crate::analysis::lexical;
use crate::checks;
use crate::interp::{self, InterpError};
use crate::outcome::{GradeStatus, GradingResult};

/// Grade `code` against `exercise`.
///
/// Pure function of its inputs: no state survives the call, and grading the
/// same attempt twice yields the same result.
#[instrument(skip_all, fields(exercise = %exercise.id))]
pub fn grade(exercise: &Exercise, code: &str) -> GradingResult {
    if let Some(violation) = lexical::lint(code) {
        debug!(rule = %violation.rule, "attempt failed the whitespace lint");
        let mut result = GradingResult::new(GradeStatus::Fail, violation.message);
        result.location = violation.location;
        result.violation = Some(violation.rule);
        return result;
    }

    let execution = match interp::execute(code, &exercise.setup) {
        Ok(execution) => execution,
        Err(InterpError::Violation(violation)) => {
            let mut result = GradingResult::new(GradeStatus::Blocked, violation.message);
            result.location = violation.location;
            result.violation = Some(violation.rule);
            return result;
        }
        Err(InterpError::Syntax {
            message,
            line,
            column,
        }) => {
            let mut result = GradingResult::new(
                GradeStatus::SyntaxError,
                format!("Syntax error: {message} (line {line}, column {column})."),
            );
            result.location = Some((line, column));
            return result;
        }
        Err(InterpError::Fault {
            kind,
            message,
            traceback,
            stdout,
            stderr,
        }) => {
            let mut result =
                GradingResult::new(GradeStatus::RuntimeError, format!("{kind}: {message}"));
            result.details = vec![traceback];
            result.stdout = stdout;
            result.stderr = stderr;
            return result;
        }
    };

    if exercise.checks.is_empty() {
        let mut result =
            GradingResult::new(GradeStatus::Fail, "This exercise has no checks defined.");
        result.stdout = execution.stdout;
        result.stderr = execution.stderr;
        return result;
    }

    let verdict = checks::evaluate(&exercise.checks, &exercise.accepted_vars, &execution);
    let status = if verdict.passed {
        GradeStatus::Pass
    } else {
        GradeStatus::Fail
    };
    let message = if verdict.notes.is_empty() {
        verdict.message
    } else {
        format!("{} {}", verdict.message, verdict.notes.join(" "))
    };
    debug!(passed = verdict.passed, "attempt graded");
    let mut result = GradingResult::new(status, message);
    result.details = verdict.notes;
    result.stdout = execution.stdout;
    result.stderr = execution.stderr;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Check;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn exercise(checks: Vec<Check>) -> Exercise {
        Exercise {
            id: "ex".to_string(),
            title: "Exercise".to_string(),
            statement: "Do the thing.".to_string(),
            example: String::new(),
            starter_code: String::new(),
            hints: Vec::new(),
            solution: String::new(),
            accepted_vars: Vec::new(),
            setup: BTreeMap::new(),
            checks,
        }
    }

    fn equals(var: &str, expected: serde_json::Value) -> Check {
        Check::Equals {
            var: var.to_string(),
            expected,
            message: String::new(),
        }
    }

    #[test]
    fn correct_attempt_passes() {
        let ex = exercise(vec![equals("numero", json!(42))]);
        let result = grade(&ex, "numero = int('42')\n");
        assert_eq!(result.status, GradeStatus::Pass);
        assert_eq!(result.message, "Correct.");
    }

    #[test]
    fn import_is_blocked_with_the_rule() {
        let ex = exercise(vec![equals("x", json!(1))]);
        let result = grade(&ex, "import os\nx = 1\n");
        assert_eq!(result.status, GradeStatus::Blocked);
        assert_eq!(result.message, "Imports are not allowed in this exercise.");
        assert_eq!(
            result.violation,
            Some(crate::analysis::ViolationRule::Import)
        );
    }

    #[test]
    fn syntax_error_reports_position() {
        let ex = exercise(vec![equals("x", json!(1))]);
        let result = grade(&ex, "x =\n");
        assert_eq!(result.status, GradeStatus::SyntaxError);
        assert!(result.message.starts_with("Syntax error:"));
        assert!(result.location.is_some());
    }

    #[test]
    fn runtime_error_carries_kind_and_traceback() {
        let ex = exercise(vec![equals("x", json!(1))]);
        let result = grade(&ex, "x = 1 / 0\n");
        assert_eq!(result.status, GradeStatus::RuntimeError);
        assert!(result.message.starts_with("ZeroDivisionError:"));
        assert!(!result.details.is_empty());
    }

    #[test]
    fn tab_indentation_fails_before_execution() {
        let ex = exercise(vec![equals("x", json!(1))]);
        let result = grade(&ex, "if True:\n\tx = 1\n");
        assert_eq!(result.status, GradeStatus::Fail);
        assert_eq!(result.message, "Use spaces instead of tabs on line 2.");
        assert_eq!(result.location, Some((2, 1)));
    }

    #[test]
    fn exercise_without_checks_fails_explicitly() {
        let ex = exercise(Vec::new());
        let result = grade(&ex, "x = 1\n");
        assert_eq!(result.status, GradeStatus::Fail);
        assert_eq!(result.message, "This exercise has no checks defined.");
    }

    #[test]
    fn notes_are_appended_to_the_message() {
        let mut ex = exercise(vec![Check::ListClose {
            var: "temps".to_string(),
            expected: vec![1.0, 2.0],
            message: String::new(),
            expected_summary: None,
        }]);
        ex.accepted_vars = vec!["temps".to_string()];
        let result = grade(&ex, "temps = map(float, ['1', '2'])\n");
        assert_eq!(result.status, GradeStatus::Pass);
        assert!(result.message.starts_with("Correct. Note:"));
        assert_eq!(result.details.len(), 2);
    }

    #[test]
    fn grading_is_deterministic() {
        let ex = exercise(vec![equals("x", json!(3))]);
        let first = grade(&ex, "x = 1 + 2\n");
        let second = grade(&ex, "x = 1 + 2\n");
        assert_eq!(first.status, second.status);
        assert_eq!(first.message, second.message);
    }
}
