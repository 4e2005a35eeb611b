//! Check evaluation over a finished execution.
//!
//! The evaluator is a pure function of the check list and the execution's
//! bindings and captured stdout. Checks run in catalog order and stop at
//! the first failure; notes collected along the way (alias hints, lazy
//! conversion warnings) ride along on the verdict either way.

use catalog::Check;
use tracing::debug;

use crate::interp::Execution;
use crate::value::{Value, render_json_literal};

/// Absolute per-element tolerance for numeric list comparison.
pub const TOLERANCE: f64 = 1e-6;

/// Outcome of evaluating all checks for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub passed: bool,
    /// Primary feedback line: "Correct." or the first failure's message.
    pub message: String,
    /// Advisory notes, never fatal on their own.
    pub notes: Vec<String>,
}

/// Evaluate `checks` against the execution, fail-fast.
pub fn evaluate(checks: &[Check], accepted_vars: &[String], execution: &Execution) -> Verdict {
    // Whether the expected output already showed up; turns a missing-variable
    // failure into feedback about naming rather than about the computation.
    let output_has_expected = checks.iter().any(|check| {
        matches!(check, Check::OutputContains { expected, .. }
            if !expected.is_empty() && execution.stdout.contains(expected.as_str()))
    });
    let context = Context {
        accepted_vars,
        execution,
        output_has_expected,
    };

    let mut notes = Vec::new();
    for check in checks {
        let result = match check {
            Check::Equals { var, expected, .. } => {
                context.check_equals(var, expected, check.fail_message(), &mut notes)
            }
            Check::ListClose {
                var,
                expected,
                expected_summary,
                ..
            } => context.check_list_close(
                var,
                expected,
                check.fail_message(),
                expected_summary.as_deref(),
                &mut notes,
            ),
            Check::OutputContains { expected, .. } => {
                if execution.stdout.contains(expected.as_str()) {
                    Ok(())
                } else {
                    Err(format!(
                        "{} (the output must contain '{expected}').",
                        check.fail_message()
                    ))
                }
            }
        };
        if let Err(message) = result {
            debug!(check = check.kind(), "check failed");
            return Verdict {
                passed: false,
                message,
                notes,
            };
        }
    }

    Verdict {
        passed: true,
        message: "Correct.".to_string(),
        notes,
    }
}

struct Context<'a> {
    accepted_vars: &'a [String],
    execution: &'a Execution,
    output_has_expected: bool,
}

impl Context<'_> {
    /// Find the binding a check should look at: the declared name wins,
    /// otherwise the first accepted alternative that exists.
    fn select_var<'b>(&'b self, declared: &'b str) -> Option<&'b str> {
        if self.execution.bindings.contains_key(declared) {
            return Some(declared);
        }
        self.accepted_vars
            .iter()
            .map(String::as_str)
            .find(|name| self.execution.bindings.contains_key(*name))
    }

    fn missing_var_failure(&self, declared: &str, notes: &mut Vec<String>) -> String {
        if !self.accepted_vars.is_empty() {
            let mut names: Vec<&str> = self.accepted_vars.iter().map(String::as_str).collect();
            names.push(declared);
            notes.push(format!("Accepted variable names: {}.", names.join(", ")));
        }
        if self.output_has_expected {
            format!(
                "The computation looks right, but the exercise requires storing the result in a variable named '{declared}'."
            )
        } else {
            format!("You have not created the variable '{declared}'.")
        }
    }

    fn check_equals(
        &self,
        declared: &str,
        expected: &serde_json::Value,
        base: &str,
        notes: &mut Vec<String>,
    ) -> Result<(), String> {
        let Some(name) = self.select_var(declared) else {
            return Err(self.missing_var_failure(declared, notes));
        };
        let actual = &self.execution.bindings[name];
        if actual.python_eq(&Value::from_json(expected)) {
            Ok(())
        } else {
            Err(format!(
                "{base} (expected {}).",
                render_json_literal(expected)
            ))
        }
    }

    fn check_list_close(
        &self,
        declared: &str,
        expected: &[f64],
        base: &str,
        expected_summary: Option<&str>,
        notes: &mut Vec<String>,
    ) -> Result<(), String> {
        let Some(name) = self.select_var(declared) else {
            return Err(self.missing_var_failure(declared, notes));
        };
        let hint = match expected_summary {
            Some(summary) => format!("Expected: {summary}"),
            None => format!("Expected a list of {} numbers.", expected.len()),
        };

        let actual = &self.execution.bindings[name];
        let items: &[Value] = match actual {
            Value::Str(_) => return Err(format!("{name} is not a list (it is text). {hint}")),
            Value::List(items) => items,
            // Any materialized lazy iterable is compared element-wise.
            // Only map carries the conversion reminder.
            Value::Lazy { class, items } => {
                if class == "map" {
                    notes.push(
                        "Note: you still need to convert map to list (use list(map(...)))."
                            .to_string(),
                    );
                    notes.push("I converted your map result to a list to check it.".to_string());
                }
                items
            }
            _ => return Err(format!("{base} {hint}")),
        };

        if items.len() != expected.len() {
            return Err(format!(
                "Your list has the wrong length (expected {}, got {}). {hint}",
                expected.len(),
                items.len()
            ));
        }
        for (item, want) in items.iter().zip(expected) {
            let close = item
                .as_f64()
                .is_some_and(|got| (got - want).abs() <= TOLERANCE);
            if !close {
                return Err(format!(
                    "The values do not match within tolerance {TOLERANCE}. {hint}"
                ));
            }
        }
        Ok(())
    }
}
