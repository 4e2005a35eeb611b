//! Check variants an exercise declares against the learner's result.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Fallback failure message for checks that do not declare one.
pub const DEFAULT_FAIL_MESSAGE: &str = "Check your solution.";

/// A single correctness check, evaluated against the binding set and the
/// captured output of one execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Check {
    /// The variable `var` must equal `expected` (Python equality semantics).
    Equals {
        var: String,
        expected: serde_json::Value,
        #[serde(default)]
        message: String,
    },
    /// The variable `var` must be a sequence of numbers matching `expected`
    /// element-wise within an absolute tolerance of 1e-6.
    ListClose {
        var: String,
        expected: Vec<f64>,
        #[serde(default)]
        message: String,
        /// Optional human description of the expected sequence, used in
        /// failure messages instead of the raw length.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_summary: Option<String>,
    },
    /// Captured stdout must contain `expected` as a plain substring.
    OutputContains {
        expected: String,
        #[serde(default)]
        message: String,
    },
}

impl Check {
    /// Variable name the check reads, if any.
    pub fn var(&self) -> Option<&str> {
        match self {
            Check::Equals { var, .. } | Check::ListClose { var, .. } => Some(var),
            Check::OutputContains { .. } => None,
        }
    }

    /// Stable name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Check::Equals { .. } => "equals",
            Check::ListClose { .. } => "list_close",
            Check::OutputContains { .. } => "output_contains",
        }
    }

    /// Declared failure message, or the stock fallback when empty.
    pub fn fail_message(&self) -> &str {
        let message = match self {
            Check::Equals { message, .. }
            | Check::ListClose { message, .. }
            | Check::OutputContains { message, .. } => message,
        };
        if message.trim().is_empty() {
            DEFAULT_FAIL_MESSAGE
        } else {
            message
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Check::Equals { var, .. } => {
                if var.trim().is_empty() {
                    bail!("equals.var must be non-empty");
                }
            }
            Check::ListClose { var, expected, .. } => {
                if var.trim().is_empty() {
                    bail!("list_close.var must be non-empty");
                }
                if expected.is_empty() {
                    bail!("list_close.expected must be non-empty");
                }
            }
            Check::OutputContains { expected, .. } => {
                if expected.is_empty() {
                    bail!("output_contains.expected must be non-empty");
                }
            }
        }
        Ok(())
    }
}
