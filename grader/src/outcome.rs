//! Result types produced by the two execution paths.

use std::time::Duration;

use serde::Serialize;

use crate::analysis::ViolationRule;

/// How a free (ungraded) sandbox run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Process exited with status zero.
    Ok,
    /// Process exited non-zero, or could not be spawned.
    Error,
    /// Wall-clock deadline hit, or the process died to a resource signal.
    Timeout,
    /// The coarse analyzer refused the code; nothing was spawned.
    Blocked,
}

/// Outcome of a free sandbox run.
///
/// `stdout` and `stderr` are truncated to the configured output limit.
/// `duration` covers the whole call including the pre-spawn analysis.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: RunStatus,
    pub stdout: String,
    pub stderr: String,
    /// Learner-facing one-liner summarizing the outcome.
    pub message: String,
    pub duration: Duration,
    /// Advisory only, never fatal. E.g. resource ceilings that could not be
    /// applied on this platform.
    pub warnings: Vec<String>,
}

/// How a graded attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    Pass,
    Fail,
    SyntaxError,
    /// The strict analyzer refused the code.
    Blocked,
    RuntimeError,
}

impl GradeStatus {
    pub fn passed(self) -> bool {
        matches!(self, GradeStatus::Pass)
    }
}

/// Outcome of grading one attempt against an exercise.
#[derive(Debug, Clone)]
pub struct GradingResult {
    pub status: GradeStatus,
    /// Primary feedback line shown to the learner.
    pub message: String,
    pub stdout: String,
    pub stderr: String,
    /// Secondary feedback: a traceback for runtime errors, advisory notes
    /// from the checks otherwise.
    pub details: Vec<String>,
    /// 1-based position of the problem, when the failure has one.
    pub location: Option<(usize, usize)>,
    /// The rule that fired, for blocked attempts and whitespace lint
    /// failures.
    pub violation: Option<ViolationRule>,
}

impl GradingResult {
    pub(crate) fn new(status: GradeStatus, message: impl Into<String>) -> GradingResult {
        GradingResult {
            status,
            message: message.into(),
            stdout: String::new(),
            stderr: String::new(),
            details: Vec::new(),
            location: None,
            violation: None,
        }
    }
}
