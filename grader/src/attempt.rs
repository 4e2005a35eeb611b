//! Attempt records: one grading result, flattened for the caller's log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::outcome::{GradeStatus, GradingResult};

/// What happened when a learner submitted code, in a serializable shape.
///
/// The engine itself keeps no history; callers decide where records go.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub exercise_id: String,
    pub status: GradeStatus,
    pub passed: bool,
    pub message: String,
    pub code: String,
    pub recorded_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(exercise_id: &str, code: &str, result: &GradingResult) -> AttemptRecord {
        AttemptRecord {
            exercise_id: exercise_id.to_string(),
            status: result.status,
            passed: result.status.passed(),
            message: result.message.clone(),
            code: code.to_string(),
            recorded_at: Utc::now(),
        }
    }
}
