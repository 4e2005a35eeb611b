//! Content model: modules, lessons, exercises.
//!
//! These types are constructed once per catalog load and are read-only for
//! the lifetime of a grading run. Structural validation guarantees the
//! grading engine's preconditions: string identifiers and a non-empty check
//! list per exercise.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::check::Check;

/// Top-level unit of the curriculum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub lessons: Vec<Lesson>,
}

/// A lesson groups exercises around one concept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub explanation: Vec<String>,
    pub exercises: Vec<Exercise>,
}

/// One gradable unit: statement, starter code, checks, and optional setup
/// variables injected before the learner's code runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub statement: String,
    #[serde(default)]
    pub example: String,
    pub starter_code: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub solution: String,
    /// Alternate variable names accepted by variable checks, tried in order.
    #[serde(default)]
    pub accepted_vars: Vec<String>,
    /// Variable name to JSON literal, bound before execution.
    #[serde(default)]
    pub setup: BTreeMap<String, serde_json::Value>,
    pub checks: Vec<Check>,
}

impl Module {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_id("module.id", &self.id)?;
        if self.lessons.is_empty() {
            bail!("module {} has no lessons", self.id);
        }
        for lesson in &self.lessons {
            lesson
                .validate()
                .with_context(|| format!("module {}", self.id))?;
        }
        Ok(())
    }
}

impl Lesson {
    fn validate(&self) -> Result<()> {
        validate_id("lesson.id", &self.id)?;
        if self.exercises.is_empty() {
            bail!("lesson {} has no exercises", self.id);
        }
        for exercise in &self.exercises {
            exercise
                .validate()
                .with_context(|| format!("lesson {}", self.id))?;
        }
        Ok(())
    }
}

impl Exercise {
    fn validate(&self) -> Result<()> {
        validate_id("exercise.id", &self.id)?;
        if self.statement.trim().is_empty() {
            bail!("exercise {} has an empty statement", self.id);
        }
        if self.checks.is_empty() {
            bail!("exercise {} has no checks", self.id);
        }
        for (index, check) in self.checks.iter().enumerate() {
            check
                .validate()
                .with_context(|| format!("exercise {} checks[{}]", self.id, index))?;
        }
        Ok(())
    }

    /// Fill in the optional fields a hand-written catalog may omit.
    pub(crate) fn apply_defaults(&mut self) {
        if self.example.trim().is_empty() {
            self.example = self.starter_code.clone();
        }
        if self.hints.len() < 2 {
            let var = self
                .checks
                .iter()
                .find_map(Check::var)
                .unwrap_or("result")
                .to_string();
            self.hints = vec![
                format!("Think about the variable '{var}'."),
                "Re-read the statement and adjust your code.".to_string(),
            ];
        }
        if self.solution.trim().is_empty() {
            self.solution = "Solution not available.".to_string();
        }
    }
}

pub(crate) fn apply_defaults(modules: &mut [Module]) {
    for module in modules.iter_mut() {
        for lesson in &mut module.lessons {
            if lesson.key_points.is_empty() {
                lesson.key_points = vec![
                    "Read the statement carefully.".to_string(),
                    "Use clear variable names.".to_string(),
                    "Check the result at the end.".to_string(),
                ];
            }
            if lesson.explanation.is_empty() {
                lesson.explanation = vec![
                    "This lesson practices one concrete concept.".to_string(),
                    "Read the statement and follow the steps.".to_string(),
                    "If you get stuck, use the hints.".to_string(),
                    "Try and fix until it passes.".to_string(),
                ];
            }
            for exercise in &mut lesson.exercises {
                exercise.apply_defaults();
            }
        }
    }
}

fn validate_id(label: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("{label} must be non-empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_exercise() -> Exercise {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "Sum",
            "statement": "Add a and b into total.",
            "starter_code": "a = 2\nb = 3\n",
            "checks": [
                {"type": "equals", "var": "total", "expected": 5}
            ]
        }))
        .expect("exercise parses")
    }

    #[test]
    fn validates_minimal_exercise() {
        assert!(minimal_exercise().validate().is_ok());
    }

    #[test]
    fn rejects_exercise_without_checks() {
        let mut exercise = minimal_exercise();
        exercise.checks.clear();
        let err = exercise.validate().expect_err("no checks");
        assert!(err.to_string().contains("no checks"));
    }

    #[test]
    fn defaults_fill_example_and_hints() {
        let mut exercise = minimal_exercise();
        exercise.apply_defaults();
        assert_eq!(exercise.example, exercise.starter_code);
        assert_eq!(exercise.hints.len(), 2);
        assert!(exercise.hints[0].contains("total"));
        assert!(!exercise.solution.is_empty());
    }
}
