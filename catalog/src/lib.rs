//! Exercise catalog: content model, loading, and navigation.
//!
//! The catalog owns the read-only description of everything gradable:
//! modules, lessons, exercises, and the per-exercise checks the grading
//! engine evaluates. The engine (`grader`) only reads these types.
//!
//! Content comes from either the embedded builtin catalog or a JSON file
//! (`{"version": 1, "modules": [...]}`). Loading and validation happen here;
//! nothing in this crate executes learner code.

pub mod check;
mod content;
pub mod exercise;
pub mod store;

pub use check::Check;
pub use exercise::{Exercise, Lesson, Module};
pub use store::{Catalog, Position};
