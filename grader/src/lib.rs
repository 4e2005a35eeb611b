//! Execution and grading engine for learner-submitted Python snippets.
//!
//! The engine reconciles three goals: let arbitrary learner code run,
//! prevent it from being dangerous, and produce deterministic, explainable
//! grading results. The architecture keeps the pieces separable:
//!
//! - **[`analysis`]**: static safety gates (lexical lint, permissive
//!   denylist for free runs, strict allowlist for graded runs). Pure, no
//!   execution.
//! - **[`sandbox`]**: free-run path. Spawns the host Python interpreter in a
//!   child process with a wall-clock timeout and best-effort CPU/memory
//!   ceilings.
//! - **[`interp`]**: graded-run path. Executes inside an embedded RustPython
//!   VM with an allowlisted builtin surface and captured output.
//! - **[`checks`]**: turns the resulting bindings and captured output into
//!   pass/fail feedback.
//!
//! [`grade`] and [`sandbox::run`] are the two entry points; both are pure
//! functions of their inputs and keep no state across invocations.

pub mod analysis;
pub mod attempt;
pub mod checks;
pub mod grade;
pub mod interp;
pub mod logging;
pub mod outcome;
pub mod sandbox;
pub mod value;

pub use attempt::AttemptRecord;
pub use grade::grade;
pub use outcome::{ExecutionResult, GradeStatus, GradingResult, RunStatus};
pub use sandbox::{SandboxConfig, run};
