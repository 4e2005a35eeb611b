//! End-to-end grading over the builtin catalog, plus sandbox runs against
//! the host Python interpreter. Sandbox tests skip themselves when no
//! interpreter is installed.

use std::collections::BTreeMap;
use std::time::Duration;

use catalog::{Catalog, Check, Exercise};
use grader::{GradeStatus, RunStatus, SandboxConfig};
use serde_json::json;

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

#[test]
fn every_builtin_solution_passes_grading() {
    let catalog = Catalog::builtin();
    for position in catalog.all_exercises() {
        let ex = position.exercise;
        let result = grader::grade(ex, &ex.solution);
        assert_eq!(
            result.status,
            GradeStatus::Pass,
            "solution for {} did not pass: {}",
            ex.id,
            result.message
        );
    }
}

#[test]
fn alias_variable_names_are_accepted_end_to_end() {
    let mut ex = exercise(vec![Check::Equals {
        var: "numero".to_string(),
        expected: json!(42),
        message: String::new(),
    }]);
    ex.accepted_vars = vec!["number".to_string()];
    let result = grader::grade(&ex, "number = int('42')\n");
    assert_eq!(result.status, GradeStatus::Pass);
    assert_eq!(result.message, "Correct.");
}

#[test]
fn printed_superstring_satisfies_output_contains() {
    let ex = exercise(vec![Check::OutputContains {
        expected: "5".to_string(),
        message: String::new(),
    }]);
    let result = grader::grade(&ex, "print(50)\n");
    assert_eq!(result.status, GradeStatus::Pass);
}

#[test]
fn list_length_mismatch_names_both_lengths() {
    let ex = exercise(vec![Check::ListClose {
        var: "result".to_string(),
        expected: vec![32.0, 53.6, 66.2, 69.8],
        message: String::new(),
        expected_summary: None,
    }]);
    let result = grader::grade(&ex, "result = [32.0, 53.6, 66.2]\n");
    assert_eq!(result.status, GradeStatus::Fail);
    assert_eq!(
        result.message,
        "Your list has the wrong length (expected 4, got 3). Expected a list of 4 numbers."
    );
}

#[test]
fn range_result_satisfies_a_numeric_list_check() {
    let ex = exercise(vec![Check::ListClose {
        var: "result".to_string(),
        expected: vec![0.0, 1.0, 2.0],
        message: String::new(),
        expected_summary: None,
    }]);
    let result = grader::grade(&ex, "result = range(3)\n");
    assert_eq!(result.status, GradeStatus::Pass, "{}", result.message);
}

#[test]
fn strict_import_is_blocked_end_to_end() {
    let ex = exercise(vec![Check::Equals {
        var: "x".to_string(),
        expected: json!(1),
        message: String::new(),
    }]);
    let result = grader::grade(&ex, "import os\nx = 1\n");
    assert_eq!(result.status, GradeStatus::Blocked);
    assert_eq!(result.message, "Imports are not allowed in this exercise.");
}

#[test]
fn setup_bindings_reach_the_graded_code() {
    let mut ex = exercise(vec![Check::Equals {
        var: "total".to_string(),
        expected: json!(15),
        message: String::new(),
    }]);
    ex.setup.insert("base".to_string(), json!(5));
    let result = grader::grade(&ex, "total = base * 3\n");
    assert_eq!(result.status, GradeStatus::Pass);
}

mod sandbox {
    use super::*;
    use std::process::Command;

    fn python_available(config: &SandboxConfig) -> bool {
        Command::new(&config.python_bin)
            .arg("--version")
            .output()
            .is_ok()
    }

    fn config(scratch: &tempfile::TempDir) -> SandboxConfig {
        SandboxConfig {
            scratch_base: Some(scratch.path().to_path_buf()),
            ..SandboxConfig::default()
        }
    }

    #[test]
    fn free_run_captures_stdout() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let config = config(&scratch);
        if !python_available(&config) {
            eprintln!("skipping: no python interpreter");
            return;
        }
        let result = grader::run(&config, "print('hello from the sandbox')\n", &BTreeMap::new());
        assert_eq!(result.status, RunStatus::Ok, "stderr: {}", result.stderr);
        assert_eq!(result.message, "Execution completed.");
        assert!(result.stdout.contains("hello from the sandbox"));
    }

    #[test]
    fn free_run_sees_setup_bindings() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let config = config(&scratch);
        if !python_available(&config) {
            eprintln!("skipping: no python interpreter");
            return;
        }
        let mut setup = BTreeMap::new();
        setup.insert("base".to_string(), json!(21));
        let result = grader::run(&config, "print(base * 2)\n", &setup);
        assert_eq!(result.status, RunStatus::Ok, "stderr: {}", result.stderr);
        assert!(result.stdout.contains("42"));
    }

    #[test]
    fn infinite_loop_hits_the_wall_clock() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let mut config = config(&scratch);
        config.timeout = Duration::from_millis(500);
        if !python_available(&config) {
            eprintln!("skipping: no python interpreter");
            return;
        }
        let result = grader::run(&config, "while True:\n    pass\n", &BTreeMap::new());
        assert_eq!(result.status, RunStatus::Timeout);
        assert_eq!(result.message, "Time limit exceeded.");
        assert!(result.duration >= Duration::from_millis(500));
    }

    #[test]
    fn failing_code_reports_the_last_stderr_line() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let config = config(&scratch);
        if !python_available(&config) {
            eprintln!("skipping: no python interpreter");
            return;
        }
        let result = grader::run(&config, "raise ValueError('boom')\n", &BTreeMap::new());
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.message.contains("ValueError: boom"), "{}", result.message);
    }

    #[test]
    fn denied_import_is_blocked_without_spawning() {
        // No interpreter needed: the refusal happens before any spawn.
        let scratch = tempfile::tempdir().expect("tempdir");
        let result = grader::run(&config(&scratch), "import socket\n", &BTreeMap::new());
        assert_eq!(result.status, RunStatus::Blocked);
        assert_eq!(result.message, "Import blocked for safety: 'socket'.");
    }
}
