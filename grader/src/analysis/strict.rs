//! Strict gate applied before in-process execution.
//!
//! The embedded interpreter shares an address space with the engine, so
//! this policy is an allowlist in spirit: no imports at all, no scope
//! mutation statements, no dunder access, and none of the builtins that
//! reach the interpreter's internals or the host.

use rustpython_parser::{Mode, ast, parse};

use super::walk::{SourceVisitor, walk_body};
use super::{AnalysisError, SafetyViolation, ViolationRule, line_col};

const BANNED_CALLS: &[&str] = &[
    "__import__",
    "eval",
    "exec",
    "compile",
    "open",
    "input",
    "globals",
    "locals",
    "vars",
    "dir",
    "help",
    "getattr",
    "setattr",
    "delattr",
    "breakpoint",
];

/// Reject source the graded path must not run.
///
/// Syntax errors are reported with their position so feedback can point at
/// the offending line. Violations carry the first disallowed construct in
/// source order.
pub fn analyze(source: &str) -> Result<(), AnalysisError> {
    let body = match parse(source, Mode::Module, "<exercise>") {
        Ok(ast::Mod::Module(ast::ModModule { body, .. })) => body,
        Ok(_) => return Ok(()),
        Err(err) => {
            let (line, column) = line_col(source, u32::from(err.offset) as usize);
            return Err(AnalysisError::Syntax {
                message: err.error.to_string(),
                line,
                column,
            });
        }
    };
    let mut gate = StrictGate { source };
    walk_body(&mut gate, &body).map_err(AnalysisError::Violation)
}

struct StrictGate<'a> {
    source: &'a str,
}

impl StrictGate<'_> {
    fn violation(&self, rule: ViolationRule, message: String, offset: usize) -> SafetyViolation {
        SafetyViolation {
            rule,
            message,
            location: Some(line_col(self.source, offset)),
        }
    }
}

impl SourceVisitor for StrictGate<'_> {
    fn visit_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), SafetyViolation> {
        use rustpython_parser::ast::Ranged;
        match stmt {
            ast::Stmt::Import(_) | ast::Stmt::ImportFrom(_) => Err(self.violation(
                ViolationRule::Import,
                "Imports are not allowed in this exercise.".to_string(),
                u32::from(stmt.start()) as usize,
            )),
            ast::Stmt::Global(_) | ast::Stmt::Nonlocal(_) => Err(self.violation(
                ViolationRule::ScopeMutation,
                "Using global or nonlocal is not allowed.".to_string(),
                u32::from(stmt.start()) as usize,
            )),
            _ => Ok(()),
        }
    }

    fn visit_expr(&mut self, expr: &ast::Expr) -> Result<(), SafetyViolation> {
        use rustpython_parser::ast::Ranged;
        match expr {
            ast::Expr::Call(ast::ExprCall { func, .. }) => {
                if let ast::Expr::Name(ast::ExprName { id, .. }) = func.as_ref()
                    && BANNED_CALLS.contains(&id.as_str())
                {
                    return Err(self.violation(
                        ViolationRule::BannedCall,
                        format!("Calling '{}' is not allowed.", id.as_str()),
                        u32::from(expr.start()) as usize,
                    ));
                }
                Ok(())
            }
            ast::Expr::Name(ast::ExprName { id, .. }) if id.as_str().contains("__") => {
                Err(self.violation(
                    ViolationRule::DunderName,
                    "Names containing '__' are not allowed.".to_string(),
                    u32::from(expr.start()) as usize,
                ))
            }
            ast::Expr::Attribute(ast::ExprAttribute { attr, .. })
                if attr.as_str().contains("__") =>
            {
                Err(self.violation(
                    ViolationRule::DunderAttribute,
                    "Attributes containing '__' are not allowed.".to_string(),
                    u32::from(expr.start()) as usize,
                ))
            }
            _ => Ok(()),
        }
    }
}
