//! Permissive import denylist for the free-run sandbox.
//!
//! The process sandbox lets learners explore the language, so the only
//! concern here is keeping out modules that touch the host: filesystem,
//! process control, and network. Source that does not parse is allowed
//! through; the interpreter itself will report the syntax error.

use rustpython_parser::{Mode, ast, parse};
use tracing::debug;

use super::walk::{SourceVisitor, walk_body};
use super::{SafetyViolation, ViolationRule, line_col};

const DENIED_MODULES: &[&str] = &[
    "os",
    "sys",
    "shutil",
    "subprocess",
    "pathlib",
    "socket",
    "requests",
    "ctypes",
];

fn denied(module: &str) -> Option<&'static str> {
    let root = module.split('.').next().unwrap_or(module);
    DENIED_MODULES.iter().copied().find(|m| *m == root)
}

/// Check `source` for an import of a denylisted module.
///
/// Covers `import`, `from ... import`, and `__import__` called with a
/// string literal. Dynamic module names pass; the sandbox's process
/// isolation is the backstop for those.
pub fn blocked_import(source: &str) -> Option<SafetyViolation> {
    match parse(source, Mode::Module, "<learner>") {
        Ok(ast::Mod::Module(ast::ModModule { body, .. })) => {
            let mut scan = ImportScan { source };
            walk_body(&mut scan, &body).err()
        }
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err.error, "coarse scan skipped unparsable source");
            None
        }
    }
}

struct ImportScan<'a> {
    source: &'a str,
}

impl ImportScan<'_> {
    fn refuse(&self, module: &str, offset: usize) -> SafetyViolation {
        SafetyViolation {
            rule: ViolationRule::BlockedImport,
            message: format!("Import blocked for safety: '{module}'."),
            location: Some(line_col(self.source, offset)),
        }
    }
}

impl SourceVisitor for ImportScan<'_> {
    fn visit_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), SafetyViolation> {
        use rustpython_parser::ast::Ranged;
        match stmt {
            ast::Stmt::Import(ast::StmtImport { names, .. }) => {
                for alias in names {
                    if let Some(module) = denied(alias.name.as_str()) {
                        return Err(self.refuse(module, u32::from(stmt.start()) as usize));
                    }
                }
            }
            ast::Stmt::ImportFrom(ast::StmtImportFrom { module, .. }) => {
                if let Some(name) = module
                    && let Some(module) = denied(name.as_str())
                {
                    return Err(self.refuse(module, u32::from(stmt.start()) as usize));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &ast::Expr) -> Result<(), SafetyViolation> {
        use rustpython_parser::ast::Ranged;
        if let ast::Expr::Call(ast::ExprCall { func, args, .. }) = expr
            && let ast::Expr::Name(ast::ExprName { id, .. }) = func.as_ref()
            && id.as_str() == "__import__"
            && let Some(ast::Expr::Constant(ast::ExprConstant {
                value: ast::Constant::Str(name),
                ..
            })) = args.first()
            && let Some(module) = denied(name)
        {
            return Err(self.refuse(module, u32::from(expr.start()) as usize));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_code_is_allowed() {
        assert_eq!(blocked_import("x = 1\nprint(x)\n"), None);
    }

    #[test]
    fn denied_import_is_refused_with_module_name() {
        let violation = blocked_import("import os\n").expect("os should be refused");
        assert_eq!(violation.rule, ViolationRule::BlockedImport);
        assert_eq!(violation.message, "Import blocked for safety: 'os'.");
        assert_eq!(violation.location, Some((1, 1)));
    }

    #[test]
    fn submodule_and_from_imports_are_covered() {
        assert!(blocked_import("import os.path\n").is_some());
        assert!(blocked_import("from subprocess import run\n").is_some());
    }

    #[test]
    fn dunder_import_with_literal_is_covered() {
        let violation =
            blocked_import("m = __import__('socket')\n").expect("socket should be refused");
        assert_eq!(violation.message, "Import blocked for safety: 'socket'.");
    }

    #[test]
    fn harmless_imports_pass() {
        assert_eq!(blocked_import("import math\nfrom math import sqrt\n"), None);
    }

    #[test]
    fn unparsable_source_passes_through() {
        assert_eq!(blocked_import("def broken(:\n"), None);
    }

    #[test]
    fn import_inside_a_function_body_is_found() {
        let violation = blocked_import("def f():\n    import shutil\n").expect("nested import");
        assert_eq!(violation.location, Some((2, 5)));
    }
}
