//! Depth-first traversal over the parsed module.
//!
//! Policies implement [`SourceVisitor`]; the walker guarantees every
//! statement and expression is visited, including bodies of nested
//! functions, comprehension clauses, and default argument values, so a
//! disallowed construct cannot hide inside a definition that never runs.

use rustpython_parser::ast;

use super::SafetyViolation;

pub(crate) trait SourceVisitor {
    fn visit_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), SafetyViolation>;
    fn visit_expr(&mut self, expr: &ast::Expr) -> Result<(), SafetyViolation>;
}

pub(crate) fn walk_body<V: SourceVisitor>(
    visitor: &mut V,
    body: &[ast::Stmt],
) -> Result<(), SafetyViolation> {
    for stmt in body {
        walk_stmt(visitor, stmt)?;
    }
    Ok(())
}

fn walk_stmt<V: SourceVisitor>(visitor: &mut V, stmt: &ast::Stmt) -> Result<(), SafetyViolation> {
    visitor.visit_stmt(stmt)?;
    match stmt {
        ast::Stmt::FunctionDef(ast::StmtFunctionDef {
            args,
            body,
            decorator_list,
            returns,
            ..
        })
        | ast::Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef {
            args,
            body,
            decorator_list,
            returns,
            ..
        }) => {
            walk_arguments(visitor, args)?;
            walk_body(visitor, body)?;
            for expr in decorator_list {
                walk_expr(visitor, expr)?;
            }
            if let Some(expr) = returns {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::ClassDef(ast::StmtClassDef {
            bases,
            keywords,
            body,
            decorator_list,
            ..
        }) => {
            for expr in bases {
                walk_expr(visitor, expr)?;
            }
            for keyword in keywords {
                walk_expr(visitor, &keyword.value)?;
            }
            walk_body(visitor, body)?;
            for expr in decorator_list {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::Return(ast::StmtReturn { value, .. }) => {
            if let Some(expr) = value {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::Delete(ast::StmtDelete { targets, .. }) => {
            for expr in targets {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::Assign(ast::StmtAssign { targets, value, .. }) => {
            for expr in targets {
                walk_expr(visitor, expr)?;
            }
            walk_expr(visitor, value)?;
        }
        ast::Stmt::AugAssign(ast::StmtAugAssign { target, value, .. }) => {
            walk_expr(visitor, target)?;
            walk_expr(visitor, value)?;
        }
        ast::Stmt::AnnAssign(ast::StmtAnnAssign {
            target,
            annotation,
            value,
            ..
        }) => {
            walk_expr(visitor, target)?;
            walk_expr(visitor, annotation)?;
            if let Some(expr) = value {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::For(ast::StmtFor {
            target,
            iter,
            body,
            orelse,
            ..
        })
        | ast::Stmt::AsyncFor(ast::StmtAsyncFor {
            target,
            iter,
            body,
            orelse,
            ..
        }) => {
            walk_expr(visitor, target)?;
            walk_expr(visitor, iter)?;
            walk_body(visitor, body)?;
            walk_body(visitor, orelse)?;
        }
        ast::Stmt::While(ast::StmtWhile {
            test, body, orelse, ..
        }) => {
            walk_expr(visitor, test)?;
            walk_body(visitor, body)?;
            walk_body(visitor, orelse)?;
        }
        ast::Stmt::If(ast::StmtIf {
            test, body, orelse, ..
        }) => {
            walk_expr(visitor, test)?;
            walk_body(visitor, body)?;
            walk_body(visitor, orelse)?;
        }
        ast::Stmt::With(ast::StmtWith { items, body, .. })
        | ast::Stmt::AsyncWith(ast::StmtAsyncWith { items, body, .. }) => {
            for item in items {
                walk_expr(visitor, &item.context_expr)?;
                if let Some(expr) = &item.optional_vars {
                    walk_expr(visitor, expr)?;
                }
            }
            walk_body(visitor, body)?;
        }
        ast::Stmt::Match(ast::StmtMatch { subject, cases, .. }) => {
            walk_expr(visitor, subject)?;
            for case in cases {
                if let Some(expr) = &case.guard {
                    walk_expr(visitor, expr)?;
                }
                walk_body(visitor, &case.body)?;
            }
        }
        ast::Stmt::Raise(ast::StmtRaise { exc, cause, .. }) => {
            if let Some(expr) = exc {
                walk_expr(visitor, expr)?;
            }
            if let Some(expr) = cause {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::Try(ast::StmtTry {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        })
        | ast::Stmt::TryStar(ast::StmtTryStar {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        }) => {
            walk_body(visitor, body)?;
            for handler in handlers {
                let ast::ExceptHandler::ExceptHandler(ast::ExceptHandlerExceptHandler {
                    type_,
                    body,
                    ..
                }) = handler;
                if let Some(expr) = type_ {
                    walk_expr(visitor, expr)?;
                }
                walk_body(visitor, body)?;
            }
            walk_body(visitor, orelse)?;
            walk_body(visitor, finalbody)?;
        }
        ast::Stmt::Assert(ast::StmtAssert { test, msg, .. }) => {
            walk_expr(visitor, test)?;
            if let Some(expr) = msg {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Stmt::Expr(ast::StmtExpr { value, .. }) => {
            walk_expr(visitor, value)?;
        }
        // Import, ImportFrom, Global, Nonlocal, Pass, Break, Continue and
        // any leaf forms carry no nested statements or expressions.
        _ => {}
    }
    Ok(())
}

fn walk_expr<V: SourceVisitor>(visitor: &mut V, expr: &ast::Expr) -> Result<(), SafetyViolation> {
    visitor.visit_expr(expr)?;
    match expr {
        ast::Expr::BoolOp(ast::ExprBoolOp { values, .. }) => {
            for expr in values {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::NamedExpr(ast::ExprNamedExpr { target, value, .. }) => {
            walk_expr(visitor, target)?;
            walk_expr(visitor, value)?;
        }
        ast::Expr::BinOp(ast::ExprBinOp { left, right, .. }) => {
            walk_expr(visitor, left)?;
            walk_expr(visitor, right)?;
        }
        ast::Expr::UnaryOp(ast::ExprUnaryOp { operand, .. }) => {
            walk_expr(visitor, operand)?;
        }
        ast::Expr::Lambda(ast::ExprLambda { args, body, .. }) => {
            walk_arguments(visitor, args)?;
            walk_expr(visitor, body)?;
        }
        ast::Expr::IfExp(ast::ExprIfExp {
            test, body, orelse, ..
        }) => {
            walk_expr(visitor, test)?;
            walk_expr(visitor, body)?;
            walk_expr(visitor, orelse)?;
        }
        ast::Expr::Dict(ast::ExprDict { keys, values, .. }) => {
            for key in keys.iter().flatten() {
                walk_expr(visitor, key)?;
            }
            for value in values {
                walk_expr(visitor, value)?;
            }
        }
        ast::Expr::Set(ast::ExprSet { elts, .. }) => {
            for expr in elts {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::ListComp(ast::ExprListComp {
            elt, generators, ..
        })
        | ast::Expr::SetComp(ast::ExprSetComp {
            elt, generators, ..
        })
        | ast::Expr::GeneratorExp(ast::ExprGeneratorExp {
            elt, generators, ..
        }) => {
            walk_expr(visitor, elt)?;
            walk_comprehensions(visitor, generators)?;
        }
        ast::Expr::DictComp(ast::ExprDictComp {
            key,
            value,
            generators,
            ..
        }) => {
            walk_expr(visitor, key)?;
            walk_expr(visitor, value)?;
            walk_comprehensions(visitor, generators)?;
        }
        ast::Expr::Await(ast::ExprAwait { value, .. })
        | ast::Expr::YieldFrom(ast::ExprYieldFrom { value, .. })
        | ast::Expr::Starred(ast::ExprStarred { value, .. })
        | ast::Expr::Attribute(ast::ExprAttribute { value, .. }) => {
            walk_expr(visitor, value)?;
        }
        ast::Expr::Yield(ast::ExprYield { value, .. }) => {
            if let Some(expr) = value {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::Compare(ast::ExprCompare {
            left, comparators, ..
        }) => {
            walk_expr(visitor, left)?;
            for expr in comparators {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::Call(ast::ExprCall {
            func,
            args,
            keywords,
            ..
        }) => {
            walk_expr(visitor, func)?;
            for expr in args {
                walk_expr(visitor, expr)?;
            }
            for keyword in keywords {
                walk_expr(visitor, &keyword.value)?;
            }
        }
        ast::Expr::FormattedValue(ast::ExprFormattedValue {
            value, format_spec, ..
        }) => {
            walk_expr(visitor, value)?;
            if let Some(expr) = format_spec {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::JoinedStr(ast::ExprJoinedStr { values, .. }) => {
            for expr in values {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::Subscript(ast::ExprSubscript { value, slice, .. }) => {
            walk_expr(visitor, value)?;
            walk_expr(visitor, slice)?;
        }
        ast::Expr::List(ast::ExprList { elts, .. })
        | ast::Expr::Tuple(ast::ExprTuple { elts, .. }) => {
            for expr in elts {
                walk_expr(visitor, expr)?;
            }
        }
        ast::Expr::Slice(ast::ExprSlice {
            lower, upper, step, ..
        }) => {
            for expr in [lower, upper, step].into_iter().flatten() {
                walk_expr(visitor, expr)?;
            }
        }
        // Name and Constant are leaves.
        _ => {}
    }
    Ok(())
}

fn walk_arguments<V: SourceVisitor>(
    visitor: &mut V,
    args: &ast::Arguments,
) -> Result<(), SafetyViolation> {
    let ast::Arguments {
        posonlyargs,
        args: positional,
        kwonlyargs,
        ..
    } = args;
    for arg in posonlyargs.iter().chain(positional).chain(kwonlyargs) {
        if let Some(default) = &arg.default {
            walk_expr(visitor, default)?;
        }
    }
    Ok(())
}

fn walk_comprehensions<V: SourceVisitor>(
    visitor: &mut V,
    generators: &[ast::Comprehension],
) -> Result<(), SafetyViolation> {
    for comp in generators {
        walk_expr(visitor, &comp.target)?;
        walk_expr(visitor, &comp.iter)?;
        for expr in &comp.ifs {
            walk_expr(visitor, expr)?;
        }
    }
    Ok(())
}
