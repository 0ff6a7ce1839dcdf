//! Call-site and assignment scanning over a flat statement sequence.

use crate::ast::{Call, Expr, Stmt};

/// All calls to `name` at statement position, in source order.
///
/// Non-destructive; an empty result is a normal outcome, not an error.
pub fn find_calls<'a>(stmts: &'a [Stmt], name: &str) -> Vec<&'a Call> {
    stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expr(Expr::Call(call)) if call.name == name => Some(call),
            _ => None,
        })
        .collect()
}

/// All assignment statements as `(target, value)` pairs, in source order.
pub fn find_assignments(stmts: &[Stmt]) -> Vec<(&Expr, &Expr)> {
    stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Assign { target, value } => Some((target, value)),
            _ => None,
        })
        .collect()
}
