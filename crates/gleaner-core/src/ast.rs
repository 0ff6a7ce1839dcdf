//! Expression and statement nodes for decompiled script bodies.
//!
//! The decompiler collaborator hands the core a flat, ordered sequence of
//! top-level statements per routine. Only the node shapes that the decompiler
//! is known to emit for the scanned call patterns are represented; the
//! evaluator matches exhaustively over them, so adding a variant surfaces
//! every site that needs to handle it.

use serde::{Deserialize, Serialize};

/// An expression in a decompiled routine body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Double(f64),
    /// String literal.
    Str(String),
    /// Named variable reference, optionally indexed: `name` or `name[index]`.
    Var {
        name: String,
        index: Option<Box<Expr>>,
    },
    /// Binary operation: `lhs op rhs`.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Function call: `name(args...)`.
    Call(Call),
    /// Reference to an engine asset by kind and numeric id.
    AssetRef { kind: AssetKind, id: i64 },
}

/// A function call with ordered argument expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// A top-level statement in a decompiled routine body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Assignment: `target = value;`
    Assign { target: Expr, value: Expr },
    /// Expression statement (a side-effecting call at statement position).
    Expr(Expr),
}

/// Kind of engine asset an [`Expr::AssetRef`] points at.
///
/// Matches the GameMaker asset-type vocabulary. `RoomInstance` appears in
/// decompiled output but has no registry behind it, so resolving one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Object,
    Sprite,
    Sound,
    Room,
    Background,
    Path,
    Script,
    Font,
    Timeline,
    Shader,
    Sequence,
    AnimCurve,
    ParticleSystem,
    RoomInstance,
}

impl AssetKind {
    /// Whether a registry lookup exists for this kind.
    pub fn resolvable(self) -> bool {
        !matches!(self, AssetKind::RoomInstance)
    }
}

impl Expr {
    /// Short one-line rendering for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Expr::Int(v) => v.to_string(),
            Expr::Double(v) => v.to_string(),
            Expr::Str(s) => format!("{s:?}"),
            Expr::Var { name, index: None } => name.clone(),
            Expr::Var {
                name,
                index: Some(idx),
            } => format!("{name}[{}]", idx.describe()),
            Expr::Binary { op, lhs, rhs } => {
                format!("({} {op:?} {})", lhs.describe(), rhs.describe())
            }
            Expr::Call(call) => format!("{}(<{} args>)", call.name, call.args.len()),
            Expr::AssetRef { kind, id } => format!("{kind:?}#{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_nested() {
        let expr = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(Expr::Var {
                name: "ItemTier".into(),
                index: Some(Box::new(Expr::Int(3))),
            }),
            rhs: Box::new(Expr::Int(1)),
        };
        assert_eq!(expr.describe(), "(ItemTier[3] Add 1)");
    }

    #[test]
    fn stmt_roundtrips_through_json() {
        let stmt = Stmt::Assign {
            target: Expr::Var {
                name: "SVCost".into(),
                index: Some(Box::new(Expr::Int(0))),
            },
            value: Expr::Int(25),
        };
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Stmt = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt, back);
    }

    #[test]
    fn room_instance_is_not_resolvable() {
        assert!(AssetKind::Sprite.resolvable());
        assert!(!AssetKind::RoomInstance.resolvable());
    }
}
