//! Constant-folding expression evaluator.
//!
//! Reduces a decompiled expression node to a concrete [`Value`] given an
//! optional variable environment and an optional asset resolver. The match
//! is exhaustive over the node vocabulary; anything the rules below do not
//! cover is a fatal [`CoreError::UnsupportedNode`].

use std::collections::HashMap;

use crate::ast::{BinOp, Call, Expr};
use crate::error::CoreError;
use crate::registry::AssetResolver;
use crate::value::Value;

/// Script call that wraps a single translation-text id.
pub const TEXT_SCRIPT: &str = "gml_Script_scr_Text";

/// A variable binding: either one value or an indexable sequence.
#[derive(Debug, Clone)]
pub enum Binding {
    Scalar(Value),
    Seq(Vec<Value>),
}

/// Variable environment for one scanning pass.
///
/// Built incrementally by a record builder; record `n` sees only what
/// records `0..n` pushed. Discarded when the pass completes.
#[derive(Debug, Clone, Default)]
pub struct Env {
    entries: HashMap<String, Binding>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_scalar(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), Binding::Scalar(value));
    }

    pub fn bind_seq(&mut self, name: &str, values: Vec<Value>) {
        self.entries.insert(name.to_string(), Binding::Seq(values));
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }
}

/// Evaluator over one routine's expressions.
///
/// Both capabilities are optional: evaluating a variable reference without
/// an environment fails with `UnboundVariable`, and evaluating an asset
/// reference without a resolver fails with `MissingAssetResolver`.
#[derive(Clone, Copy, Default)]
pub struct Evaluator<'a> {
    env: Option<&'a Env>,
    assets: Option<&'a dyn AssetResolver>,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: Option<&'a Env>, assets: Option<&'a dyn AssetResolver>) -> Self {
        Evaluator { env, assets }
    }

    /// No environment, no asset resolution: literals and recognized calls only.
    pub fn bare() -> Self {
        Evaluator::default()
    }

    pub fn with_env(env: &'a Env) -> Self {
        Evaluator {
            env: Some(env),
            assets: None,
        }
    }

    pub fn with_assets(assets: &'a dyn AssetResolver) -> Self {
        Evaluator {
            env: None,
            assets: Some(assets),
        }
    }

    pub fn with_env_and_assets(env: &'a Env, assets: &'a dyn AssetResolver) -> Self {
        Evaluator {
            env: Some(env),
            assets: Some(assets),
        }
    }

    /// Reduce `node` to a concrete value.
    pub fn evaluate(&self, node: &Expr) -> Result<Value, CoreError> {
        match node {
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Double(v) => Ok(Value::Double(*v)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Var { name, index } => self.evaluate_var(name, index.as_deref()),
            Expr::Binary { op, lhs, rhs } => {
                let left = self.evaluate(lhs)?;
                let right = self.evaluate(rhs)?;
                apply_binop(*op, left, right, node)
            }
            Expr::Call(call) => self.evaluate_call(call),
            Expr::AssetRef { kind, id } => {
                let assets = self.assets.ok_or(CoreError::MissingAssetResolver)?;
                if !kind.resolvable() {
                    return Err(CoreError::UnsupportedAssetKind { kind: *kind });
                }
                assets.resolve(*kind, *id).map(Value::Asset)
            }
        }
    }

    fn evaluate_var(&self, name: &str, index: Option<&Expr>) -> Result<Value, CoreError> {
        let unbound = || CoreError::UnboundVariable {
            name: name.to_string(),
        };
        let env = self.env.ok_or_else(unbound)?;
        let binding = env.lookup(name).ok_or_else(unbound)?;

        match (binding, index) {
            (Binding::Scalar(value), None) => Ok(value.clone()),
            (Binding::Seq(values), Some(index)) => {
                let position = self.evaluate(index)?.as_int("array index")?;
                usize::try_from(position)
                    .ok()
                    .and_then(|i| values.get(i))
                    .cloned()
                    .ok_or_else(|| CoreError::IndexOutOfRange {
                        name: name.to_string(),
                        index: position,
                        len: values.len(),
                    })
            }
            // Indexing a scalar, or using a sequence as a scalar, is a shape
            // the decompiler never emits for the scanned patterns.
            (Binding::Scalar(_), Some(index)) => Err(CoreError::UnsupportedNode {
                node: format!("{name}[{}] indexes a scalar binding", index.describe()),
            }),
            (Binding::Seq(_), None) => Err(CoreError::UnsupportedNode {
                node: format!("{name} names a sequence but has no index"),
            }),
        }
    }

    fn evaluate_call(&self, call: &Call) -> Result<Value, CoreError> {
        // Arguments evaluate eagerly, left to right, before dispatch.
        let args = call
            .args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>, _>>()?;

        match call.name.as_str() {
            TEXT_SCRIPT if args.len() <= 1 => Ok(match args.first() {
                // scr_Text("null") marks an intentionally absent text id.
                Some(Value::Str(s)) if s == "null" => Value::Null,
                Some(value) => value.clone(),
                None => Value::Null,
            }),
            TEXT_SCRIPT => Err(CoreError::UnsupportedNode {
                node: format!("{TEXT_SCRIPT} with {} arguments at value position", args.len()),
            }),
            "string" => args.first().cloned().ok_or_else(|| CoreError::ArityMismatch {
                call: call.name.clone(),
                expected: 1,
                found: 0,
            }),
            "string_format" => {
                if args.len() != 3 {
                    return Err(CoreError::ArityMismatch {
                        call: call.name.clone(),
                        expected: 3,
                        found: args.len(),
                    });
                }
                let value = args[0].as_double("string_format value")?;
                let total = args[1].as_int("string_format total width")?;
                let decimals = args[2].as_int("string_format decimal places")?;
                Ok(Value::Str(format_number(value, total, decimals)))
            }
            // Anything else passes through unevaluated; callers that need a
            // concrete value special-case the call before delegating here.
            _ => Ok(Value::Opaque(Box::new(call.clone()))),
        }
    }
}

/// Apply a binary operator to two evaluated operands.
///
/// Integer pairs stay integral except `Div`, which is always floating
/// division. `Add` on two strings concatenates; the scanned source mixes
/// both uses freely.
fn apply_binop(op: BinOp, left: Value, right: Value, node: &Expr) -> Result<Value, CoreError> {
    use Value::{Double, Int, Str};

    match (op, left, right) {
        (BinOp::Add, Str(a), Str(b)) => Ok(Str(a + &b)),

        (BinOp::Add, Int(a), Int(b)) => Ok(Int(a.wrapping_add(b))),
        (BinOp::Sub, Int(a), Int(b)) => Ok(Int(a.wrapping_sub(b))),
        (BinOp::Mul, Int(a), Int(b)) => Ok(Int(a.wrapping_mul(b))),
        (BinOp::Mod, Int(_), Int(0)) | (BinOp::Div, Int(_), Int(0)) => {
            Err(CoreError::DivisionByZero)
        }
        (BinOp::Mod, Int(a), Int(b)) => Ok(Int(a.wrapping_rem(b))),
        (BinOp::Div, Int(a), Int(b)) => Ok(Double(a as f64 / b as f64)),

        (op, a, b) => {
            let (a, b) = match (numeric(&a), numeric(&b)) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(CoreError::UnsupportedNode {
                        node: format!("{op:?} over {a} and {b} in {}", node.describe()),
                    })
                }
            };
            Ok(Double(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
            }))
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Double(v) => Some(*v),
        _ => None,
    }
}

/// Render `value` as a decimal string, zero-padding the integer digits to
/// `total_width` and the fractional digits to `decimal_places`. Digits are
/// never truncated or rounded away.
fn format_number(value: f64, total_width: i64, decimal_places: i64) -> String {
    let rendered = value.to_string();
    let (sign, magnitude) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (int_part, frac_part) = magnitude.split_once('.').unwrap_or((magnitude, ""));

    let int_width = usize::try_from(total_width).unwrap_or(0);
    let frac_width = usize::try_from(decimal_places).unwrap_or(0);

    let int_padded = format!("{int_part:0>int_width$}");
    let frac_padded = format!("{frac_part:0<frac_width$}");

    if frac_padded.is_empty() {
        format!("{sign}{int_padded}")
    } else {
        format!("{sign}{int_padded}.{frac_padded}")
    }
}
