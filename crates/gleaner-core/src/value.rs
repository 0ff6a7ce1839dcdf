//! Runtime values produced by the expression evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Call;
use crate::error::CoreError;
use crate::registry::AssetHandle;

/// A concrete value reduced from an expression.
///
/// Only the evaluator constructs these. `Opaque` carries an unrecognized
/// call node through unevaluated; callers that need a concrete value from
/// such a call must special-case it before delegating to the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    Str(String),
    Asset(AssetHandle),
    Opaque(Box<Call>),
}

impl Value {
    /// Integer view. `Double` truncates; the scanned scripts intermix both
    /// numeric shapes for integral fields.
    pub fn as_int(&self, field: &'static str) -> Result<i64, CoreError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Double(v) => Ok(*v as i64),
            other => Err(CoreError::InvalidField {
                field,
                detail: format!("expected an integer, got {other}"),
            }),
        }
    }

    /// Float view over either numeric variant.
    pub fn as_double(&self, field: &'static str) -> Result<f64, CoreError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Double(v) => Ok(*v),
            other => Err(CoreError::InvalidField {
                field,
                detail: format!("expected a number, got {other}"),
            }),
        }
    }

    /// String view; `Null` maps to `None`.
    pub fn as_opt_str(&self, field: &'static str) -> Result<Option<String>, CoreError> {
        match self {
            Value::Str(s) => Ok(Some(s.clone())),
            Value::Null => Ok(None),
            other => Err(CoreError::InvalidField {
                field,
                detail: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Required string view.
    pub fn as_str(&self, field: &'static str) -> Result<String, CoreError> {
        self.as_opt_str(field)?.ok_or_else(|| CoreError::InvalidField {
            field,
            detail: "expected a string, got null".into(),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Asset(handle) => write!(f, "{}", handle.name),
            Value::Opaque(call) => write!(f, "{}(...)", call.name),
        }
    }
}

/// An unpacked 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Unpack `0xRRGGBB`: red from bits 16..24, green from 8..16, blue from 0..8.
    pub fn from_packed(v: i64) -> Self {
        Rgb {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `0xAABBCC` decomposes to red `0xAA`, green `0xBB`, blue `0xCC`.
    #[test]
    fn packed_color_unpacks_by_byte() {
        let c = Rgb::from_packed(0xAABBCC);
        assert_eq!(c, Rgb { r: 0xAA, g: 0xBB, b: 0xCC });
        assert_eq!(c.to_string(), "#AABBCC");
    }

    #[test]
    fn int_view_truncates_doubles() {
        assert_eq!(Value::Double(2.9).as_int("x").unwrap(), 2);
        assert_eq!(Value::Int(7).as_int("x").unwrap(), 7);
        assert!(Value::Str("7".into()).as_int("x").is_err());
    }

    #[test]
    fn null_is_an_absent_string() {
        assert_eq!(Value::Null.as_opt_str("x").unwrap(), None);
        assert!(Value::Null.as_str("x").is_err());
        assert_eq!(
            Value::Str("ok".into()).as_opt_str("x").unwrap().as_deref(),
            Some("ok")
        );
    }
}
