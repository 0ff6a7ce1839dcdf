//! Deferred, translation-independent text templates.
//!
//! A template is built once per source call site and rendered zero or more
//! times against different translation tables. Rendering resolves the base
//! key, appends the unlocalized suffix, then substitutes the positional
//! placeholders `{a}`..`{i}` in a single left-to-right pass.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::{BinOp, Call, Expr};
use crate::error::CoreError;
use crate::eval::{Evaluator, TEXT_SCRIPT};
use crate::translate::TranslationTable;
use crate::value::Value;

/// Placeholder letters `a`..`i` cap the argument count at nine.
const MAX_ARGS: usize = 9;

/// A localizable string: translation key, verbatim suffix, positional args.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextTemplate {
    base_key: Option<String>,
    suffix: Option<String>,
    args: Vec<Value>,
}

impl TextTemplate {
    /// Template for a bare translation key (no suffix, no arguments).
    pub fn from_key(key: Option<String>) -> Self {
        TextTemplate {
            base_key: key,
            suffix: None,
            args: Vec::new(),
        }
    }

    /// Template from a fixed raw pair, used by the modifier
    /// alternate-description table.
    pub fn from_parts(base_key: &str, suffix: &str) -> Self {
        TextTemplate {
            base_key: Some(base_key.to_string()),
            suffix: Some(suffix.to_string()),
            args: Vec::new(),
        }
    }

    /// Build a template from a text-producing call site.
    ///
    /// Two shapes exist in the decompiled source: a direct
    /// `scr_Text(id, args...)` call, and a `string(f(scr_Text(...) + lit))`
    /// wrapper whose right operand becomes the verbatim suffix.
    pub fn from_call(call: &Call) -> Result<Self, CoreError> {
        match call.name.as_str() {
            TEXT_SCRIPT => Self::from_text_call(call),
            "string" => Self::from_string_wrapper(call),
            other => Err(CoreError::UnsupportedNode {
                node: format!("{other}(...) is not a text-producing call"),
            }),
        }
    }

    fn from_text_call(call: &Call) -> Result<Self, CoreError> {
        let first = call.args.first().ok_or_else(|| CoreError::ArityMismatch {
            call: call.name.clone(),
            expected: 1,
            found: 0,
        })?;

        let eval = Evaluator::bare();
        let base_key = eval.evaluate(first)?.as_opt_str("text id")?;

        let args = call.args[1..]
            .iter()
            .map(|arg| eval.evaluate(arg))
            .collect::<Result<Vec<_>, _>>()?;
        if args.len() > MAX_ARGS {
            return Err(CoreError::UnsupportedNode {
                node: format!("{TEXT_SCRIPT} with {} positional arguments", args.len()),
            });
        }

        Ok(TextTemplate {
            base_key,
            suffix: None,
            args,
        })
    }

    fn from_string_wrapper(call: &Call) -> Result<Self, CoreError> {
        let unsupported = || CoreError::UnsupportedNode {
            node: format!("string(...) wrapper shape: {}", Expr::Call(call.clone()).describe()),
        };

        let Some(Expr::Call(inner)) = call.args.first() else {
            return Err(unsupported());
        };
        let Some(Expr::Binary { op: BinOp::Add, lhs, rhs }) = inner.args.first() else {
            return Err(unsupported());
        };

        let eval = Evaluator::bare();
        let suffix = eval.evaluate(rhs)?.as_str("text suffix")?;

        match lhs.as_ref() {
            Expr::Call(text_call) if text_call.name == TEXT_SCRIPT => {
                let mut template = Self::from_text_call(text_call)?;
                template.suffix = Some(suffix);
                Ok(template)
            }
            // A non-text call on the left keeps only the suffix.
            Expr::Call(_) => Ok(TextTemplate {
                base_key: None,
                suffix: Some(suffix),
                args: Vec::new(),
            }),
            _ => Err(unsupported()),
        }
    }

    pub fn base_key(&self) -> Option<&str> {
        self.base_key.as_deref()
    }

    /// Render against a translation table.
    ///
    /// Without a table this produces the diagnostic form
    /// `scr_Text(<base>,<suffix>,<args>)` used for logging, never for
    /// user-facing output. With a table, the base key resolves by exact
    /// match and passes through verbatim on a miss.
    pub fn render(&self, table: Option<&TranslationTable>) -> String {
        let Some(table) = table else {
            let args: Vec<String> = self.args.iter().map(|arg| arg.to_string()).collect();
            return format!(
                "scr_Text({},{},{})",
                self.base_key.as_deref().unwrap_or(""),
                self.suffix.as_deref().unwrap_or(""),
                args.join(",")
            );
        };

        let mut content = match &self.base_key {
            Some(key) => table.lookup(key).unwrap_or(key).to_string(),
            None => String::new(),
        };
        if let Some(suffix) = &self.suffix {
            content.push_str(suffix);
        }
        substitute(&content, &self.args)
    }
}

/// Replace `{a}`..`{i}` placeholders in one pass over `content`.
///
/// Substituted argument text is never re-scanned, so an argument containing
/// a placeholder token cannot be re-matched by a later position.
fn substitute(content: &str, args: &[Value]) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' && i + 2 < chars.len() && chars[i + 2] == '}' {
            let letter = chars[i + 1];
            if ('a'..='i').contains(&letter) {
                let position = letter as usize - 'a' as usize;
                if let Some(arg) = args.get(position) {
                    out.push_str(&arg.to_string());
                    i += 3;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

lazy_static! {
    /// Embedded sprite reference in rendered text: `[sprite_name,frame]`.
    static ref SPRITE_REF: Regex = Regex::new(r"\[([A-Za-z0-9_]*),[0-9]+\]").unwrap();
}

/// Sprite names referenced from rendered description text, in order of
/// appearance. Used to widen the sprite-export set beyond record sprites.
pub fn embedded_sprite_refs(text: &str) -> Vec<String> {
    SPRITE_REF
        .captures_iter(text)
        .map(|capture| capture[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> TranslationTable {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn text_call(args: Vec<Expr>) -> Call {
        Call {
            name: TEXT_SCRIPT.into(),
            args,
        }
    }

    /// `greet` + `["Cobalt"]` against `{greet: "Hello {a}!"}` is
    /// `Hello Cobalt!`.
    #[test]
    fn renders_translated_base_with_argument() {
        let template = TextTemplate::from_call(&text_call(vec![
            Expr::Str("greet".into()),
            Expr::Str("Cobalt".into()),
        ]))
        .unwrap();
        let table = table(&[("greet", "Hello {a}!")]);
        assert_eq!(template.render(Some(&table)), "Hello Cobalt!");
    }

    /// With no table entry the base key passes through verbatim; since
    /// `greet` carries no placeholder, the argument has nothing to fill.
    #[test]
    fn missing_key_passes_through() {
        let template = TextTemplate::from_call(&text_call(vec![
            Expr::Str("greet".into()),
            Expr::Str("Cobalt".into()),
        ]))
        .unwrap();
        let empty = TranslationTable::new();
        assert_eq!(template.render(Some(&empty)), "greet");
    }

    #[test]
    fn absent_base_key_renders_only_the_suffix() {
        let template = TextTemplate {
            base_key: None,
            suffix: Some("+2".into()),
            args: vec![],
        };
        let empty = TranslationTable::new();
        assert_eq!(template.render(Some(&empty)), "+2");
    }

    /// Placeholders substitute positionally: `{a}` is argument 0, `{b}` is
    /// argument 1, and every occurrence of a token is replaced.
    #[test]
    fn positional_substitution() {
        let template = TextTemplate::from_call(&text_call(vec![
            Expr::Str("fmt".into()),
            Expr::Int(3),
            Expr::Str("coins".into()),
        ]))
        .unwrap();
        let table = table(&[("fmt", "{a} {b}, again {a}")]);
        assert_eq!(template.render(Some(&table)), "3 coins, again 3");
    }

    /// An argument whose text contains a placeholder token is not
    /// re-matched by a later substitution.
    #[test]
    fn substituted_text_is_not_rescanned() {
        let template = TextTemplate::from_call(&text_call(vec![
            Expr::Str("fmt".into()),
            Expr::Str("{b}".into()),
            Expr::Str("second".into()),
        ]))
        .unwrap();
        let table = table(&[("fmt", "{a} then {b}")]);
        assert_eq!(template.render(Some(&table)), "{b} then second");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let template = TextTemplate::from_key(Some("fmt".into()));
        let table = table(&[("fmt", "{a} {z} {j}")]);
        assert_eq!(template.render(Some(&table)), "{a} {z} {j}");
    }

    /// Without a table the diagnostic form appears, never a translation.
    #[test]
    fn debug_rendering_without_table() {
        let template = TextTemplate::from_call(&text_call(vec![
            Expr::Str("greet".into()),
            Expr::Str("Cobalt".into()),
        ]))
        .unwrap();
        assert_eq!(template.render(None), "scr_Text(greet,,Cobalt)");
    }

    /// The `string(f(scr_Text(id, n) + "%"))` wrapper yields base, argument
    /// and verbatim suffix.
    #[test]
    fn string_wrapper_extracts_suffix() {
        let inner_text = Expr::Call(text_call(vec![Expr::Str("buff_pct".into()), Expr::Int(20)]));
        let concat = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(inner_text),
            rhs: Box::new(Expr::Str("%".into())),
        };
        let wrapper = Call {
            name: "string".into(),
            args: vec![Expr::Call(Call {
                name: TEXT_SCRIPT.into(),
                args: vec![concat],
            })],
        };

        let template = TextTemplate::from_call(&wrapper).unwrap();
        let table = table(&[("buff_pct", "Gain {a}")]);
        assert_eq!(template.render(Some(&table)), "Gain 20%");
    }

    #[test]
    fn ten_positional_arguments_are_rejected() {
        let mut args = vec![Expr::Str("key".into())];
        args.extend((0..10).map(Expr::Int));
        assert!(matches!(
            TextTemplate::from_call(&text_call(args)),
            Err(CoreError::UnsupportedNode { .. })
        ));
    }

    #[test]
    fn sprite_refs_in_rendered_text() {
        let refs = embedded_sprite_refs("Gain [spr_Coin,0] and later [spr_Gem,12].");
        assert_eq!(refs, vec!["spr_Coin", "spr_Gem"]);
        assert!(embedded_sprite_refs("no refs here").is_empty());
    }
}
