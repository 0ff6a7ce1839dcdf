//! Perk records — one flat declaration call each, no cross-record state.

use serde::Serialize;

use crate::ast::{AssetKind, Call, Expr, Stmt};
use crate::error::CoreError;
use crate::eval::Evaluator;
use crate::registry::{AssetHandle, AssetResolver};
use crate::scan::find_calls;
use crate::text::TextTemplate;
use crate::value::Rgb;

/// Declaration call scanned from the perk management routine.
pub const PERK_INIT: &str = "gml_Script_scr_Init_Perk";

const PERK_INIT_ARGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerkTier {
    Unused,
    Common,
    Rare,
    UltraRare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerkPool {
    Unobtainable,
    Capsule,
}

/// Selector for a perk's secondary description block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerkAltDescription {
    None,
    Disable,
}

impl TryFrom<i64> for PerkTier {
    type Error = CoreError;

    fn try_from(v: i64) -> Result<Self, CoreError> {
        match v {
            -1 => Ok(PerkTier::Unused),
            0 => Ok(PerkTier::Common),
            1 => Ok(PerkTier::Rare),
            2 => Ok(PerkTier::UltraRare),
            other => Err(invalid("perk tier", other)),
        }
    }
}

impl TryFrom<i64> for PerkPool {
    type Error = CoreError;

    fn try_from(v: i64) -> Result<Self, CoreError> {
        match v {
            0 => Ok(PerkPool::Unobtainable),
            1 => Ok(PerkPool::Capsule),
            other => Err(invalid("perk pool", other)),
        }
    }
}

impl TryFrom<i64> for PerkAltDescription {
    type Error = CoreError;

    fn try_from(v: i64) -> Result<Self, CoreError> {
        match v {
            0 => Ok(PerkAltDescription::None),
            1 => Ok(PerkAltDescription::Disable),
            other => Err(invalid("perk alt description", other)),
        }
    }
}

fn invalid(field: &'static str, value: i64) -> CoreError {
    CoreError::InvalidField {
        field,
        detail: format!("value {value} has no known meaning"),
    }
}

/// One reconstructed perk.
#[derive(Debug, Clone, PartialEq)]
pub struct Perk {
    pub id: i64,
    pub name: TextTemplate,
    /// Owning object, present only when the declaration references one.
    pub game_object: Option<AssetHandle>,
    pub trigger: String,
    pub tier: PerkTier,
    /// Numeric type slot; the scanned data does not establish its meaning.
    pub kind: i64,
    pub pool: PerkPool,
    pub effect_color: Rgb,
    pub alt_description: PerkAltDescription,
    pub description: TextTemplate,
}

impl Perk {
    pub fn trigger_text(&self) -> TextTemplate {
        TextTemplate::from_key(Some(self.trigger.clone()))
    }

    /// Secondary description template for the selector, from the fixed
    /// raw-token table the perk drawing code uses. Raw tokens translate at
    /// render time like any other key.
    pub fn alt_description_text(&self) -> Option<TextTemplate> {
        match self.alt_description {
            PerkAltDescription::None => None,
            PerkAltDescription::Disable => Some(TextTemplate::from_parts("altdesc_disable", "\n")),
        }
    }

    pub fn object_name(&self) -> Option<&str> {
        self.game_object.as_ref().map(|handle| handle.name.as_str())
    }

    pub fn sprite_name(&self) -> Option<&str> {
        self.game_object
            .as_ref()
            .and_then(|handle| handle.sprite.as_deref())
    }
}

/// Reconstruct every perk declared in `stmts`. Arguments are evaluated
/// independently per call; perk declarations never reference each other.
pub fn build_perks(stmts: &[Stmt], assets: &dyn AssetResolver) -> Result<Vec<Perk>, CoreError> {
    let calls = find_calls(stmts, PERK_INIT);
    let mut perks = Vec::with_capacity(calls.len());

    for call in calls {
        if call.args.len() < PERK_INIT_ARGS {
            return Err(CoreError::ArityMismatch {
                call: call.name.clone(),
                expected: PERK_INIT_ARGS,
                found: call.args.len(),
            });
        }

        let eval = Evaluator::with_assets(assets);

        let id = eval.evaluate(&call.args[0])?.as_int("perk id")?;
        let name = TextTemplate::from_call(expect_call(&call.args[1], "perk name")?)?;

        // The owning object is optional: only an asset-reference argument
        // carries one, anything else means "no object".
        let game_object = match &call.args[2] {
            node @ Expr::AssetRef { .. } => Some(expect_object(eval.evaluate(node)?)?),
            _ => None,
        };

        let trigger = eval.evaluate(&call.args[3])?.as_str("perk trigger")?;
        let tier = PerkTier::try_from(eval.evaluate(&call.args[4])?.as_int("perk tier")?)?;
        let kind = eval.evaluate(&call.args[5])?.as_int("perk type")?;
        let pool = PerkPool::try_from(eval.evaluate(&call.args[6])?.as_int("perk pool")?)?;
        let effect_color = Rgb::from_packed(eval.evaluate(&call.args[7])?.as_int("perk color")?);
        let alt_description =
            PerkAltDescription::try_from(eval.evaluate(&call.args[8])?.as_int("perk alt description")?)?;
        let description = TextTemplate::from_call(expect_call(&call.args[9], "perk description")?)?;

        perks.push(Perk {
            id,
            name,
            game_object,
            trigger,
            tier,
            kind,
            pool,
            effect_color,
            alt_description,
            description,
        });
    }

    Ok(perks)
}

fn expect_call<'a>(expr: &'a Expr, field: &'static str) -> Result<&'a Call, CoreError> {
    match expr {
        Expr::Call(call) => Ok(call),
        other => Err(CoreError::InvalidField {
            field,
            detail: format!("expected a call node, got {}", other.describe()),
        }),
    }
}

fn expect_object(value: crate::value::Value) -> Result<AssetHandle, CoreError> {
    match value {
        crate::value::Value::Asset(handle) if handle.kind == AssetKind::Object => Ok(handle),
        other => Err(CoreError::InvalidField {
            field: "perk object",
            detail: format!("expected a game-object reference, got {other}"),
        }),
    }
}
