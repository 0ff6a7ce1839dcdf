//! Item records — reconstructed from paired init/init-ext call sequences.
//!
//! The item management routine declares every item through
//! `scr_Init_Item` (14 positional arguments) and immediately-parallel
//! `scr_Init_ItemExt` calls (the same id plus three appearance weights).
//! The two sequences are correlated by position: extended call `i` must
//! carry the id of primary call `i`, and a mismatch aborts the scan.
//!
//! Later item declarations reference fields of earlier ones through
//! indexed variables (`ItemTier[12]`, `GeneralEffect[40]`, ...), so the
//! builder threads an accumulating history of already-built records into
//! each evaluation.

use serde::Serialize;

use crate::ast::{AssetKind, Call, Expr, Stmt};
use crate::error::CoreError;
use crate::eval::{Env, Evaluator};
use crate::registry::{AssetHandle, AssetResolver};
use crate::scan::find_calls;
use crate::text::TextTemplate;
use crate::value::Value;

/// Primary declaration call scanned from the item management routine.
pub const ITEM_INIT: &str = "gml_Script_scr_Init_Item";
/// Extended declaration call carrying the appearance weights.
pub const ITEM_INIT_EXT: &str = "gml_Script_scr_Init_ItemExt";

const ITEM_INIT_ARGS: usize = 14;
const ITEM_INIT_EXT_ARGS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemType {
    Item,
    UpgradedItem,
    CorruptedItem,
    UpgradedCorruptedItem,
    Food,
    UpgradedFood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemTier {
    Common,
    Rare,
    UltraRare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemPool {
    Unobtainable,
    Shop,
    BlackMarket,
    Cafe,
}

impl TryFrom<i64> for ItemType {
    type Error = CoreError;

    fn try_from(v: i64) -> Result<Self, CoreError> {
        match v {
            0 => Ok(ItemType::Item),
            1 => Ok(ItemType::UpgradedItem),
            2 => Ok(ItemType::CorruptedItem),
            3 => Ok(ItemType::UpgradedCorruptedItem),
            4 => Ok(ItemType::Food),
            5 => Ok(ItemType::UpgradedFood),
            other => Err(invalid("item type", other)),
        }
    }
}

impl TryFrom<i64> for ItemTier {
    type Error = CoreError;

    fn try_from(v: i64) -> Result<Self, CoreError> {
        match v {
            0 => Ok(ItemTier::Common),
            1 => Ok(ItemTier::Rare),
            2 => Ok(ItemTier::UltraRare),
            other => Err(invalid("item tier", other)),
        }
    }
}

impl TryFrom<i64> for ItemPool {
    type Error = CoreError;

    fn try_from(v: i64) -> Result<Self, CoreError> {
        match v {
            0 => Ok(ItemPool::Unobtainable),
            1 => Ok(ItemPool::Shop),
            2 => Ok(ItemPool::BlackMarket),
            3 => Ok(ItemPool::Cafe),
            other => Err(invalid("item pool", other)),
        }
    }
}

fn invalid(field: &'static str, value: i64) -> CoreError {
    CoreError::InvalidField {
        field,
        detail: format!("value {value} has no known meaning"),
    }
}

/// Appearance weights per game-progression band.
///
/// Early game is rounds <= 10, mid is 11..=50, late is everything after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelWeighting {
    pub early: i64,
    pub mid: i64,
    pub late: i64,
}

/// Base shop prices per tier, threaded into the builder rather than read
/// from a process-wide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTable {
    pub common: i64,
    pub rare: i64,
    pub ultra_rare: i64,
}

impl Default for PriceTable {
    fn default() -> Self {
        PriceTable {
            common: 5,
            rare: 10,
            ultra_rare: 10,
        }
    }
}

impl PriceTable {
    pub fn base(&self, tier: ItemTier) -> i64 {
        match tier {
            ItemTier::Common => self.common,
            ItemTier::Rare => self.rare,
            ItemTier::UltraRare => self.ultra_rare,
        }
    }
}

/// One reconstructed item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: TextTemplate,
    pub description: TextTemplate,
    pub level: i64,
    pub kind: ItemType,
    pub tier: ItemTier,
    pub pool: ItemPool,
    pub general_effect: Option<String>,
    /// Final shop price: the tier's base price plus the declared offset.
    pub price: i64,
    pub offset_price: i64,
    pub upgrade_id: i64,
    pub main_trigger: Option<String>,
    pub alt_trigger: Option<String>,
    pub weighting: LevelWeighting,
    pub game_object: AssetHandle,
}

impl Item {
    /// Half the shop price, rounded to the nearest coin.
    pub fn sell_price(&self) -> i64 {
        (self.price as f64 / 2.0).round() as i64
    }

    pub fn main_trigger_text(&self) -> TextTemplate {
        TextTemplate::from_key(self.main_trigger.clone())
    }

    pub fn alt_trigger_text(&self) -> TextTemplate {
        TextTemplate::from_key(self.alt_trigger.clone())
    }

    pub fn object_name(&self) -> &str {
        &self.game_object.name
    }

    pub fn sprite_name(&self) -> Option<&str> {
        self.game_object.sprite.as_deref()
    }
}

/// Fields of already-built records that later declarations may reference,
/// as named running sequences. Pushed after each record completes, so the
/// record at position `n` sees exactly positions `0..n`.
#[derive(Debug, Clone, Default)]
struct ItemHistory {
    types: Vec<i64>,
    tiers: Vec<i64>,
    effects: Vec<Option<String>>,
    offset_prices: Vec<i64>,
    alt_triggers: Vec<Option<String>>,
}

impl ItemHistory {
    fn push(
        &mut self,
        kind: i64,
        tier: i64,
        effect: Option<String>,
        offset_price: i64,
        alt_trigger: Option<String>,
    ) {
        self.types.push(kind);
        self.tiers.push(tier);
        self.effects.push(effect);
        self.offset_prices.push(offset_price);
        self.alt_triggers.push(alt_trigger);
    }

    /// Environment for the next declaration: the running sequences under
    /// the variable names the decompiled source uses, plus the two base
    /// price constants.
    fn to_env(&self, prices: &PriceTable) -> Env {
        let ints = |values: &[i64]| values.iter().copied().map(Value::Int).collect();
        let strings = |values: &[Option<String>]| {
            values
                .iter()
                .map(|v| v.clone().map(Value::Str).unwrap_or(Value::Null))
                .collect()
        };

        let mut env = Env::new();
        env.bind_scalar("PriceCOMN", Value::Int(prices.common));
        env.bind_scalar("PriceRARE", Value::Int(prices.rare));
        env.bind_seq("ItemType", ints(&self.types));
        env.bind_seq("ItemTier", ints(&self.tiers));
        env.bind_seq("GeneralEffect", strings(&self.effects));
        env.bind_seq("OffsetPrice", ints(&self.offset_prices));
        env.bind_seq("MutantTrig", strings(&self.alt_triggers));
        env
    }
}

/// Reconstruct every item declared in `stmts`.
pub fn build_items(
    stmts: &[Stmt],
    assets: &dyn AssetResolver,
    prices: &PriceTable,
) -> Result<Vec<Item>, CoreError> {
    let primary = find_calls(stmts, ITEM_INIT);
    let extended = find_calls(stmts, ITEM_INIT_EXT);

    let mut history = ItemHistory::default();
    let mut items = Vec::with_capacity(primary.len());

    for (position, call) in primary.iter().enumerate() {
        check_arity(call, ITEM_INIT_ARGS)?;

        let env = history.to_env(prices);
        let eval = Evaluator::with_env_and_assets(&env, assets);

        let id = eval.evaluate(&call.args[0])?.as_int("item id")?;
        let name = TextTemplate::from_call(expect_call(&call.args[1], "item name")?)?;
        let game_object = expect_object(eval.evaluate(&call.args[2])?, "item object")?;
        let level = eval.evaluate(&call.args[3])?.as_int("item level")?;
        let kind_raw = eval.evaluate(&call.args[4])?.as_int("item type")?;
        let tier_raw = eval.evaluate(&call.args[5])?.as_int("item tier")?;
        // Reserved slot: evaluated to keep argument-position parity with the
        // call signature, value intentionally discarded.
        let _reserved = eval.evaluate(&call.args[6])?.as_int("reserved slot")?;
        let general_effect = eval.evaluate(&call.args[7])?.as_opt_str("general effect")?;
        let pool_raw = eval.evaluate(&call.args[8])?.as_int("item pool")?;
        let offset_price = eval.evaluate(&call.args[9])?.as_int("offset price")?;
        let upgrade_id = eval.evaluate(&call.args[10])?.as_int("upgrade id")?;
        let main_trigger = eval.evaluate(&call.args[11])?.as_opt_str("main trigger")?;
        let alt_trigger = eval.evaluate(&call.args[12])?.as_opt_str("alt trigger")?;
        let description = TextTemplate::from_call(expect_call(&call.args[13], "item description")?)?;

        let weighting = correlate_extended(&extended, position, id)?;

        let kind = ItemType::try_from(kind_raw)?;
        let tier = ItemTier::try_from(tier_raw)?;
        let pool = ItemPool::try_from(pool_raw)?;

        items.push(Item {
            id,
            name,
            description,
            level,
            kind,
            tier,
            pool,
            general_effect: general_effect.clone(),
            price: prices.base(tier) + offset_price,
            offset_price,
            upgrade_id,
            main_trigger,
            alt_trigger: alt_trigger.clone(),
            weighting,
            game_object,
        });

        history.push(kind_raw, tier_raw, general_effect, offset_price, alt_trigger);
    }

    Ok(items)
}

/// Fetch the extended call at the primary call's position and verify its
/// leading id. The positional-correlation assumption is load-bearing; any
/// mismatch is fatal rather than skipped.
fn correlate_extended(
    extended: &[&Call],
    position: usize,
    id: i64,
) -> Result<LevelWeighting, CoreError> {
    let call = extended
        .get(position)
        .ok_or(CoreError::MissingExtendedCall { position, id })?;
    check_arity(call, ITEM_INIT_EXT_ARGS)?;

    // Re-evaluated independently of the accumulating environment.
    let eval = Evaluator::bare();
    let found = eval.evaluate(&call.args[0])?.as_int("extended item id")?;
    if found != id {
        return Err(CoreError::CorrelationMismatch {
            position,
            expected: id,
            found,
        });
    }

    Ok(LevelWeighting {
        early: eval.evaluate(&call.args[1])?.as_int("early weight")?,
        mid: eval.evaluate(&call.args[2])?.as_int("mid weight")?,
        late: eval.evaluate(&call.args[3])?.as_int("late weight")?,
    })
}

fn check_arity(call: &Call, expected: usize) -> Result<(), CoreError> {
    if call.args.len() < expected {
        return Err(CoreError::ArityMismatch {
            call: call.name.clone(),
            expected,
            found: call.args.len(),
        });
    }
    Ok(())
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

fn expect_object(value: Value, field: &'static str) -> Result<AssetHandle, CoreError> {
    match value {
        Value::Asset(handle) if handle.kind == AssetKind::Object => Ok(handle),
        other => Err(CoreError::InvalidField {
            field,
            detail: format!("expected a game-object reference, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::eval::TEXT_SCRIPT;
    use crate::registry::AssetRegistry;

    fn text(id: &str) -> Expr {
        Expr::Call(Call {
            name: TEXT_SCRIPT.into(),
            args: vec![Expr::Str(id.into())],
        })
    }

    fn init_call(id: i64, object: i64, tier: i64, offset_price: i64) -> Stmt {
        Stmt::Expr(Expr::Call(Call {
            name: ITEM_INIT.into(),
            args: vec![
                Expr::Int(id),
                text("itm_name"),
                Expr::AssetRef {
                    kind: AssetKind::Object,
                    id: object,
                },
                Expr::Int(1),
                Expr::Int(0),
                Expr::Int(tier),
                Expr::Int(0),
                Expr::Str("zap".into()),
                Expr::Int(1),
                Expr::Int(offset_price),
                Expr::Int(-1),
                Expr::Str("trg_main".into()),
                Expr::Str("trg_alt".into()),
                text("itm_desc"),
            ],
        }))
    }

    fn ext_call(id: i64) -> Stmt {
        Stmt::Expr(Expr::Call(Call {
            name: ITEM_INIT_EXT.into(),
            args: vec![Expr::Int(id), Expr::Int(10), Expr::Int(5), Expr::Int(1)],
        }))
    }

    fn registry(objects: usize) -> AssetRegistry {
        let mut registry = AssetRegistry::new();
        for i in 0..objects {
            registry.add_object(&format!("obj_Item{i}"), Some(&format!("spr_Item{i}")));
        }
        registry
    }

    /// Equal-length correlated sequences yield one record per primary call.
    #[test]
    fn builds_one_record_per_primary_call() {
        let stmts = vec![
            init_call(0, 0, 0, 2),
            init_call(1, 1, 1, 0),
            ext_call(0),
            ext_call(1),
        ];
        let items = build_items(&stmts, &registry(2), &PriceTable::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 0);
        assert_eq!(items[0].weighting, LevelWeighting { early: 10, mid: 5, late: 1 });
        assert_eq!(items[1].tier, ItemTier::Rare);
        assert_eq!(items[1].object_name(), "obj_Item1");
    }

    /// Base price plus offset, sell price rounded from half.
    #[test]
    fn price_derives_from_tier_base() {
        let stmts = vec![init_call(0, 0, 0, 2), ext_call(0)];
        let items = build_items(&stmts, &registry(1), &PriceTable::default()).unwrap();
        // Common base 5 + offset 2.
        assert_eq!(items[0].price, 7);
        assert_eq!(items[0].sell_price(), 4);
    }

    /// A later declaration can reference an earlier record's fields through
    /// the accumulating environment.
    #[test]
    fn later_records_see_earlier_fields() {
        let mut second = init_call(1, 1, 0, 0);
        if let Stmt::Expr(Expr::Call(call)) = &mut second {
            // Tier copied from record 0, price offset = PriceRARE + 1.
            call.args[5] = Expr::Var {
                name: "ItemTier".into(),
                index: Some(Box::new(Expr::Int(0))),
            };
            call.args[9] = Expr::Binary {
                op: BinOp::Add,
                lhs: Box::new(Expr::Var {
                    name: "PriceRARE".into(),
                    index: None,
                }),
                rhs: Box::new(Expr::Int(1)),
            };
        }
        let stmts = vec![init_call(0, 0, 2, 0), second, ext_call(0), ext_call(1)];
        let items = build_items(&stmts, &registry(2), &PriceTable::default()).unwrap();
        assert_eq!(items[1].tier, ItemTier::UltraRare);
        assert_eq!(items[1].offset_price, 11);
    }

    /// The first record must not see any history.
    #[test]
    fn first_record_sees_empty_history() {
        let mut first = init_call(0, 0, 0, 0);
        if let Stmt::Expr(Expr::Call(call)) = &mut first {
            call.args[5] = Expr::Var {
                name: "ItemTier".into(),
                index: Some(Box::new(Expr::Int(0))),
            };
        }
        let stmts = vec![first, ext_call(0)];
        let err = build_items(&stmts, &registry(1), &PriceTable::default()).unwrap_err();
        assert!(matches!(err, CoreError::IndexOutOfRange { index: 0, len: 0, .. }));
    }

    /// Perturbing one extended id trips the correlation check at exactly
    /// that position, not earlier.
    #[test]
    fn correlation_mismatch_points_at_the_perturbed_position() {
        let stmts = vec![
            init_call(0, 0, 0, 0),
            init_call(1, 1, 0, 0),
            init_call(2, 2, 0, 0),
            ext_call(0),
            ext_call(99),
            ext_call(2),
        ];
        let err = build_items(&stmts, &registry(3), &PriceTable::default()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CorrelationMismatch {
                position: 1,
                expected: 1,
                found: 99
            }
        ));
    }

    #[test]
    fn missing_extended_call_is_fatal() {
        let stmts = vec![init_call(0, 0, 0, 0), init_call(1, 1, 0, 0), ext_call(0)];
        let err = build_items(&stmts, &registry(2), &PriceTable::default()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingExtendedCall { position: 1, id: 1 }
        ));
    }

    #[test]
    fn no_calls_no_records() {
        let items = build_items(&[], &registry(0), &PriceTable::default()).unwrap();
        assert!(items.is_empty());
    }
}
