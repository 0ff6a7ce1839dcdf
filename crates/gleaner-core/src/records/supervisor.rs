//! Supervisor records — aggregated from scattered indexed assignments.
//!
//! The supervisor management routine fills six parallel arrays
//! (`SuperVisorName[n] = ...`, `SVCost[n] = ...`, ...) instead of calling a
//! declaration script. The builder keys every matching assignment by its
//! evaluated index and emits one record per key once all six fields are
//! present. A key missing any field aborts the whole scan: a record that
//! defines only some of them means the routine no longer matches this
//! layout, and partial output would be misleading.

use std::collections::BTreeMap;

use crate::ast::{AssetKind, Expr, Stmt};
use crate::error::CoreError;
use crate::eval::Evaluator;
use crate::registry::{AssetHandle, AssetResolver};
use crate::scan::find_assignments;
use crate::text::TextTemplate;
use crate::value::{Rgb, Value};

/// The six recognized field arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Sprite,
    ColorOne,
    ColorTwo,
    Cost,
}

impl Field {
    fn from_variable(name: &str) -> Option<Self> {
        match name {
            "SuperVisorName" => Some(Field::Name),
            "SuperVisorDesc" => Some(Field::Description),
            "SVSprite" => Some(Field::Sprite),
            "SuperVisorCol1" => Some(Field::ColorOne),
            "SuperVisorCol2" => Some(Field::ColorTwo),
            "SVCost" => Some(Field::Cost),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Field::Name => "SuperVisorName",
            Field::Description => "SuperVisorDesc",
            Field::Sprite => "SVSprite",
            Field::ColorOne => "SuperVisorCol1",
            Field::ColorTwo => "SuperVisorCol2",
            Field::Cost => "SVCost",
        }
    }
}

/// One reconstructed supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct Supervisor {
    pub id: i64,
    pub name: TextTemplate,
    pub description: TextTemplate,
    pub sprite: Option<AssetHandle>,
    pub cost: i64,
    pub color_one: Rgb,
    pub color_two: Rgb,
}

impl Supervisor {
    pub fn sprite_name(&self) -> Option<&str> {
        self.sprite.as_ref().map(|handle| handle.name.as_str())
    }
}

#[derive(Debug, Default)]
struct PartialSupervisor {
    name: Option<Value>,
    description: Option<Value>,
    sprite: Option<Value>,
    color_one: Option<Value>,
    color_two: Option<Value>,
    cost: Option<Value>,
}

impl PartialSupervisor {
    fn set(&mut self, field: Field, value: Value) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Sprite => &mut self.sprite,
            Field::ColorOne => &mut self.color_one,
            Field::ColorTwo => &mut self.color_two,
            Field::Cost => &mut self.cost,
        };
        // Last write wins, matching source order.
        *slot = Some(value);
    }

    fn take(&mut self, field: Field, id: i64) -> Result<Value, CoreError> {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Sprite => &mut self.sprite,
            Field::ColorOne => &mut self.color_one,
            Field::ColorTwo => &mut self.color_two,
            Field::Cost => &mut self.cost,
        };
        slot.take().ok_or(CoreError::IncompleteAggregate {
            id,
            field: field.as_str(),
        })
    }
}

/// Reconstruct every supervisor assigned in `stmts`, in ascending id order.
pub fn build_supervisors(
    stmts: &[Stmt],
    assets: &dyn AssetResolver,
) -> Result<Vec<Supervisor>, CoreError> {
    let eval = Evaluator::with_assets(assets);
    let mut table: BTreeMap<i64, PartialSupervisor> = BTreeMap::new();

    for (target, value) in find_assignments(stmts) {
        let Expr::Var {
            name,
            index: Some(index),
        } = target
        else {
            continue;
        };
        let Some(field) = Field::from_variable(name) else {
            continue;
        };

        let id = eval.evaluate(index)?.as_int("supervisor index")?;
        let evaluated = eval.evaluate(value)?;
        table.entry(id).or_default().set(field, evaluated);
    }

    let mut supervisors = Vec::with_capacity(table.len());
    for (id, mut partial) in table {
        let name = partial.take(Field::Name, id)?.as_opt_str("supervisor name")?;
        let description = partial
            .take(Field::Description, id)?
            .as_opt_str("supervisor description")?;
        let sprite = expect_sprite(partial.take(Field::Sprite, id)?)?;
        let color_one = Rgb::from_packed(
            partial.take(Field::ColorOne, id)?.as_int("supervisor color one")?,
        );
        let color_two = Rgb::from_packed(
            partial.take(Field::ColorTwo, id)?.as_int("supervisor color two")?,
        );
        let cost = partial.take(Field::Cost, id)?.as_int("supervisor cost")?;

        supervisors.push(Supervisor {
            id,
            name: TextTemplate::from_key(name),
            description: TextTemplate::from_key(description),
            sprite,
            cost,
            color_one,
            color_two,
        });
    }

    Ok(supervisors)
}

fn expect_sprite(value: Value) -> Result<Option<AssetHandle>, CoreError> {
    match value {
        Value::Asset(handle) if handle.kind == AssetKind::Sprite => Ok(Some(handle)),
        Value::Null => Ok(None),
        other => Err(CoreError::InvalidField {
            field: "supervisor sprite",
            detail: format!("expected a sprite reference, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AssetRegistry;

    fn assign(name: &str, index: i64, value: Expr) -> Stmt {
        Stmt::Assign {
            target: Expr::Var {
                name: name.into(),
                index: Some(Box::new(Expr::Int(index))),
            },
            value,
        }
    }

    fn full_record(index: i64, sprite_id: i64, cost: i64) -> Vec<Stmt> {
        vec![
            assign("SuperVisorName", index, Expr::Str(format!("sv_name_{index}"))),
            assign("SuperVisorDesc", index, Expr::Str(format!("sv_desc_{index}"))),
            assign(
                "SVSprite",
                index,
                Expr::AssetRef {
                    kind: AssetKind::Sprite,
                    id: sprite_id,
                },
            ),
            assign("SuperVisorCol1", index, Expr::Int(0x102030)),
            assign("SuperVisorCol2", index, Expr::Int(0x405060)),
            assign("SVCost", index, Expr::Int(cost)),
        ]
    }

    fn registry() -> AssetRegistry {
        let mut registry = AssetRegistry::new();
        registry.add(AssetKind::Sprite, "spr_Boss0");
        registry.add(AssetKind::Sprite, "spr_Boss1");
        registry
    }

    /// Assignments may interleave arbitrarily; records key by index.
    #[test]
    fn aggregates_interleaved_assignments() {
        let mut stmts = Vec::new();
        let first = full_record(0, 0, 25);
        let second = full_record(1, 1, 40);
        for (a, b) in first.into_iter().zip(second) {
            stmts.push(b);
            stmts.push(a);
        }

        let supervisors = build_supervisors(&stmts, &registry()).unwrap();
        assert_eq!(supervisors.len(), 2);
        assert_eq!(supervisors[0].id, 0);
        assert_eq!(supervisors[0].cost, 25);
        assert_eq!(supervisors[0].sprite_name(), Some("spr_Boss0"));
        assert_eq!(supervisors[1].id, 1);
        assert_eq!(supervisors[1].color_one, Rgb { r: 0x10, g: 0x20, b: 0x30 });
    }

    /// A key covering only five of the six fields aborts the whole scan.
    #[test]
    fn incomplete_record_aborts_the_scan() {
        let mut stmts = full_record(0, 0, 25);
        let mut second = full_record(1, 1, 40);
        second.retain(|stmt| {
            !matches!(stmt, Stmt::Assign { target: Expr::Var { name, .. }, .. } if name == "SVCost")
        });
        stmts.extend(second);

        let err = build_supervisors(&stmts, &registry()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::IncompleteAggregate { id: 1, field: "SVCost" }
        ));
    }

    /// Unrecognized arrays and unindexed assignments are ignored.
    #[test]
    fn unrelated_assignments_are_skipped() {
        let mut stmts = full_record(0, 0, 25);
        stmts.push(assign("SomethingElse", 0, Expr::Int(1)));
        stmts.push(Stmt::Assign {
            target: Expr::Var {
                name: "SVCost".into(),
                index: None,
            },
            value: Expr::Int(99),
        });

        let supervisors = build_supervisors(&stmts, &registry()).unwrap();
        assert_eq!(supervisors.len(), 1);
        assert_eq!(supervisors[0].cost, 25);
    }

    /// A later assignment to the same slot replaces the earlier one.
    #[test]
    fn last_write_wins_per_slot() {
        let mut stmts = full_record(0, 0, 25);
        stmts.push(assign("SVCost", 0, Expr::Int(60)));

        let supervisors = build_supervisors(&stmts, &registry()).unwrap();
        assert_eq!(supervisors[0].cost, 60);
    }
}
