//! Render-to-serializable export layer.
//!
//! Records keep their text as templates so the same extraction can render
//! against different translation tables; these structs are the plain-value
//! form produced at export time, one per record kind, serialized with
//! camelCase field names.

use serde::Serialize;

use crate::records::{
    Item, ItemPool, ItemTier, ItemType, LevelWeighting, Perk, PerkAltDescription, PerkPool,
    PerkTier, Supervisor,
};
use crate::translate::TranslationTable;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemExport {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub level: i64,
    pub kind: ItemType,
    pub tier: ItemTier,
    pub pool: ItemPool,
    pub general_effect: Option<String>,
    pub price: i64,
    pub sell_price: i64,
    pub offset_price: i64,
    pub upgrade_id: i64,
    pub main_trigger: Option<String>,
    pub main_trigger_text: Option<String>,
    pub alt_trigger: Option<String>,
    pub alt_trigger_text: Option<String>,
    pub object_name: String,
    pub sprite_name: Option<String>,
    pub level_weighting: LevelWeighting,
}

impl ItemExport {
    pub fn from_record(item: &Item, table: Option<&TranslationTable>) -> Self {
        ItemExport {
            id: item.id,
            name: item.name.render(table),
            description: item.description.render(table),
            level: item.level,
            kind: item.kind,
            tier: item.tier,
            pool: item.pool,
            general_effect: item.general_effect.clone(),
            price: item.price,
            sell_price: item.sell_price(),
            offset_price: item.offset_price,
            upgrade_id: item.upgrade_id,
            main_trigger: item.main_trigger.clone(),
            main_trigger_text: item
                .main_trigger
                .as_ref()
                .map(|_| item.main_trigger_text().render(table)),
            alt_trigger: item.alt_trigger.clone(),
            alt_trigger_text: item
                .alt_trigger
                .as_ref()
                .map(|_| item.alt_trigger_text().render(table)),
            object_name: item.object_name().to_string(),
            sprite_name: item.sprite_name().map(str::to_string),
            level_weighting: item.weighting,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkExport {
    pub id: i64,
    pub name: String,
    pub trigger: String,
    pub trigger_text: String,
    pub tier: PerkTier,
    pub kind: i64,
    pub pool: PerkPool,
    pub effect_color: String,
    pub alt_description: PerkAltDescription,
    pub alt_description_text: Option<String>,
    pub description: String,
    pub object_name: Option<String>,
    pub sprite_name: Option<String>,
}

impl PerkExport {
    pub fn from_record(perk: &Perk, table: Option<&TranslationTable>) -> Self {
        PerkExport {
            id: perk.id,
            name: perk.name.render(table),
            trigger: perk.trigger.clone(),
            trigger_text: perk.trigger_text().render(table),
            tier: perk.tier,
            kind: perk.kind,
            pool: perk.pool,
            effect_color: perk.effect_color.to_string(),
            alt_description: perk.alt_description,
            alt_description_text: perk
                .alt_description_text()
                .map(|template| template.render(table)),
            description: perk.description.render(table),
            object_name: perk.object_name().map(str::to_string),
            sprite_name: perk.sprite_name().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorExport {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cost: i64,
    pub color_one: String,
    pub color_two: String,
    pub sprite_name: Option<String>,
}

impl SupervisorExport {
    pub fn from_record(supervisor: &Supervisor, table: Option<&TranslationTable>) -> Self {
        SupervisorExport {
            id: supervisor.id,
            name: supervisor.name.render(table),
            description: supervisor.description.render(table),
            cost: supervisor.cost,
            color_one: supervisor.color_one.to_string(),
            color_two: supervisor.color_two.to_string(),
            sprite_name: supervisor.sprite_name().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AssetHandle;
    use crate::text::TextTemplate;
    use crate::value::Rgb;

    #[test]
    fn supervisor_export_renders_templates_per_table() {
        let supervisor = Supervisor {
            id: 0,
            name: TextTemplate::from_key(Some("sv_name_0".into())),
            description: TextTemplate::from_key(Some("sv_desc_0".into())),
            sprite: Some(AssetHandle {
                kind: crate::ast::AssetKind::Sprite,
                id: 0,
                name: "spr_Boss".into(),
                sprite: None,
            }),
            cost: 25,
            color_one: Rgb::from_packed(0x112233),
            color_two: Rgb::from_packed(0x445566),
        };

        let table: TranslationTable = [("sv_name_0".to_string(), "The Boss".to_string())]
            .into_iter()
            .collect();

        let export = SupervisorExport::from_record(&supervisor, Some(&table));
        assert_eq!(export.name, "The Boss");
        // No table entry: the key passes through verbatim.
        assert_eq!(export.description, "sv_desc_0");
        assert_eq!(export.color_one, "#112233");
        assert_eq!(export.sprite_name.as_deref(), Some("spr_Boss"));

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["colorOne"], "#112233");
        assert_eq!(json["spriteName"], "spr_Boss");
    }
}
