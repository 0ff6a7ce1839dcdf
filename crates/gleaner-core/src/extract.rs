//! Full-extraction orchestrator: all three record kinds from one dump.

use std::collections::HashSet;

use crate::dump::AstDump;
use crate::error::CoreError;
use crate::records::{
    build_items, build_perks, build_supervisors, Item, Perk, PriceTable, Supervisor,
};
use crate::text::embedded_sprite_refs;
use crate::translate::TranslationTable;

/// Management-object create events holding the declaration sequences.
pub const ITEM_ROUTINE: &str = "gml_Object_obj_ItemMGMT_Create_0";
pub const PERK_ROUTINE: &str = "gml_Object_obj_PerkMGMT_Create_0";
pub const SUPERVISOR_ROUTINE: &str = "gml_Object_obj_SupervisorMGMT_Create_0";

/// Every record reconstructed from one dump.
///
/// Builders run sequentially and fail fast; there is no partial result.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub items: Vec<Item>,
    pub perks: Vec<Perk>,
    pub supervisors: Vec<Supervisor>,
}

impl Extraction {
    pub fn run(dump: &AstDump) -> Result<Self, CoreError> {
        Self::run_with_prices(dump, &PriceTable::default())
    }

    pub fn run_with_prices(dump: &AstDump, prices: &PriceTable) -> Result<Self, CoreError> {
        let items = build_items(dump.routine(ITEM_ROUTINE)?, &dump.assets, prices)?;
        let perks = build_perks(dump.routine(PERK_ROUTINE)?, &dump.assets)?;
        let supervisors = build_supervisors(dump.routine(SUPERVISOR_ROUTINE)?, &dump.assets)?;
        Ok(Extraction {
            items,
            perks,
            supervisors,
        })
    }

    /// Sprite names the export collaborator should render: every record's
    /// own sprite plus every sprite referenced from rendered description
    /// text, first occurrence first, deduplicated.
    pub fn sprite_exports(&self, table: Option<&TranslationTable>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut push = |name: &str| {
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        };

        for supervisor in &self.supervisors {
            if let Some(sprite) = supervisor.sprite_name() {
                push(sprite);
            }
            for reference in embedded_sprite_refs(&supervisor.description.render(table)) {
                push(&reference);
            }
        }
        for item in &self.items {
            if let Some(sprite) = item.sprite_name() {
                push(sprite);
            }
            for reference in embedded_sprite_refs(&item.description.render(table)) {
                push(&reference);
            }
        }
        for perk in &self.perks {
            if let Some(sprite) = perk.sprite_name() {
                push(sprite);
            }
            for reference in embedded_sprite_refs(&perk.description.render(table)) {
                push(&reference);
            }
        }

        names
    }
}
