//! Typed record builders over scanned call sites and assignments.

pub mod item;
pub mod perk;
pub mod supervisor;

pub use item::{build_items, Item, ItemPool, ItemTier, ItemType, LevelWeighting, PriceTable};
pub use perk::{build_perks, Perk, PerkAltDescription, PerkPool, PerkTier};
pub use supervisor::{build_supervisors, Supervisor};
