//! Asset resolution — the registry boundary the evaluator dispatches into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::AssetKind;
use crate::error::CoreError;

/// Opaque reference to an engine asset, resolved by kind and numeric id.
///
/// `sprite` carries the attached sprite name when the asset is an object;
/// sprite export needs it, nothing else reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHandle {
    pub kind: AssetKind,
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
}

/// Resolves `(kind, id)` pairs into asset handles.
pub trait AssetResolver {
    fn resolve(&self, kind: AssetKind, id: i64) -> Result<AssetHandle, CoreError>;
}

/// An object asset: its name plus the sprite assigned to it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAsset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
}

/// Name tables for every resolvable asset kind, indexed by asset id.
///
/// Objects get their own table because they carry a sprite association;
/// every other kind is a flat `id -> name` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetRegistry {
    #[serde(default)]
    pub objects: Vec<ObjectAsset>,
    #[serde(default)]
    pub names: HashMap<AssetKind, Vec<String>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object asset, returning its id.
    pub fn add_object(&mut self, name: &str, sprite: Option<&str>) -> i64 {
        self.objects.push(ObjectAsset {
            name: name.to_string(),
            sprite: sprite.map(str::to_string),
        });
        self.objects.len() as i64 - 1
    }

    /// Register a non-object asset under `kind`, returning its id.
    pub fn add(&mut self, kind: AssetKind, name: &str) -> i64 {
        let table = self.names.entry(kind).or_default();
        table.push(name.to_string());
        table.len() as i64 - 1
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl AssetResolver for AssetRegistry {
    fn resolve(&self, kind: AssetKind, id: i64) -> Result<AssetHandle, CoreError> {
        let missing = || CoreError::UnknownAsset { kind, id };
        let index = usize::try_from(id).map_err(|_| missing())?;

        if kind == AssetKind::Object {
            let object = self.objects.get(index).ok_or_else(missing)?;
            return Ok(AssetHandle {
                kind,
                id,
                name: object.name.clone(),
                sprite: object.sprite.clone(),
            });
        }

        let name = self
            .names
            .get(&kind)
            .and_then(|table| table.get(index))
            .ok_or_else(missing)?;
        Ok(AssetHandle {
            kind,
            id,
            name: name.clone(),
            sprite: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_objects_with_sprites() {
        let mut registry = AssetRegistry::new();
        let id = registry.add_object("obj_Gumball", Some("spr_Gumball"));
        let handle = registry.resolve(AssetKind::Object, id).unwrap();
        assert_eq!(handle.name, "obj_Gumball");
        assert_eq!(handle.sprite.as_deref(), Some("spr_Gumball"));
    }

    #[test]
    fn resolves_plain_kinds_without_sprites() {
        let mut registry = AssetRegistry::new();
        let id = registry.add(AssetKind::Sprite, "spr_Boss");
        let handle = registry.resolve(AssetKind::Sprite, id).unwrap();
        assert_eq!(handle.name, "spr_Boss");
        assert_eq!(handle.sprite, None);
    }

    #[test]
    fn unknown_ids_are_fatal() {
        let registry = AssetRegistry::new();
        assert!(matches!(
            registry.resolve(AssetKind::Sound, 3),
            Err(CoreError::UnknownAsset { kind: AssetKind::Sound, id: 3 })
        ));
        assert!(matches!(
            registry.resolve(AssetKind::Object, -1),
            Err(CoreError::UnknownAsset { .. })
        ));
    }
}
