//! Decompiler boundary — a routine dump loaded from JSON.
//!
//! The external decompiler flattens each top-level routine into an ordered
//! statement sequence and exports them, together with the engine's asset
//! name tables, as one JSON document. The core treats the dump as fully
//! given and never requests re-decompilation.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::Stmt;
use crate::error::CoreError;
use crate::registry::AssetRegistry;

/// Decompiled routines plus the asset registry they reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AstDump {
    pub routines: HashMap<String, Vec<Stmt>>,
    #[serde(default)]
    pub assets: AssetRegistry,
}

impl AstDump {
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// The statement sequence of one routine; a routine this extractor
    /// expects but cannot find is fatal.
    pub fn routine(&self, name: &str) -> Result<&[Stmt], CoreError> {
        self.routines
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::MissingRoutine {
                name: name.to_string(),
            })
    }

    pub fn routine_names(&self) -> impl Iterator<Item = &str> {
        self.routines.keys().map(String::as_str)
    }
}
