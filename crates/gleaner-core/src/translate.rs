//! Translation table — exact-match key/value lookups loaded from CSV.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::CoreError;

/// Exact-match `key -> translated string` mapping.
///
/// A missing key is never an error; renderers fall back to the key itself.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. The first occurrence of a key wins, matching the
    /// behavior of the game's own localization loader.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from a headerless two-column CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self, CoreError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load from headerless two-column CSV data. Rows with fewer than two
    /// columns are skipped rather than rejected; the localization file
    /// carries the occasional ragged line.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = TranslationTable::new();
        for record in csv_reader.records() {
            let record = record?;
            if let (Some(key), Some(value)) = (record.get(0), record.get(1)) {
                table.insert(key, value);
            }
        }
        Ok(table)
    }
}

impl FromIterator<(String, String)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = TranslationTable::new();
        for (key, value) in iter {
            table.insert(&key, &value);
        }
        table
    }
}
