//! Persistence for the normalizer's prefix and suffix tables.
//!
//! Both tables live as top-level objects (`fanza_mappings`, `fanza_suffixes`)
//! inside the application config document. Older installs kept the prefix
//! table in a standalone `fanza_mappings.json`; it is pulled in once, the
//! first time the document has no `fanza_mappings` key.

use super::{read_document, write_document};
use crate::parser::IdMappings;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const PREFIX_KEY: &str = "fanza_mappings";
pub const SUFFIX_KEY: &str = "fanza_suffixes";
pub const LEGACY_FILE_NAME: &str = "fanza_mappings.json";

#[derive(Debug, Clone)]
pub struct MappingStore {
    config_path: PathBuf,
    legacy_path: PathBuf,
}

impl MappingStore {
    /// Looks for the legacy file next to the config document.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let legacy_path = config_path
            .parent()
            .map_or_else(|| PathBuf::from(LEGACY_FILE_NAME), |p| p.join(LEGACY_FILE_NAME));
        Self {
            config_path,
            legacy_path,
        }
    }

    #[must_use]
    pub fn with_legacy_path(mut self, legacy_path: impl Into<PathBuf>) -> Self {
        self.legacy_path = legacy_path.into();
        self
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Never fails: any error is logged and yields empty tables.
    #[must_use]
    pub fn load(&self) -> IdMappings {
        match self.try_load() {
            Ok(mappings) => mappings,
            Err(e) => {
                error!(path = %self.config_path.display(), error = %e, "Failed to load id mappings");
                IdMappings::default()
            }
        }
    }

    fn try_load(&self) -> Result<IdMappings> {
        let document = read_document(&self.config_path)?;
        let suffixes = table(&document, SUFFIX_KEY);

        if document.contains_key(PREFIX_KEY) {
            return Ok(IdMappings::new(table(&document, PREFIX_KEY), suffixes));
        }

        if !self.legacy_path.exists() {
            return Ok(IdMappings::new(Vec::new(), suffixes));
        }

        let legacy = self.read_legacy()?;
        let mappings = IdMappings::new(legacy, suffixes);
        info!(
            from = %self.legacy_path.display(),
            entries = mappings.prefixes.len(),
            "Migrating legacy prefix mappings into config document"
        );
        if !self.save(&mappings) {
            warn!("Legacy mappings loaded but could not be persisted; migration will retry");
        }
        Ok(mappings)
    }

    fn read_legacy(&self) -> Result<Vec<(String, String)>> {
        let content = std::fs::read_to_string(&self.legacy_path).with_context(|| {
            format!("Failed to read legacy mappings: {}", self.legacy_path.display())
        })?;
        let value: Value = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse legacy mappings: {}", self.legacy_path.display())
        })?;

        let Value::Object(map) = value else {
            anyhow::bail!("Legacy mappings are not a JSON object");
        };
        Ok(string_entries(&map))
    }

    /// Writes both tables, keys sorted case-insensitively, leaving every
    /// other key of the document untouched. Returns `false` on failure.
    pub fn save(&self, mappings: &IdMappings) -> bool {
        match self.try_save(mappings) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %self.config_path.display(), error = %e, "Failed to save id mappings");
                false
            }
        }
    }

    fn try_save(&self, mappings: &IdMappings) -> Result<()> {
        let mut document = read_document(&self.config_path)?;
        document.insert(PREFIX_KEY.to_string(), sorted_object(&mappings.prefixes));
        document.insert(SUFFIX_KEY.to_string(), sorted_object(&mappings.suffixes));
        write_document(&self.config_path, &document)?;

        info!(
            prefixes = mappings.prefixes.len(),
            suffixes = mappings.suffixes.len(),
            "Id mappings saved"
        );
        Ok(())
    }
}

fn table(document: &Map<String, Value>, key: &str) -> Vec<(String, String)> {
    match document.get(key) {
        Some(Value::Object(map)) => string_entries(map),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            warn!(key, "Mapping table is not an object, ignoring");
            Vec::new()
        }
    }
}

fn string_entries(map: &Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
        .collect()
}

fn sorted_object(table: &BTreeMap<String, String>) -> Value {
    let mut entries: Vec<(&String, &String)> = table.iter().collect();
    entries.sort_by_key(|(k, _)| k.to_lowercase());

    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_object_orders_case_insensitively() {
        let mut table = BTreeMap::new();
        table.insert("b".to_string(), "2".to_string());
        table.insert("A".to_string(), "1".to_string());
        table.insert("c".to_string(), "3".to_string());

        let Value::Object(map) = sorted_object(&table) else {
            panic!("expected object");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "b", "c"]);
    }

    #[test]
    fn test_table_ignores_non_string_values() {
        let document: Map<String, Value> =
            serde_json::from_str(r#"{"fanza_mappings": {"abp": "118abp", "bad": 3}}"#).unwrap();
        assert_eq!(
            table(&document, PREFIX_KEY),
            vec![("abp".to_string(), "118abp".to_string())]
        );
        assert!(table(&document, SUFFIX_KEY).is_empty());
    }

    #[test]
    fn test_missing_everything_is_empty() {
        let dir = std::env::temp_dir().join(format!("javshelf-map-{}", uuid::Uuid::new_v4()));
        let store = MappingStore::new(dir.join("config.json"));
        assert!(store.load().is_empty());
        assert!(!dir.join("config.json").exists());
    }
}
