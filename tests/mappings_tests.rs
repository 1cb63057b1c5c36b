use javshelf::config::{Config, MappingStore};
use javshelf::parser::{IdMappings, IdNormalizer};
use serde_json::Value;
use std::path::{Path, PathBuf};

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("javshelf-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_legacy_file_is_migrated_once() {
    let dir = TempDir::new();
    let config_path = dir.path("config.json");
    let legacy_path = dir.path("fanza_mappings.json");

    std::fs::write(&config_path, r#"{"api_url": "http://example:8922/api"}"#).unwrap();
    std::fs::write(&legacy_path, r#"{"ABP": "118abp", "mxgs": "h_068mxgs"}"#).unwrap();

    let store = MappingStore::new(&config_path);
    let mappings = store.load();
    assert_eq!(mappings.prefixes.get("abp").map(String::as_str), Some("118abp"));
    assert_eq!(mappings.prefixes.len(), 2);

    let document = read_json(&config_path);
    assert_eq!(document["api_url"], "http://example:8922/api");
    assert_eq!(document["fanza_mappings"]["abp"], "118abp");
    assert!(document["fanza_suffixes"].is_object());

    // Once the key exists the legacy file is no longer consulted.
    std::fs::write(&legacy_path, r#"{"zzz": "999zzz"}"#).unwrap();
    let reloaded = store.load();
    assert_eq!(reloaded, mappings);
    assert!(!reloaded.prefixes.contains_key("zzz"));
}

#[test]
fn test_no_legacy_file_yields_suffixes_only() {
    let dir = TempDir::new();
    let config_path = dir.path("config.json");
    std::fs::write(&config_path, r#"{"fanza_suffixes": {"abc": "so"}}"#).unwrap();

    let mappings = MappingStore::new(&config_path).load();
    assert!(mappings.prefixes.is_empty());
    assert_eq!(mappings.suffixes.get("abc").map(String::as_str), Some("so"));
}

#[test]
fn test_corrupt_document_degrades_to_empty() {
    let dir = TempDir::new();
    let config_path = dir.path("config.json");
    std::fs::write(&config_path, "{not json").unwrap();

    let store = MappingStore::new(&config_path);
    assert!(store.load().is_empty());
    assert!(!store.save(&IdMappings::default()));
}

#[test]
fn test_save_sorts_and_preserves_siblings() {
    let dir = TempDir::new();
    let config_path = dir.path("config.json");
    std::fs::write(&config_path, r#"{"watch_url_prefix": "https://x", "custom": [1, 2]}"#)
        .unwrap();

    let store = MappingStore::new(&config_path);
    let mappings = IdMappings::new(
        pairs(&[("mxgs", "h_068mxgs"), ("ABP", "118abp"), ("dvdes", "dvdes")]),
        pairs(&[("abc", "so")]),
    );
    assert!(store.save(&mappings));

    let document = read_json(&config_path);
    assert_eq!(document["watch_url_prefix"], "https://x");
    assert_eq!(document["custom"][1], 2);

    let keys: Vec<&str> = document["fanza_mappings"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["abp", "dvdes", "mxgs"]);
    assert_eq!(store.load(), mappings);
}

#[test]
fn test_config_save_keeps_mapping_tables() {
    let dir = TempDir::new();
    let config_path = dir.path("config.json");

    let store = MappingStore::new(&config_path);
    assert!(store.save(&IdMappings::new(pairs(&[("abp", "118abp")]), Vec::new())));

    let mut config = Config::load_or_default(&config_path).unwrap();
    config.watch_url_prefix = "https://mirror.example".to_string();
    config.save_to_path(&config_path).unwrap();

    let mappings = store.load();
    assert_eq!(mappings.prefixes.get("abp").map(String::as_str), Some("118abp"));
    assert_eq!(
        Config::load_from_path(&config_path).unwrap().watch_url_prefix,
        "https://mirror.example"
    );
}

#[test]
fn test_loaded_tables_drive_normalizer() {
    let dir = TempDir::new();
    let config_path = dir.path("config.json");
    std::fs::write(
        &config_path,
        r#"{"fanza_mappings": {"abp": "118abp"}, "fanza_suffixes": {"abp": "r"}}"#,
    )
    .unwrap();

    let normalizer = IdNormalizer::new(MappingStore::new(&config_path).load());
    assert_eq!(normalizer.normalize("ABP-12"), "118abp012r");
    assert_eq!(normalizer.normalize("SSIS-1"), "ssis00001");
}
