use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod mappings;

pub use mappings::MappingStore;

/// Environment variable naming the config document.
pub const CONFIG_ENV: &str = "JAVSHELF_CONFIG";

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "API_URL";

/// The application configuration document.
///
/// The same JSON file also carries the normalizer's mapping tables, which are
/// owned by [`MappingStore`]; saving a `Config` never touches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    /// Base URL of the remote catalog API, e.g. `http://localhost:8922/api`.
    pub api_url: String,

    pub watch_url_prefix: String,

    pub translation: TranslationConfig,

    pub server: ServerConfig,

    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,

    /// Per-request timeout for remote calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/javshelf.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub api_url: String,

    pub source_lang: String,

    pub target_lang: String,

    /// Not required for a local Ollama endpoint.
    pub api_token: String,

    pub model: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.siliconflow.cn/v1/chat/completions".to_string(),
            source_lang: "日语".to_string(),
            target_lang: "中文".to_string(),
            api_token: String::new(),
            model: "THUDM/glm-4-9b-chat".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

/// Cache lifetimes, in days, and list sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub actor_max_age_days: u32,

    /// Freshness of an actor's cached movie listing.
    pub actor_movies_max_age_days: u32,

    pub movie_max_age_days: u32,

    pub purge_actor_after_days: u32,

    pub purge_movie_after_days: u32,

    pub recent_movies: u64,

    pub history_size: u64,

    /// Upper bound on remote listing pages walked per request.
    pub max_pages: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            actor_max_age_days: 7,
            actor_movies_max_age_days: 30,
            movie_max_age_days: 30,
            purge_actor_after_days: 30,
            purge_movie_after_days: 90,
            recent_movies: 4,
            history_size: 10,
            max_pages: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            api_url: "http://localhost:8922/api".to_string(),
            watch_url_prefix: "https://missav.ai".to_string(),
            translation: TranslationConfig::default(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load from the first existing candidate path, or defaults.
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::resolve_path(None))
    }

    /// Defaults (plus environment overrides) when `path` does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading config from: {}", path.display());
            return Self::load_from_path(path);
        }

        info!("No config file found at {}, using defaults", path.display());
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            info!("Using API URL from environment: {url}");
            self.api_url = url.trim().to_string();
        }
    }

    /// Writes this config's sections into the document at `path`, keeping
    /// every other top-level key (mapping tables included) as it was.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let mut document = read_document(path)?;

        let Value::Object(sections) = serde_json::to_value(self)? else {
            anyhow::bail!("Config did not serialize to an object");
        };
        for (key, value) in sections {
            document.insert(key, value);
        }

        write_document(path, &document)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// `explicit`, then `$JAVSHELF_CONFIG`, then the first existing
    /// well-known location, else `config/config.json`.
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.trim().is_empty()
        {
            return PathBuf::from(path);
        }

        Self::config_paths()
            .into_iter()
            .find(|p| p.exists())
            .unwrap_or_else(Self::default_config_path)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path(), PathBuf::from("config.json")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("javshelf").join("config.json"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config").join("config.json")
    }

    /// Returns `true` if a new file was written.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }

    /// `api_url` without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }

    #[must_use]
    pub fn watch_url(&self, movie_id: &str) -> String {
        format!(
            "{}/{}",
            self.watch_url_prefix.trim().trim_end_matches('/'),
            movie_id.trim()
        )
    }
}

/// The whole JSON document at `path` as an object. A missing file is an
/// empty document.
pub(crate) fn read_document(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Config file is not a JSON object: {}", path.display()),
    }
}

pub(crate) fn write_document(path: &Path, document: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(document)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("javshelf-config-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.actor_max_age_days, 7);
        assert_eq!(config.cache.actor_movies_max_age_days, 30);
        assert_eq!(config.cache.purge_movie_after_days, 90);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{
            "api_url": "http://10.0.0.2:8922/api/",
            "general": {"log_level": "debug"},
            "cache": {"max_pages": 2}
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.cache.max_pages, 2);
        assert_eq!(config.cache.movie_max_age_days, 30);
        assert_eq!(config.api_base(), "http://10.0.0.2:8922/api");
        assert_eq!(config.translation.model, "THUDM/glm-4-9b-chat");
    }

    #[test]
    fn test_watch_url() {
        let config = Config {
            watch_url_prefix: "https://example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.watch_url(" ABP-123 "), "https://example.com/ABP-123");
    }

    #[test]
    fn test_validate_rejects_empty_api_url() {
        let config = Config {
            api_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_preserves_sibling_keys() {
        let path = temp_path("config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"fanza_mappings": {"abp": "118abp"}, "custom": 1, "watch_url_prefix": "old"}"#,
        )
        .unwrap();

        let config = Config {
            watch_url_prefix: "https://example.com".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let document = read_document(&path).unwrap();
        assert_eq!(document["fanza_mappings"]["abp"], "118abp");
        assert_eq!(document["custom"], 1);
        assert_eq!(document["watch_url_prefix"], "https://example.com");
        // Original keys keep their position.
        assert_eq!(document.keys().next().map(String::as_str), Some("fanza_mappings"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_create_default_if_missing() {
        let path = temp_path("nested/config.json");
        assert!(Config::create_default_if_missing(&path).unwrap());
        assert!(!Config::create_default_if_missing(&path).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.port, 8080);

        std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap()).ok();
    }
}
