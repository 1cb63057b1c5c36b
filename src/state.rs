use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::warn;

use crate::clients::{FanzaClient, JavbusClient, Translator};
use crate::config::{Config, MappingStore};
use crate::db::Store;
use crate::services::{CatalogService, CatalogSource};

/// Everything a command or request handler needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub config_path: PathBuf,

    pub catalog: Arc<CatalogService>,
}

impl SharedState {
    /// Opens the database at `config.general.database_path` and wires the
    /// live remote clients.
    pub async fn new(config: Config, config_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let timeout = Duration::from_secs(config.general.request_timeout_secs);
        let remote = Arc::new(JavbusClient::new(config.api_base(), timeout)?);

        Self::with_remote(config, config_path, store, remote, timeout)
    }

    /// Like [`SharedState::new`], but with a caller-supplied store and remote
    /// catalog.
    pub fn with_remote(
        config: Config,
        config_path: impl Into<PathBuf>,
        store: Store,
        remote: Arc<dyn CatalogSource>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let config_path = config_path.into();
        let mappings = MappingStore::new(config_path.clone());

        let mut catalog = CatalogService::new(store, remote, mappings, config.cache.clone())
            .with_fanza(FanzaClient::new(timeout)?);

        match Translator::new(config.translation.clone(), timeout) {
            Ok(translator) => catalog = catalog.with_translator(translator),
            Err(e) => warn!(error = %e, "Translator unavailable"),
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            catalog: Arc::new(catalog),
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        self.catalog.store()
    }
}
