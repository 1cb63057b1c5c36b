use crate::models::{Actor, Movie};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub mod clock;
pub mod migrator;
pub mod repositories;

pub use clock::{Clock, ManualClock, SystemClock};
pub use repositories::maintenance::PurgeReport;

/// The local catalog cache.
///
/// Every public operation is a failure boundary: storage errors are logged
/// and turned into `false`, `None` or an empty list, so an unavailable cache
/// degrades to "always miss" instead of failing the caller.
///
/// The pool hands each concurrent task its own connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            clock: Arc::new(SystemClock),
        })
    }

    /// Single-connection in-memory store. Every pooled connection to
    /// `:memory:` would get its own empty database.
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_options("sqlite::memory:", 1, 1).await
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn actor_repo(&self) -> repositories::actor::ActorRepository {
        repositories::actor::ActorRepository::new(self.conn.clone())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::search_history::SearchHistoryRepository {
        repositories::search_history::SearchHistoryRepository::new(self.conn.clone())
    }

    fn maintenance_repo(&self) -> repositories::maintenance::MaintenanceRepository {
        repositories::maintenance::MaintenanceRepository::new(self.conn.clone())
    }

    fn cutoff(&self, max_age_days: u32) -> i64 {
        clock::freshness_cutoff(self.now(), max_age_days)
    }

    pub async fn save_actor(&self, actor: &Actor) -> bool {
        if !actor.has_id() {
            warn!("Refusing to cache actor without id");
            return false;
        }
        match self.actor_repo().upsert(actor, self.now()).await {
            Ok(()) => true,
            Err(e) => {
                error!(actor_id = %actor.id, error = %e, "Failed to save actor");
                false
            }
        }
    }

    /// `None` when absent or older than `max_age_days`; the two are
    /// deliberately indistinguishable.
    pub async fn get_actor(&self, id: &str, max_age_days: u32) -> Option<Actor> {
        self.actor_repo()
            .get_fresh(id, self.cutoff(max_age_days))
            .await
            .unwrap_or_else(|e| {
                error!(actor_id = id, error = %e, "Failed to read actor");
                None
            })
    }

    pub async fn search_actors(&self, keyword: &str, max_age_days: u32) -> Vec<Actor> {
        self.actor_repo()
            .search_by_name(keyword, self.cutoff(max_age_days))
            .await
            .unwrap_or_else(|e| {
                error!(keyword, error = %e, "Failed to search actors");
                Vec::new()
            })
    }

    pub async fn save_movie(&self, movie: &Movie) -> bool {
        if !movie.has_id() {
            warn!("Refusing to cache movie without id");
            return false;
        }
        match self.movie_repo().upsert(movie, self.now()).await {
            Ok(()) => true,
            Err(e) => {
                error!(movie_id = %movie.id, error = %e, "Failed to save movie");
                false
            }
        }
    }

    pub async fn get_movie(&self, id: &str, max_age_days: u32) -> Option<Movie> {
        self.movie_repo()
            .get_fresh(id, self.cutoff(max_age_days))
            .await
            .unwrap_or_else(|e| {
                error!(movie_id = id, error = %e, "Failed to read movie");
                None
            })
    }

    pub async fn get_actor_movies(&self, actor_id: &str, max_age_days: u32) -> Vec<Movie> {
        self.movie_repo()
            .list_for_actor(actor_id, self.cutoff(max_age_days))
            .await
            .unwrap_or_else(|e| {
                error!(actor_id, error = %e, "Failed to list actor movies");
                Vec::new()
            })
    }

    pub async fn recent_movies(&self, limit: u64) -> Vec<Movie> {
        self.movie_repo().recent(limit).await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list recent movies");
            Vec::new()
        })
    }

    /// `false` if the movie is not cached or the write failed.
    pub async fn update_movie_translation(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> bool {
        self.movie_repo()
            .update_translation(id, title, description)
            .await
            .unwrap_or_else(|e| {
                error!(movie_id = id, error = %e, "Failed to save translation");
                false
            })
    }

    pub async fn save_search_history(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }
        match self.history_repo().record(keyword, self.now()).await {
            Ok(()) => true,
            Err(e) => {
                error!(keyword, error = %e, "Failed to save search history");
                false
            }
        }
    }

    pub async fn search_history(&self, limit: u64) -> Vec<String> {
        self.history_repo().recent(limit).await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to read search history");
            Vec::new()
        })
    }

    /// Number of movies orphaned and removed, or `None` on storage failure.
    pub async fn delete_actor_cascade(&self, actor_id: &str) -> Option<u64> {
        match self.maintenance_repo().delete_actor_cascade(actor_id).await {
            Ok(removed) => {
                info!(actor_id, orphaned_movies = removed, "Actor removed from cache");
                Some(removed)
            }
            Err(e) => {
                error!(actor_id, error = %e, "Failed to delete actor");
                None
            }
        }
    }

    pub async fn purge_expired(
        &self,
        actor_ttl_days: u32,
        movie_ttl_days: u32,
    ) -> Option<PurgeReport> {
        let result = self
            .maintenance_repo()
            .purge_expired(self.cutoff(actor_ttl_days), self.cutoff(movie_ttl_days))
            .await;

        match result {
            Ok(report) => {
                info!(
                    actors = report.actors,
                    movies = report.movies,
                    associations = report.associations,
                    "Expired cache entries purged"
                );
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Failed to purge expired cache entries");
                None
            }
        }
    }
}
