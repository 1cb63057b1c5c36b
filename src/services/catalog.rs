//! Cache-then-remote orchestration.
//!
//! Every read checks the [`Store`] first and only falls through to the remote
//! catalog on a miss or a stale record. Whatever the remote returns is written
//! back before it is handed to the caller. Remote failures are logged and
//! treated as "no data".

use crate::clients::{FanzaClient, JavbusClient, MovieSummary, TranslateError, Translator};
use crate::config::{CacheConfig, MappingStore};
use crate::db::{PurgeReport, Store};
use crate::models::{Actor, Movie, MovieCard, MoviePage};
use crate::parser::{CandidateUrls, IdMappings, IdNormalizer};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// The remote catalog, as far as the service needs it.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn get_star(&self, star_id: &str) -> Result<Option<Actor>>;

    async fn get_movie(&self, movie_id: &str) -> Result<Option<Movie>>;

    async fn search_movies(&self, keyword: &str, page: u32) -> Result<Option<MoviePage>>;

    async fn star_movies(&self, star_id: &str, page: u32) -> Result<Option<MoviePage>>;

    async fn check_connection(&self) -> bool;
}

#[async_trait::async_trait]
impl CatalogSource for JavbusClient {
    async fn get_star(&self, star_id: &str) -> Result<Option<Actor>> {
        Self::get_star(self, star_id).await
    }

    async fn get_movie(&self, movie_id: &str) -> Result<Option<Movie>> {
        Self::get_movie(self, movie_id).await
    }

    async fn search_movies(&self, keyword: &str, page: u32) -> Result<Option<MoviePage>> {
        Self::search_movies(self, keyword, page).await
    }

    async fn star_movies(&self, star_id: &str, page: u32) -> Result<Option<MoviePage>> {
        Self::star_movies(self, star_id, page).await
    }

    async fn check_connection(&self) -> bool {
        Self::check_connection(self).await
    }
}

/// A raw code together with its normalized form and candidate pages.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedId {
    pub raw: String,
    pub normalized: String,
    pub urls: Vec<String>,
}

fn record_cache(entity: &'static str, hit: bool) {
    if hit {
        metrics::counter!("catalog_cache_hits_total", "entity" => entity).increment(1);
    } else {
        metrics::counter!("catalog_cache_misses_total", "entity" => entity).increment(1);
    }
}

pub struct CatalogService {
    store: Store,
    remote: Arc<dyn CatalogSource>,
    fanza: Option<FanzaClient>,
    translator: Option<Translator>,
    normalizer: RwLock<IdNormalizer>,
    candidates: CandidateUrls,
    mappings: MappingStore,
    cache: CacheConfig,
}

impl CatalogService {
    /// Loads the mapping tables from `mappings` (migrating a legacy file if
    /// one is found).
    pub fn new(
        store: Store,
        remote: Arc<dyn CatalogSource>,
        mappings: MappingStore,
        cache: CacheConfig,
    ) -> Self {
        let normalizer = IdNormalizer::new(mappings.load());
        info!(
            prefixes = normalizer.mappings().prefixes.len(),
            suffixes = normalizer.mappings().suffixes.len(),
            "Id mappings loaded"
        );

        Self {
            store,
            remote,
            fanza: None,
            translator: None,
            normalizer: RwLock::new(normalizer),
            candidates: CandidateUrls::default(),
            mappings,
            cache,
        }
    }

    #[must_use]
    pub fn with_fanza(mut self, fanza: FanzaClient) -> Self {
        self.fanza = Some(fanza);
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn cache_settings(&self) -> &CacheConfig {
        &self.cache
    }

    pub async fn remote_available(&self) -> bool {
        self.remote.check_connection().await
    }

    pub async fn actor(&self, id: &str) -> Option<Actor> {
        if let Some(actor) = self.store.get_actor(id, self.cache.actor_max_age_days).await {
            record_cache("actor", true);
            debug!(actor_id = id, "Actor served from cache");
            return Some(actor);
        }
        record_cache("actor", false);

        let actor = match self.remote.get_star(id).await {
            Ok(Some(actor)) if actor.has_id() => actor,
            Ok(_) => {
                debug!(actor_id = id, "Actor not found remotely");
                return None;
            }
            Err(e) => {
                warn!(actor_id = id, error = %e, "Failed to fetch actor");
                return None;
            }
        };

        self.store.save_actor(&actor).await;
        Some(actor)
    }

    pub async fn movie(&self, id: &str) -> Option<Movie> {
        if let Some(movie) = self.store.get_movie(id, self.cache.movie_max_age_days).await {
            record_cache("movie", true);
            debug!(movie_id = id, "Movie served from cache");
            return Some(movie);
        }
        record_cache("movie", false);

        let movie = match self.remote.get_movie(id).await {
            Ok(Some(movie)) if movie.has_id() => movie,
            Ok(_) => {
                debug!(movie_id = id, "Movie not found remotely");
                return None;
            }
            Err(e) => {
                warn!(movie_id = id, error = %e, "Failed to fetch movie");
                return None;
            }
        };

        self.store.save_movie(&movie).await;
        Some(movie)
    }

    /// The movie plus a cached profile for each credited actor.
    pub async fn movie_with_cast(&self, id: &str) -> Option<(Movie, Vec<Actor>)> {
        let movie = self.movie(id).await?;

        let lookups = movie.star_ids().map(|star_id| self.actor(star_id));
        let cast = futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .collect();

        Some((movie, cast))
    }

    /// An actor's movies: the fresh cached listing, or up to `max_pages`
    /// remote pages with every movie fetched in full.
    pub async fn actor_movies(&self, actor_id: &str, max_pages: Option<u32>) -> Vec<Movie> {
        let cached = self
            .store
            .get_actor_movies(actor_id, self.cache.actor_movies_max_age_days)
            .await;
        if !cached.is_empty() {
            record_cache("actor_movies", true);
            return cached;
        }
        record_cache("actor_movies", false);

        let max_pages = max_pages.unwrap_or(self.cache.max_pages).max(1);
        let mut movies = Vec::new();

        for page in 1..=max_pages {
            let listing = match self.remote.star_movies(actor_id, page).await {
                Ok(Some(listing)) => listing,
                Ok(None) => break,
                Err(e) => {
                    warn!(actor_id, page, error = %e, "Failed to fetch actor listing page");
                    continue;
                }
            };

            if listing.movies.is_empty() {
                break;
            }

            movies.extend(self.expand_cards(&listing.movies).await);

            if !listing.pagination.has_next_page {
                break;
            }
        }

        info!(actor_id, count = movies.len(), "Actor movies fetched remotely");
        movies
    }

    /// Actors whose name contains `keyword`. Cached matches win; otherwise
    /// the movie search is walked and matching credited actors are collected.
    pub async fn search_actors(&self, keyword: &str, max_pages: Option<u32>) -> Vec<Actor> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }

        self.store.save_search_history(keyword).await;

        let cached = self
            .store
            .search_actors(keyword, self.cache.actor_max_age_days)
            .await;
        if !cached.is_empty() {
            record_cache("actor_search", true);
            return cached;
        }
        record_cache("actor_search", false);

        let needle = keyword.to_lowercase();
        let max_pages = max_pages.unwrap_or(1).max(1);
        let mut seen = HashSet::new();
        let mut actors = Vec::new();

        for page in 1..=max_pages {
            let listing = match self.remote.search_movies(keyword, page).await {
                Ok(Some(listing)) => listing,
                Ok(None) => break,
                Err(e) => {
                    warn!(keyword, page, error = %e, "Failed to fetch search page");
                    continue;
                }
            };

            if listing.movies.is_empty() {
                break;
            }

            for movie in self.expand_cards(&listing.movies).await {
                for star in &movie.stars {
                    let star_id = star.id.trim();
                    if star_id.is_empty()
                        || !star.name.to_lowercase().contains(&needle)
                        || !seen.insert(star_id.to_string())
                    {
                        continue;
                    }
                    if let Some(actor) = self.actor(star_id).await {
                        actors.push(actor);
                    }
                }
            }
        }

        info!(keyword, count = actors.len(), "Actor search finished");
        actors
    }

    /// Remote movie search; not cached, but recorded in the history.
    pub async fn search_movies(&self, keyword: &str, page: u32) -> Option<MoviePage> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return None;
        }

        self.store.save_search_history(keyword).await;

        match self.remote.search_movies(keyword, page.max(1)).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(keyword, page, error = %e, "Movie search failed");
                None
            }
        }
    }

    async fn expand_cards(&self, cards: &[MovieCard]) -> Vec<Movie> {
        let mut movies = Vec::with_capacity(cards.len());
        for card in cards.iter().filter(|c| !c.id.trim().is_empty()) {
            if let Some(movie) = self.movie(&card.id).await {
                movies.push(movie);
            }
        }
        movies
    }

    pub async fn resolve_id(&self, raw: &str) -> ResolvedId {
        let normalizer = self.normalizer.read().await;
        let normalized = normalizer.normalize(raw);
        let urls = self.candidates.generate(&normalizer, raw, Some(&normalized));
        ResolvedId {
            raw: raw.to_string(),
            normalized,
            urls,
        }
    }

    /// Scrapes the detail site for a summary of `movie_id`.
    pub async fn summary(&self, movie_id: &str) -> Option<MovieSummary> {
        let Some(fanza) = &self.fanza else {
            warn!("Summary requested but no detail site client is configured");
            return None;
        };

        let resolved = self.resolve_id(movie_id).await;
        info!(movie_id, normalized = %resolved.normalized, "Looking up summary");
        fanza
            .fetch_summary(movie_id, &resolved.normalized, &resolved.urls)
            .await
    }

    pub async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let Some(translator) = &self.translator else {
            return Err(TranslateError::NotConfigured);
        };
        translator.translate(text).await
    }

    /// Stores translated fields on the cached movie without refetching it or
    /// extending its freshness. `false` if the movie is not cached.
    pub async fn save_translation(
        &self,
        movie_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> bool {
        self.store
            .update_movie_translation(movie_id, title, description)
            .await
    }

    pub async fn forget_actor(&self, actor_id: &str) -> Option<u64> {
        self.store.delete_actor_cascade(actor_id).await
    }

    pub async fn purge(&self) -> Option<PurgeReport> {
        self.store
            .purge_expired(
                self.cache.purge_actor_after_days,
                self.cache.purge_movie_after_days,
            )
            .await
    }

    pub async fn recent_movies(&self) -> Vec<Movie> {
        self.store.recent_movies(self.cache.recent_movies).await
    }

    pub async fn search_history(&self, limit: Option<u64>) -> Vec<String> {
        self.store
            .search_history(limit.unwrap_or(self.cache.history_size))
            .await
    }

    pub async fn mappings(&self) -> IdMappings {
        self.normalizer.read().await.mappings().clone()
    }

    /// Persists new tables and swaps them in. Nothing changes if the write
    /// fails.
    pub async fn update_mappings(&self, mappings: IdMappings) -> bool {
        let mappings = IdMappings::new(mappings.prefixes, mappings.suffixes);
        if !self.mappings.save(&mappings) {
            return false;
        }
        self.normalizer.write().await.set_mappings(mappings);
        true
    }
}
