use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::CatalogService;
use crate::state::SharedState;

mod actors;
mod error;
mod maintenance;
mod mappings;
mod movies;
mod observability;
mod search;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.shared.catalog
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/health", get(maintenance::health))
        .route("/movies/recent", get(movies::recent_movies))
        .route("/movies/{id}", get(movies::get_movie))
        .route("/movies/{id}/summary", get(movies::get_summary))
        .route("/movies/{id}/translation", post(movies::save_translation))
        .route("/translate", post(movies::translate))
        .route("/actors/{id}", get(actors::get_actor))
        .route("/actors/{id}", delete(actors::delete_actor))
        .route("/actors/{id}/movies", get(actors::actor_movies))
        .route("/search/actors", get(search::search_actors))
        .route("/search/movies", get(search::search_movies))
        .route("/search/history", get(search::search_history))
        .route("/mappings", get(mappings::get_mappings))
        .route("/mappings", put(mappings::update_mappings))
        .route("/normalize/{id}", get(mappings::normalize))
        .route("/maintenance/purge", post(maintenance::purge))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
