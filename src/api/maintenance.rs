use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthDto, PurgeDto};

pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthDto>> {
    let database = match state.shared.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };
    let remote_api = state.catalog().remote_available().await;
    let api_url = state.config().read().await.api_base().to_string();

    Json(ApiResponse::success(HealthDto {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        database,
        remote_api,
        api_url,
    }))
}

pub async fn purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PurgeDto>>, ApiError> {
    let report = state
        .catalog()
        .purge()
        .await
        .ok_or_else(|| ApiError::internal("Purge failed"))?;

    let settings = state.catalog().cache_settings();
    Ok(Json(ApiResponse::success(PurgeDto {
        report,
        actor_ttl_days: settings.purge_actor_after_days,
        movie_ttl_days: settings.purge_movie_after_days,
    })))
}
