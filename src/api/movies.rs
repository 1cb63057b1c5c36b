use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_catalog_id;
use super::{
    ApiError, ApiResponse, AppState, MovieDetailDto, TranslateRequest, TranslateResponse,
    TranslationRequest,
};
use crate::clients::MovieSummary;
use crate::models::Movie;

pub async fn recent_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Movie>>>, ApiError> {
    let movies = state.catalog().recent_movies().await;
    Ok(Json(ApiResponse::success(movies)))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MovieDetailDto>>, ApiError> {
    let id = validate_catalog_id(&id)?;

    let (movie, cast) = state
        .catalog()
        .movie_with_cast(id)
        .await
        .ok_or_else(|| ApiError::not_found("Movie", id))?;

    let watch_url = state.config().read().await.watch_url(&movie.id);

    Ok(Json(ApiResponse::success(MovieDetailDto {
        movie,
        cast,
        watch_url,
    })))
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MovieSummary>>, ApiError> {
    let id = validate_catalog_id(&id)?;

    let summary = state
        .catalog()
        .summary(id)
        .await
        .ok_or_else(|| ApiError::not_found("Summary for", id))?;

    Ok(Json(ApiResponse::success(summary)))
}

/// Stores translated fields on an already cached movie.
pub async fn save_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_catalog_id(&id)?;

    if request.title.is_none() && request.description.is_none() {
        return Err(ApiError::validation(
            "At least one of title or description is required",
        ));
    }

    let saved = state
        .catalog()
        .save_translation(id, request.title.as_deref(), request.description.as_deref())
        .await;

    if !saved {
        return Err(ApiError::not_found("Cached movie", id));
    }

    Ok(Json(ApiResponse::success(())))
}

pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<ApiResponse<TranslateResponse>>, ApiError> {
    let translated = state.catalog().translate(&request.text).await?;

    Ok(Json(ApiResponse::success(TranslateResponse {
        text: request.text,
        translated,
    })))
}
