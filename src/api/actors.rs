use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_catalog_id, validate_max_pages};
use super::{ActorDeletedDto, ApiError, ApiResponse, AppState};
use crate::models::{Actor, Movie};

#[derive(Debug, Deserialize)]
pub struct PagesQuery {
    pub max_pages: Option<u32>,
}

pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Actor>>, ApiError> {
    let id = validate_catalog_id(&id)?;

    let actor = state
        .catalog()
        .actor(id)
        .await
        .ok_or_else(|| ApiError::not_found("Actor", id))?;

    Ok(Json(ApiResponse::success(actor)))
}

pub async fn actor_movies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<PagesQuery>,
) -> Result<Json<ApiResponse<Vec<Movie>>>, ApiError> {
    let id = validate_catalog_id(&id)?;
    let max_pages = query.max_pages.map(validate_max_pages).transpose()?;

    let movies = state.catalog().actor_movies(id, max_pages).await;
    Ok(Json(ApiResponse::success(movies)))
}

pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ActorDeletedDto>>, ApiError> {
    let id = validate_catalog_id(&id)?;

    let movies_removed = state
        .catalog()
        .forget_actor(id)
        .await
        .ok_or_else(|| ApiError::internal(format!("Failed to delete actor {id}")))?;

    Ok(Json(ApiResponse::success(ActorDeletedDto {
        actor_id: id.to_string(),
        movies_removed,
    })))
}
