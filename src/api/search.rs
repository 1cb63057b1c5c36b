use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_keyword, validate_limit, validate_max_pages};
use super::{ApiError, ApiResponse, AppState};
use crate::models::{Actor, MoviePage};

#[derive(Debug, Deserialize)]
pub struct ActorSearchQuery {
    pub keyword: String,
    pub max_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MovieSearchQuery {
    pub keyword: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

const fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

pub async fn search_actors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActorSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Actor>>>, ApiError> {
    let keyword = validate_keyword(&query.keyword)?;
    let max_pages = query.max_pages.map(validate_max_pages).transpose()?;

    let actors = state.catalog().search_actors(keyword, max_pages).await;
    Ok(Json(ApiResponse::success(actors)))
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovieSearchQuery>,
) -> Result<Json<ApiResponse<MoviePage>>, ApiError> {
    let keyword = validate_keyword(&query.keyword)?;

    let page = state
        .catalog()
        .search_movies(keyword, query.page)
        .await
        .unwrap_or_default();

    Ok(Json(ApiResponse::success(page)))
}

pub async fn search_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let limit = query.limit.map(validate_limit).transpose()?;

    let history = state.catalog().search_history(limit).await;
    Ok(Json(ApiResponse::success(history)))
}
