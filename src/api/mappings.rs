use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_catalog_id;
use super::{ApiError, ApiResponse, AppState};
use crate::parser::IdMappings;
use crate::services::ResolvedId;

pub async fn get_mappings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<IdMappings>>, ApiError> {
    Ok(Json(ApiResponse::success(state.catalog().mappings().await)))
}

/// Replaces both tables. Keys are lowercased before they are stored.
pub async fn update_mappings(
    State(state): State<Arc<AppState>>,
    Json(mappings): Json<IdMappings>,
) -> Result<Json<ApiResponse<IdMappings>>, ApiError> {
    if !state.catalog().update_mappings(mappings).await {
        return Err(ApiError::internal("Failed to save id mappings"));
    }

    Ok(Json(ApiResponse::success(state.catalog().mappings().await)))
}

pub async fn normalize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ResolvedId>>, ApiError> {
    let id = validate_catalog_id(&id)?;
    Ok(Json(ApiResponse::success(state.catalog().resolve_id(id).await)))
}
