use serde::{Deserialize, Serialize};

use crate::db::PurgeReport;
use crate::models::{Actor, Movie};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub version: &'static str,
    pub uptime_secs: u64,
    pub database: bool,
    pub remote_api: bool,
    pub api_url: String,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailDto {
    #[serde(flatten)]
    pub movie: Movie,
    pub cast: Vec<Actor>,
    pub watch_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub text: String,
    pub translated: String,
}

#[derive(Debug, Serialize)]
pub struct ActorDeletedDto {
    pub actor_id: String,
    pub movies_removed: u64,
}

#[derive(Debug, Serialize)]
pub struct PurgeDto {
    #[serde(flatten)]
    pub report: PurgeReport,
    pub actor_ttl_days: u32,
    pub movie_ttl_days: u32,
}
