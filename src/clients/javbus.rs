use crate::models::{Actor, Movie, MoviePage};
use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA, REFERER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Client for the remote catalog API (a javbus-api deployment).
#[derive(Clone)]
pub struct JavbusClient {
    client: Client,
    base_url: String,
}

impl JavbusClient {
    /// `base_url` is the API root, e.g. `http://localhost:8922/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.javbus.com/"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to build catalog HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_star(&self, star_id: &str) -> Result<Option<Actor>> {
        let url = format!("{}/stars/{}", self.base_url, urlencoding::encode(star_id));
        self.get_json(&url, &[]).await
    }

    pub async fn get_movie(&self, movie_id: &str) -> Result<Option<Movie>> {
        let url = format!("{}/movies/{}", self.base_url, urlencoding::encode(movie_id));
        self.get_json(&url, &[]).await
    }

    pub async fn search_movies(&self, keyword: &str, page: u32) -> Result<Option<MoviePage>> {
        let url = format!("{}/movies/search", self.base_url);
        let page = page.to_string();
        self.get_json(
            &url,
            &[("keyword", keyword), ("page", &page), ("magnet", "all")],
        )
        .await
    }

    /// One page of the movies credited to `star_id`.
    pub async fn star_movies(&self, star_id: &str, page: u32) -> Result<Option<MoviePage>> {
        let url = format!("{}/movies", self.base_url);
        let page = page.to_string();
        self.get_json(
            &url,
            &[
                ("filterType", "star"),
                ("filterValue", star_id),
                ("page", &page),
                ("magnet", "all"),
            ],
        )
        .await
    }

    /// Reachability probe against the first listing page.
    pub async fn check_connection(&self) -> bool {
        let url = format!("{}/movies?page=1", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Catalog API unreachable");
                false
            }
        }
    }

    /// `Ok(None)` on 404; other non-success statuses are errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let parsed = if query.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, query)
        };
        let url = parsed.with_context(|| format!("Invalid catalog URL: {url}"))?;
        debug!(url = %url, "Catalog API request");
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Catalog API error: {status} - {body}"));
        }

        let value = response
            .json::<T>()
            .await
            .with_context(|| format!("Unexpected catalog response from {url}"))?;
        Ok(Some(value))
    }
}
