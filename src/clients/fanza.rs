//! Best-effort summary extraction from the detail site.

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const SITE_URL: &str = "https://www.dmm.co.jp/";
const REGION_BLOCKED_MARKER: &str = "not-available-in-your-region";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummarySource {
    JsonLd,
    Html,
    Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieSummary {
    pub movie_id: String,
    pub fanza_id: String,
    pub url: String,
    pub summary: String,
    pub source: SummarySource,
}

const JSON_LD: &str = r#"script[type="application/ld+json"]"#;
const SUMMARY_DIV: &str = "div.mg-b20.lh4";
const SUMMARY_PARA: &str = "p.mg-b20";
const ANY_PARA: &str = "p";
const INTRODUCTION: &str = ".txt.introduction p";
const VIDEO_DESCRIPTION: &str = ".nw-video-description";
const META_DESCRIPTION: &str = r#"meta[name="description"]"#;
const OG_DESCRIPTION: &str = r#"meta[property="og:description"]"#;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector defined in code")
}

#[derive(Clone)]
pub struct FanzaClient {
    client: Client,
}

impl FanzaClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let jar = Jar::default();
        let site = reqwest::Url::parse(SITE_URL).context("Invalid site URL")?;
        jar.add_cookie_str("age_check_done=1; Domain=.dmm.co.jp; Path=/", &site);

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ja-JP,ja;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_provider(Arc::new(jar))
            .build()
            .context("Failed to build detail site HTTP client")?;

        Ok(Self { client })
    }

    /// Probes `urls` in order; the first page yielding a summary wins.
    pub async fn fetch_summary(
        &self,
        movie_id: &str,
        fanza_id: &str,
        urls: &[String],
    ) -> Option<MovieSummary> {
        for url in urls {
            debug!(url, "Probing detail page");
            match self.fetch_page(url).await {
                Ok(Some(html)) => {
                    if let Some((summary, source)) = extract_summary(&html) {
                        info!(movie_id, url, ?source, "Summary found");
                        return Some(MovieSummary {
                            movie_id: movie_id.to_string(),
                            fanza_id: fanza_id.to_string(),
                            url: url.clone(),
                            summary,
                            source,
                        });
                    }
                    debug!(url, "Page has no summary");
                }
                Ok(None) => {}
                Err(e) => warn!(url, error = %e, "Detail page request failed"),
            }
        }

        warn!(movie_id, "No summary found on any candidate page");
        None
    }

    async fn fetch_page(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "Detail page miss");
            return Ok(None);
        }

        if response.url().as_str().contains(REGION_BLOCKED_MARKER) {
            warn!(url, "Detail page is region blocked");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

/// Extracts a summary in priority order: JSON-LD, page body, meta tags.
#[must_use]
pub fn extract_summary(html: &str) -> Option<(String, SummarySource)> {
    let document = Html::parse_document(html);

    from_json_ld(&document)
        .map(|s| (s, SummarySource::JsonLd))
        .or_else(|| from_body(&document).map(|s| (s, SummarySource::Html)))
        .or_else(|| from_meta(&document).map(|s| (s, SummarySource::Meta)))
}

fn from_json_ld(document: &Html) -> Option<String> {
    let script = document.select(&sel(JSON_LD)).next()?;
    let raw: String = script.text().collect();

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => value
            .get("description")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!(error = %e, "Unparseable JSON-LD block");
            None
        }
    }
}

fn from_body(document: &Html) -> Option<String> {
    if let Some(div) = document.select(&sel(SUMMARY_DIV)).next() {
        let found = div
            .select(&sel(SUMMARY_PARA))
            .next()
            .and_then(text_of)
            .or_else(|| div.select(&sel(ANY_PARA)).next().and_then(text_of))
            .or_else(|| text_of(div));
        if found.is_some() {
            return found;
        }
    }

    document
        .select(&sel(INTRODUCTION))
        .next()
        .and_then(text_of)
        .or_else(|| document.select(&sel(VIDEO_DESCRIPTION)).next().and_then(text_of))
}

fn from_meta(document: &Html) -> Option<String> {
    [META_DESCRIPTION, OG_DESCRIPTION]
        .into_iter()
        .find_map(|css| {
            document
                .select(&sel(css))
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
}

fn text_of(element: ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_ld_wins() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"Product","description":"From JSON-LD"}</script>
            <meta name="description" content="From meta">
            </head><body><div class="mg-b20 lh4"><p class="mg-b20">From body</p></div></body></html>"#;
        assert_eq!(
            extract_summary(html),
            Some(("From JSON-LD".to_string(), SummarySource::JsonLd))
        );
    }

    #[test]
    fn test_body_paragraph_priority() {
        let html = r#"<html><body>
            <div class="mg-b20 lh4"><p>Plain paragraph</p><p class="mg-b20"> Marked paragraph </p></div>
            </body></html>"#;
        assert_eq!(
            extract_summary(html),
            Some(("Marked paragraph".to_string(), SummarySource::Html))
        );
    }

    #[test]
    fn test_body_falls_back_to_div_text() {
        let html = r#"<div class="mg-b20 lh4"> Bare text </div>"#;
        assert_eq!(
            extract_summary(html).map(|(s, _)| s),
            Some("Bare text".to_string())
        );
    }

    #[test]
    fn test_introduction_and_video_description() {
        let intro = r#"<div class="txt introduction"><p>Intro text</p></div>"#;
        assert_eq!(
            extract_summary(intro),
            Some(("Intro text".to_string(), SummarySource::Html))
        );

        let desc = r#"<div class="nw-video-description">Video text</div>"#;
        assert_eq!(
            extract_summary(desc).map(|(s, _)| s),
            Some("Video text".to_string())
        );
    }

    #[test]
    fn test_meta_fallbacks() {
        let html = r#"<html><head>
            <meta name="description" content="  ">
            <meta property="og:description" content="OG text">
            </head><body></body></html>"#;
        assert_eq!(
            extract_summary(html),
            Some(("OG text".to_string(), SummarySource::Meta))
        );
    }

    #[test]
    fn test_broken_json_ld_falls_through() {
        let html = r#"<html><head>
            <script type="application/ld+json">{not json</script>
            <meta name="description" content="Meta text">
            </head></html>"#;
        assert_eq!(
            extract_summary(html),
            Some(("Meta text".to_string(), SummarySource::Meta))
        );
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(extract_summary("<html><body><div>x</div></body></html>"), None);
    }
}
