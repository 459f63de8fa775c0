//! NewsAPI `/v2/everything` article source.
//!
//! One GET per fetch. The API key travels in the `X-Api-Key` header so it
//! never shows up in a logged request URL.
//!
//! # Response shape
//!
//! ```text
//! {"status":"ok","totalResults":2,"articles":[{"source":{"id":null,"name":"Reuters"},
//!   "author":"...","title":"...","description":"...","url":"...",
//!   "urlToImage":"...","publishedAt":"2025-05-06T14:30:00Z","content":"..."}]}
//! {"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}
//! ```

use super::{ArticleQuery, ArticleSource};
use crate::config::NewsSettings;
use crate::error::AppError;
use crate::models::RawArticle;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// The API rejects page sizes outside this range.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    source: Option<ApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl From<ApiArticle> for RawArticle {
    fn from(a: ApiArticle) -> Self {
        let published_at = a.published_at.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    warn!(%raw, error = %e, "Unparseable publishedAt; leaving empty");
                    None
                }
            }
        });
        RawArticle {
            title: a.title.unwrap_or_default(),
            source_name: a.source.and_then(|s| s.name),
            author: a.author,
            description: a.description,
            content: a.content,
            url: a.url.unwrap_or_default(),
            published_at,
        }
    }
}

/// HTTP client for the NewsAPI "everything" endpoint.
#[derive(Clone)]
pub struct NewsApiSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl NewsApiSource {
    pub fn new(settings: &NewsSettings, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
        })
    }

    /// Request URL for a query, without credentials.
    pub fn request_url(&self, query: &ArticleQuery) -> Result<Url, AppError> {
        let page_size = query.max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", query.query_string().as_str()),
                ("language", query.language.as_str()),
                ("sortBy", query.sort_by.as_str()),
                ("pageSize", page_size.as_str()),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid news endpoint {}: {e}", self.endpoint)))
    }
}

impl ArticleSource for NewsApiSource {
    #[instrument(level = "info", skip_all, fields(keywords = query.keywords.len(), max_results = query.max_results))]
    async fn fetch(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>, AppError> {
        let url = self.request_url(query)?;
        debug!(%url, "Requesting articles");

        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(AppError::source_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AppError::source_transport)?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u64,
                body = %truncate_for_log(&body, 300),
                "News API returned an error status"
            );
            return Err(AppError::SourceUnavailable {
                status: Some(status.as_u16()),
                body,
            });
        }

        let articles = decode_articles(&body, query.max_results)?;
        info!(
            count = articles.len(),
            elapsed_ms = dt.as_millis() as u64,
            "Fetched articles"
        );
        Ok(articles)
    }
}

/// Decode a successful response body, capping the result at `max_results`.
pub(crate) fn decode_articles(body: &str, max_results: usize) -> Result<Vec<RawArticle>, AppError> {
    let parsed: EverythingResponse =
        serde_json::from_str(body).map_err(|e| AppError::SourceUnavailable {
            status: None,
            body: format!("malformed response ({e}): {}", truncate_for_log(body, 300)),
        })?;

    if parsed.status != "ok" {
        let code = parsed.code.unwrap_or_else(|| "unknown".to_string());
        let message = parsed.message.unwrap_or_default();
        return Err(AppError::SourceUnavailable {
            status: None,
            body: format!("{code}: {message}"),
        });
    }

    debug!(total_results = ?parsed.total_results, "Decoded response");
    Ok(parsed
        .articles
        .into_iter()
        .take(max_results)
        .map(RawArticle::from)
        .collect())
}
