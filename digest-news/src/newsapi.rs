//! NewsAPI client for keyword search

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use digest_core::Article;

use crate::error::NewsError;
use crate::merge::merge_ranked;
use crate::normalize::normalize_records;
use crate::types::{NewsApiResponse, NewsQuery, SortOrder};

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_LANGUAGE: &str = "en";

/// Anything that can run a keyword search and return raw article records
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Raw article records for `query` in the given sort order
    async fn search(
        &self,
        query: &NewsQuery,
        sort: SortOrder,
    ) -> Result<Vec<serde_json::Value>, NewsError>;
}

/// NewsAPI client configuration
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub page_size: u32,
    pub language: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl NewsApiConfig {
    /// Read `NEWS_API_KEY`, `NEWS_API_BASE_URL` and `NEWS_PAGE_SIZE`
    pub fn from_env() -> Result<Self, NewsError> {
        let api_key = std::env::var("NEWS_API_KEY")
            .map_err(|_| NewsError::InvalidConfig("NEWS_API_KEY not set".to_string()))?;

        let mut config = Self {
            api_key,
            ..Self::default()
        };
        if let Ok(base_url) = std::env::var("NEWS_API_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(page_size) = std::env::var("NEWS_PAGE_SIZE") {
            config.page_size = page_size.parse().map_err(|_| {
                NewsError::InvalidConfig(format!("NEWS_PAGE_SIZE is not a number: {}", page_size))
            })?;
        }
        Ok(config)
    }
}

/// NewsAPI `/v2/everything` client
pub struct NewsApiClient {
    client: Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    /// Create a new NewsAPI client
    pub fn new(config: NewsApiConfig) -> Result<Self, NewsError> {
        if config.api_key.trim().is_empty() {
            return Err(NewsError::InvalidConfig("news API key is empty".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            config,
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(skip(self, query, sort), fields(sort = sort.as_str()))]
    async fn search(
        &self,
        query: &NewsQuery,
        sort: SortOrder,
    ) -> Result<Vec<serde_json::Value>, NewsError> {
        let q = query.query_string();
        if q.is_empty() {
            return Err(NewsError::EmptyQuery);
        }
        let (from, to) = query.date_range(Utc::now().date_naive());
        let page_size = self.config.page_size.to_string();

        debug!("Searching NewsAPI: q='{}', from={}, to={}", q, from, to);

        let response = self
            .client
            .get(format!("{}/v2/everything", self.config.base_url))
            .header("X-Api-Key", &self.config.api_key)
            .query(&[
                ("q", q.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", sort.as_str()),
                ("language", self.config.language.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| NewsError::ParseError(e.to_string()))?;

        if body.status != "ok" {
            return Err(NewsError::ApiError {
                status: 200,
                message: body
                    .message
                    .or(body.code)
                    .unwrap_or_else(|| format!("unexpected status '{}'", body.status)),
            });
        }

        info!(
            "Received {} articles from NewsAPI ({} total)",
            body.articles.len(),
            body.total_results.unwrap_or_default()
        );
        Ok(body.articles)
    }
}

/// Fetch by popularity and by relevancy, normalize both and merge them
#[instrument(skip(source, query), fields(keywords = ?query.keywords))]
pub async fn fetch_articles(
    source: &dyn NewsSource,
    query: &NewsQuery,
) -> Result<Vec<Article>, NewsError> {
    let popular = source.search(query, SortOrder::Popularity).await?;
    let relevant = source.search(query, SortOrder::Relevancy).await?;

    let popular: Vec<Article> = normalize_records(popular).collect();
    let relevant: Vec<Article> = normalize_records(relevant).collect();

    let merged = merge_ranked(popular, relevant);
    if merged.is_empty() {
        warn!("No usable articles for keywords {:?}", query.keywords);
    } else {
        info!("Merged {} unique articles", merged.len());
    }
    Ok(merged)
}
