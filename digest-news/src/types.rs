//! Wire types for the NewsAPI `/v2/everything` endpoint

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sort criterion understood by the news search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Popularity,
    Relevancy,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Popularity => "popularity",
            SortOrder::Relevancy => "relevancy",
        }
    }
}

/// A keyword search over the last `days_back` days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsQuery {
    /// Free-text keywords from the user
    pub keywords: Vec<String>,
    /// How many days to look back
    #[serde(default = "default_days_back")]
    pub days_back: u32,
}

fn default_days_back() -> u32 {
    1
}

impl NewsQuery {
    pub fn new(keywords: Vec<String>, days_back: u32) -> Self {
        Self {
            keywords,
            days_back,
        }
    }

    /// Build the provider query: keywords OR-ed together, multi-word
    /// keywords quoted as phrases
    pub fn query_string(&self) -> String {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| {
                if k.contains(' ') {
                    format!("\"{}\"", k)
                } else {
                    k.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    /// `(from, to)` dates formatted as `YYYY-MM-DD`, ending at `today`
    pub fn date_range(&self, today: NaiveDate) -> (String, String) {
        let from = today
            .checked_sub_days(Days::new(self.days_back as u64))
            .unwrap_or(NaiveDate::MIN);
        (
            from.format("%Y-%m-%d").to_string(),
            today.format("%Y-%m-%d").to_string(),
        )
    }
}

/// NewsAPI search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    /// "ok" or "error"
    pub status: String,
    /// Total number of matching articles
    #[serde(default)]
    pub total_results: Option<u64>,
    /// Raw article records, validated later by the normalizer
    #[serde(default)]
    pub articles: Vec<serde_json::Value>,
    /// Error code when `status == "error"`
    #[serde(default)]
    pub code: Option<String>,
    /// Error message when `status == "error"`
    #[serde(default)]
    pub message: Option<String>,
}

/// Article record as returned by the news provider
///
/// Every field is optional; validation happens in the normalizer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Source field: `{"id": .., "name": ..}` from NewsAPI, or a bare name
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSource {
    Named {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl RawSource {
    pub fn name(&self) -> Option<&str> {
        match self {
            RawSource::Named { name, .. } => name.as_deref(),
            RawSource::Plain(name) => Some(name.as_str()),
        }
    }
}
