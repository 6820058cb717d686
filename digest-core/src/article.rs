//! News article data structures

use serde::{Deserialize, Serialize};

/// Marker the news provider puts in the title of retracted articles
pub const REMOVED_MARKER: &str = "[Removed]";

/// A normalized news article
///
/// Built once per request from the news provider's response and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Name of the publishing source (e.g., "Reuters")
    pub source_name: String,
    /// Article author, when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Article title (non-empty, never contains the removed marker)
    pub title: String,
    /// Short description, empty when missing
    #[serde(default)]
    pub description: String,
    /// Article URL, identity key within a batch
    pub url: String,
    /// Thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Publication timestamp as reported (ISO-8601)
    #[serde(default)]
    pub published_at: String,
    /// Body excerpt with the provider's truncation marker stripped
    #[serde(default)]
    pub content: String,
}

impl Article {
    /// Whether a title/url pair identifies a usable article
    pub fn has_valid_identity(title: &str, url: &str) -> bool {
        !title.trim().is_empty() && !url.is_empty() && !title.contains(REMOVED_MARKER)
    }

    /// Text used for relevance scoring: title, description and content
    /// joined by single spaces
    pub fn document_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.content)
    }
}

/// An article with its relevance score against the user's keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedArticle {
    #[serde(flatten)]
    pub article: Article,
    /// Cosine similarity against the keyword query (0.0 - 1.0).
    /// Only comparable within a single ranking call.
    pub relevance_score: f64,
}

impl RankedArticle {
    pub fn new(article: Article, relevance_score: f64) -> Self {
        Self {
            article,
            relevance_score,
        }
    }

    pub fn into_article(self) -> Article {
        self.article
    }
}
