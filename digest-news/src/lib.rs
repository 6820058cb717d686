//! News fetching for the meme digest
//!
//! This crate provides:
//! - NewsAPI client: fetches one query sorted by popularity and by relevancy
//! - Normalizer: turns raw provider records into validated articles
//! - Merger: deduplicates the two sorted lists, putting shared stories first

pub mod error;
pub mod merge;
pub mod newsapi;
pub mod normalize;
pub mod types;

pub use error::NewsError;
pub use merge::{merge_ranked, simplify_title};
pub use newsapi::{fetch_articles, NewsApiClient, NewsApiConfig, NewsSource};
pub use normalize::{normalize, normalize_records, strip_truncation_marker};
pub use types::{NewsQuery, RawArticle, RawSource, SortOrder};
