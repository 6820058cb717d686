//! Relevance ranking and top-k selection

use std::cmp::Ordering;

use digest_core::{Article, RankedArticle};
use tracing::debug;

use crate::error::RankingError;
use crate::similarity::cosine_similarity;
use crate::tfidf::TfidfVectorizer;

/// Ranking configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankerConfig {
    /// Reduce terms to their English stem before weighting
    pub stemming: bool,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self { stemming: true }
    }
}

/// Score every article against `keywords` and sort by relevance
///
/// Ties on score are broken by `published_at`, newest first. Every input
/// article is returned, including those with a zero score.
pub fn rank_articles(
    articles: Vec<Article>,
    keywords: &[String],
    config: &RankerConfig,
) -> Vec<RankedArticle> {
    if articles.is_empty() {
        return Vec::new();
    }

    let mut corpus: Vec<String> = articles.iter().map(Article::document_text).collect();
    corpus.push(keywords.join(" "));

    let vectorizer = TfidfVectorizer::new(config.stemming);
    let mut vectors = vectorizer.fit_transform(&corpus);
    let query = match vectors.pop() {
        Some(query) => query,
        None => return Vec::new(),
    };

    let mut ranked: Vec<RankedArticle> = articles
        .into_iter()
        .zip(vectors.iter())
        .map(|(article, vector)| RankedArticle::new(article, cosine_similarity(vector, &query)))
        .collect();

    ranked.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.article.published_at.cmp(&a.article.published_at))
    });

    if let Some(top) = ranked.first() {
        debug!(
            "Ranked {} articles, top: '{}' (score={:.3})",
            ranked.len(),
            top.article.title.chars().take(50).collect::<String>(),
            top.relevance_score
        );
    }

    ranked
}

/// First `k` items of an already-ranked sequence
pub fn select_top_k<T>(mut ranked: Vec<T>, k: i64) -> Result<Vec<T>, RankingError> {
    if k < 0 {
        return Err(RankingError::NegativeCount(k));
    }
    let k = usize::try_from(k).unwrap_or(usize::MAX);
    ranked.truncate(k);
    Ok(ranked)
}
