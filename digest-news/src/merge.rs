//! Deduplicate the popularity- and relevancy-sorted lists

use std::collections::HashSet;

use digest_core::Article;
use indexmap::IndexMap;
use tracing::debug;

/// Characters ignored when comparing titles
const TITLE_PUNCTUATION: [char; 12] = ['.', ',', '!', '?', ':', ';', '-', '—', '"', '\'', '(', ')'];

/// Title keys are truncated to this many characters
pub const TITLE_KEY_LENGTH: usize = 50;

/// Normalized title used as the dedup key
///
/// Lowercased, punctuation removed, whitespace collapsed, truncated to
/// [`TITLE_KEY_LENGTH`] characters.
pub fn simplify_title(title: &str) -> String {
    let stripped: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !TITLE_PUNCTUATION.contains(c))
        .collect();

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(TITLE_KEY_LENGTH)
        .collect()
}

/// Key articles by simplified title; later duplicates replace earlier ones
/// but keep the first position
fn keyed(articles: Vec<Article>) -> IndexMap<String, Article> {
    let mut map = IndexMap::with_capacity(articles.len());
    for article in articles {
        if article.title.is_empty() {
            continue;
        }
        map.insert(simplify_title(&article.title), article);
    }
    map
}

/// Merge both lists into one without duplicates
///
/// Stories present in both lists come first (popularity order, popularity
/// copy kept), then popularity-only stories, then relevance-only stories.
pub fn merge_ranked(popularity: Vec<Article>, relevance: Vec<Article>) -> Vec<Article> {
    let popularity = keyed(popularity);
    let relevance = keyed(relevance);

    let popularity_keys: HashSet<String> = popularity.keys().cloned().collect();
    let (overlap, popularity_only): (Vec<_>, Vec<_>) = popularity
        .into_iter()
        .partition(|(key, _)| relevance.contains_key(key));

    debug!(
        "Merging articles: {} overlapping, {} popularity-only, {} relevance total",
        overlap.len(),
        popularity_only.len(),
        relevance.len()
    );

    let mut merged = Vec::with_capacity(overlap.len() + popularity_only.len() + relevance.len());
    merged.extend(overlap.into_iter().map(|(_, article)| article));
    merged.extend(popularity_only.into_iter().map(|(_, article)| article));
    merged.extend(
        relevance
            .into_iter()
            .filter(|(key, _)| !popularity_keys.contains(key))
            .map(|(_, article)| article),
    );
    merged
}
