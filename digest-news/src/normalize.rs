//! Raw provider records -> validated articles

use digest_core::Article;
use tracing::trace;

use crate::types::RawArticle;

/// Start of the provider's `[+N chars]` truncation marker
pub const TRUNCATION_MARKER: &str = "[+";

/// Drop everything from the truncation marker on
pub fn strip_truncation_marker(content: &str) -> String {
    match content.find(TRUNCATION_MARKER) {
        Some(pos) => content[..pos].trim().to_string(),
        None => content.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate and clean one record
///
/// Returns `None` for records without a usable title or url, or whose
/// title carries the removed marker.
pub fn normalize(raw: RawArticle) -> Option<Article> {
    let title = raw.title.unwrap_or_default();
    let url = raw.url.unwrap_or_default();
    if !Article::has_valid_identity(&title, &url) {
        return None;
    }

    let raw_description = raw.description.unwrap_or_default();
    let content = match raw.content {
        Some(content) if !content.is_empty() => content,
        _ => raw_description.clone(),
    };

    let source_name = raw
        .source
        .as_ref()
        .and_then(|s| s.name())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    Some(Article {
        source_name,
        author: non_empty(raw.author),
        title: title.trim().to_string(),
        description: raw_description.trim().to_string(),
        url,
        image_url: non_empty(raw.url_to_image),
        published_at: raw.published_at.unwrap_or_default(),
        content: strip_truncation_marker(&content),
    })
}

/// Lazily normalize a batch of JSON records, skipping anything invalid
pub fn normalize_records<I>(records: I) -> impl Iterator<Item = Article>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    records.into_iter().filter_map(|record| {
        let raw = match serde_json::from_value::<RawArticle>(record) {
            Ok(raw) => raw,
            Err(e) => {
                trace!("Skipping malformed article record: {}", e);
                return None;
            }
        };
        normalize(raw)
    })
}
