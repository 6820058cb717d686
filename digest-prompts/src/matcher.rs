//! Pairs each article with a meme template through the text generator

use std::sync::Arc;

use digest_core::{Article, MatchAssignment, MemeTemplate};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::MatchError;
use crate::generator::{extract_json, GenerationRequest, TextGenerator};

const MATCH_TEMPERATURE: f32 = 0.7;

const MATCH_SYSTEM_PROMPT: &str = r#"You are an expert at matching news articles with meme templates based on semantic relevance.

Match each article with the MOST APPROPRIATE meme template based on:
1. Thematic relevance (e.g., comparison memes for articles about competition)
2. Emotional tone (e.g., disaster memes for bad news)
3. Structural fit (e.g., "two options" memes for dilemma articles)
4. Humor potential

Rules:
- Each meme can only be used ONCE
- Don't just match in order, find the BEST semantic matches

Output format: a JSON array of meme indices (0-based) in article order.
For example [7, 2, 9] means article 0 uses meme 7, article 1 uses meme 2 and article 2 uses meme 9."#;

/// Matching options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Reject assignments that reuse a template
    pub enforce_unique_templates: bool,
}

/// Article-to-template matcher
pub struct MemeMatcher {
    generator: Arc<dyn TextGenerator>,
    options: MatchOptions,
}

impl MemeMatcher {
    pub fn new(generator: Arc<dyn TextGenerator>, options: MatchOptions) -> Self {
        Self { generator, options }
    }

    /// Ask the generator for one template index per article and validate it
    #[instrument(skip(self, articles, templates), fields(article_count = articles.len(), template_count = templates.len()))]
    pub async fn match_articles(
        &self,
        articles: &[Article],
        templates: &[MemeTemplate],
    ) -> Result<MatchAssignment, MatchError> {
        if articles.is_empty() {
            return Ok(MatchAssignment::new(Vec::new()));
        }
        if templates.is_empty() {
            return Err(MatchError::NoTemplates(articles.len()));
        }

        let request = build_match_request(articles, templates);
        let reply = self.generator.generate(&request).await?;
        debug!("Match reply: {}", reply);

        let json = extract_json(&reply)?;
        let value: Value =
            serde_json::from_str(json).map_err(|e| MatchError::Parse(e.to_string()))?;

        let assignment = validate_assignment(
            &value,
            articles.len(),
            templates.len(),
            self.options.enforce_unique_templates,
        )
        .inspect_err(|e| warn!("Rejected match response: {}", e))?;

        info!("Matched {} articles to templates", assignment.len());
        Ok(assignment)
    }
}

/// Matching request listing article and template summaries by index
pub fn build_match_request(articles: &[Article], templates: &[MemeTemplate]) -> GenerationRequest {
    let article_summaries: Vec<Value> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            json!({
                "index": index,
                "title": article.title,
                "description": article.description,
            })
        })
        .collect();

    let template_summaries: Vec<Value> = templates
        .iter()
        .enumerate()
        .map(|(index, template)| {
            json!({
                "index": index,
                "name": template.name,
                "description": template.description,
                "usage_context": template.usage_context,
            })
        })
        .collect();

    let user = format!(
        "Articles to match:\n{}\n\nAvailable meme templates:\n{}\n\n\
         Match each article with the most semantically appropriate meme.\n\
         Return ONLY a JSON array of meme indices. The array must have {} elements.\n\
         Each meme index can only appear once.",
        serde_json::to_string_pretty(&article_summaries).unwrap_or_default(),
        serde_json::to_string_pretty(&template_summaries).unwrap_or_default(),
        articles.len()
    );

    GenerationRequest::new(MATCH_SYSTEM_PROMPT, user, MATCH_TEMPERATURE)
}

/// Check a decoded reply against the article and template counts
///
/// Every element must be a non-negative integer below `template_count`.
/// Floats, strings and booleans are rejected.
pub fn validate_assignment(
    value: &Value,
    article_count: usize,
    template_count: usize,
    enforce_unique: bool,
) -> Result<MatchAssignment, MatchError> {
    let entries = value.as_array().ok_or(MatchError::NotAnArray)?;
    if entries.len() != article_count {
        return Err(MatchError::LengthMismatch {
            expected: article_count,
            actual: entries.len(),
        });
    }

    let mut indices = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let index = entry
            .as_u64()
            .and_then(|idx| usize::try_from(idx).ok())
            .filter(|idx| *idx < template_count)
            .ok_or_else(|| MatchError::InvalidIndex {
                position,
                value: entry.to_string(),
            })?;
        indices.push(index);
    }

    let assignment = MatchAssignment::new(indices);
    if enforce_unique {
        if let Some(dup) = assignment.first_duplicate() {
            return Err(MatchError::DuplicateTemplate(dup));
        }
    }

    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article {
                source_name: "Test".to_string(),
                author: None,
                title: format!("Story {}", i),
                description: format!("About story {}", i),
                url: format!("u{}", i),
                image_url: None,
                published_at: "2025-06-10T08:30:00Z".to_string(),
                content: String::new(),
            })
            .collect()
    }

    fn templates(n: usize) -> Vec<MemeTemplate> {
        (0..n)
            .map(|i| MemeTemplate {
                id: format!("t{}", i),
                name: format!("Template {}", i),
                description: format!("Description {}", i),
                usage_context: "Any".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_validate_accepts_valid_assignment() {
        let assignment = validate_assignment(&json!([2, 0, 1]), 3, 3, true).unwrap();
        assert_eq!(assignment.indices(), &[2, 0, 1]);
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        assert!(matches!(
            validate_assignment(&json!([0, 1]), 3, 5, false),
            Err(MatchError::LengthMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            validate_assignment(&json!([0, 1, 2, 3]), 3, 5, false),
            Err(MatchError::LengthMismatch { expected: 3, actual: 4 })
        ));
    }

    #[test]
    fn test_validate_rejects_invalid_indices() {
        for bad in [json!([0, 5]), json!([0, -1]), json!([0, 1.0]), json!([0, "1"]), json!([0, true])] {
            assert!(
                matches!(
                    validate_assignment(&bad, 2, 5, false),
                    Err(MatchError::InvalidIndex { position: 1, .. })
                ),
                "expected rejection of {}",
                bad
            );
        }
    }

    #[test]
    fn test_validate_rejects_non_array() {
        assert!(matches!(
            validate_assignment(&json!({"matches": [0]}), 1, 3, false),
            Err(MatchError::NotAnArray)
        ));
    }

    #[test]
    fn test_validate_uniqueness_option() {
        let reply = json!([1, 1, 0]);
        assert!(validate_assignment(&reply, 3, 3, false).is_ok());
        assert!(matches!(
            validate_assignment(&reply, 3, 3, true),
            Err(MatchError::DuplicateTemplate(1))
        ));
    }

    #[test]
    fn test_match_request_lists_everything() {
        let request = build_match_request(&articles(2), &templates(6));
        assert_eq!(request.temperature, MATCH_TEMPERATURE);
        assert!(request.user.contains("Story 1"));
        assert!(request.user.contains("Description 5"));
        assert!(request.user.contains("must have 2 elements"));
    }

    #[tokio::test]
    async fn test_match_articles_parses_fenced_reply() {
        let generator = FixedGenerator::new("```json\n[4, 1]\n```");
        let matcher = MemeMatcher::new(generator.clone(), MatchOptions::default());
        let assignment = matcher
            .match_articles(&articles(2), &templates(6))
            .await
            .unwrap();
        assert_eq!(assignment.indices(), &[4, 1]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_match_articles_empty_skips_generator() {
        let generator = FixedGenerator::new("[]");
        let matcher = MemeMatcher::new(generator.clone(), MatchOptions::default());
        let assignment = matcher.match_articles(&[], &templates(3)).await.unwrap();
        assert!(assignment.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_match_articles_surfaces_failures() {
        let matcher = MemeMatcher::new(FixedGenerator::new("[0]"), MatchOptions::default());
        assert!(matches!(
            matcher.match_articles(&articles(2), &templates(3)).await,
            Err(MatchError::LengthMismatch { .. })
        ));

        let matcher = MemeMatcher::new(Arc::new(FailingGenerator), MatchOptions::default());
        assert!(matches!(
            matcher.match_articles(&articles(1), &templates(3)).await,
            Err(MatchError::Generation(_))
        ));

        let matcher = MemeMatcher::new(FixedGenerator::new("[0]"), MatchOptions::default());
        assert!(matches!(
            matcher.match_articles(&articles(1), &[]).await,
            Err(MatchError::NoTemplates(1))
        ));
    }

    #[tokio::test]
    async fn test_match_articles_rejects_object_reply() {
        let generator = FixedGenerator::new(r#"{"error": "cannot comply", "indices": [2]}"#);
        let matcher = MemeMatcher::new(generator, MatchOptions::default());
        assert!(matches!(
            matcher.match_articles(&articles(1), &templates(3)).await,
            Err(MatchError::NotAnArray)
        ));
    }

    #[tokio::test]
    async fn test_match_articles_rejects_prose_around_array() {
        let matcher = MemeMatcher::new(FixedGenerator::new("Sure! [0]"), MatchOptions::default());
        assert!(matches!(
            matcher.match_articles(&articles(1), &templates(3)).await,
            Err(MatchError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_match_articles_enforces_uniqueness() {
        let matcher = MemeMatcher::new(
            FixedGenerator::new("```JSON\n[2, 2]\n```"),
            MatchOptions {
                enforce_unique_templates: true,
            },
        );
        assert!(matches!(
            matcher.match_articles(&articles(2), &templates(3)).await,
            Err(MatchError::DuplicateTemplate(2))
        ));
    }
}
