//! Image prompt generation for matched article/template pairs

use std::sync::Arc;

use digest_core::{Article, MatchAssignment, MemePrompt, MemeTemplate};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::PromptError;
use crate::generator::{extract_json, GenerationRequest, TextGenerator};

const PROMPT_TEMPERATURE: f32 = 0.8;
const CONTENT_PREVIEW_CHARS: usize = 500;
const UNKNOWN_SOURCE: &str = "Unknown";

const PROMPT_SYSTEM_PROMPT: &str = r#"You are a meme generation expert. Given articles that have already been matched with meme templates, create specific, funny meme prompts.

Each article has a "meme" field describing the template to use.

For each article:
1. Create a prompt that specifically uses that meme format
2. Include specific text overlays that reference the article content
3. Make it topical, clever, and funny
4. Describe precisely what the meme looks like, assuming the reader has NEVER seen it before

Output format: JSON array of prompt strings in the same order as input.
Example: [
  "Create a Drake meme where Drake rejects 'Old Bitcoin mining' and approves 'American Bitcoin with tariffs'",
  "Create a Woman yelling at cat meme where the woman represents 'Wall Street' yelling 'We need stablecoins!' and the cat is 'Bitcoin' looking confused"
]"#;

/// Article payload sent to the generator along with its template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub source: String,
    pub meme: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usage_context: String,
}

/// Trim an article for the prompt request and attach its template
pub fn prepare_article(article: &Article, template: &MemeTemplate) -> EnrichedArticle {
    let source = article.source_name.trim();
    EnrichedArticle {
        title: article.title.trim().to_string(),
        description: article.description.trim().to_string(),
        content: article
            .content
            .trim()
            .chars()
            .take(CONTENT_PREVIEW_CHARS)
            .collect(),
        source: if source.is_empty() {
            UNKNOWN_SOURCE.to_string()
        } else {
            source.to_string()
        },
        meme: template.description.clone(),
        usage_context: template.usage_context.clone(),
    }
}

/// Pair every article with its assigned template
pub fn enrich_articles(
    articles: &[Article],
    templates: &[MemeTemplate],
    assignment: &MatchAssignment,
) -> Result<Vec<(EnrichedArticle, String)>, PromptError> {
    if assignment.len() != articles.len() {
        return Err(PromptError::AssignmentMismatch {
            articles: articles.len(),
            assigned: assignment.len(),
        });
    }

    articles
        .iter()
        .zip(assignment.indices())
        .enumerate()
        .map(|(article_idx, (article, &template_idx))| {
            let template = templates
                .get(template_idx)
                .ok_or(PromptError::MissingTemplate {
                    article: article_idx,
                    template: template_idx,
                })?;
            Ok((prepare_article(article, template), template.id.clone()))
        })
        .collect()
}

/// Prompt request for already-enriched articles
pub fn build_prompt_request(enriched: &[EnrichedArticle]) -> GenerationRequest {
    let user = format!(
        "Articles with pre-matched memes:\n{}\n\n\
         Generate a meme prompt for each article using its assigned meme template.\n\
         Return ONLY a JSON array of {} prompt strings.",
        serde_json::to_string_pretty(enriched).unwrap_or_default(),
        enriched.len()
    );
    GenerationRequest::new(PROMPT_SYSTEM_PROMPT, user, PROMPT_TEMPERATURE)
}

/// Decode a reply into exactly `expected` prompt strings
pub fn parse_prompts(reply: &str, expected: usize) -> Result<Vec<String>, PromptError> {
    let json = extract_json(reply)?;
    let value: Value = serde_json::from_str(json).map_err(|e| PromptError::Parse(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(PromptError::NotAnArray);
    };

    if entries.len() != expected {
        return Err(PromptError::CountMismatch {
            expected,
            actual: entries.len(),
        });
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| match entry {
            Value::String(prompt) => Ok(prompt),
            _ => Err(PromptError::NotAString(idx)),
        })
        .collect()
}

/// Writes one image prompt per matched article
pub struct PromptAssembler {
    generator: Arc<dyn TextGenerator>,
}

impl PromptAssembler {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate prompts and zip them with article URLs and template ids
    #[instrument(skip(self, articles, templates, assignment), fields(article_count = articles.len()))]
    pub async fn generate_prompts(
        &self,
        articles: &[Article],
        templates: &[MemeTemplate],
        assignment: &MatchAssignment,
    ) -> Result<Vec<MemePrompt>, PromptError> {
        let pairs = enrich_articles(articles, templates, assignment)?;
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let (enriched, template_ids): (Vec<EnrichedArticle>, Vec<String>) =
            pairs.into_iter().unzip();

        let reply = self
            .generator
            .generate(&build_prompt_request(&enriched))
            .await?;
        let prompts = parse_prompts(&reply, enriched.len())?;

        let output: Vec<MemePrompt> = prompts
            .into_iter()
            .zip(articles)
            .zip(template_ids)
            .map(|((prompt, article), template_id)| MemePrompt {
                prompt,
                url: article.url.clone(),
                template_id,
            })
            .collect();

        info!("Generated {} meme prompts", output.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct RecordingGenerator {
        reply: String,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl RecordingGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.lock().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn article(title: &str, url: &str, content: &str) -> Article {
        Article {
            source_name: "Wire".to_string(),
            author: None,
            title: title.to_string(),
            description: "  A description  ".to_string(),
            url: url.to_string(),
            image_url: None,
            published_at: "2025-06-10T08:30:00Z".to_string(),
            content: content.to_string(),
        }
    }

    fn template(id: &str, description: &str) -> MemeTemplate {
        MemeTemplate {
            id: id.to_string(),
            name: String::new(),
            description: description.to_string(),
            usage_context: String::new(),
        }
    }

    #[test]
    fn test_prepare_article_trims_and_truncates() {
        let mut a = article("  Cat becomes mayor ", "u1", &"x".repeat(800));
        a.source_name = String::new();
        let enriched = prepare_article(&a, &template("t1", "Drake"));
        assert_eq!(enriched.title, "Cat becomes mayor");
        assert_eq!(enriched.description, "A description");
        assert_eq!(enriched.content.chars().count(), 500);
        assert_eq!(enriched.source, "Unknown");
        assert_eq!(enriched.meme, "Drake");

        let json = serde_json::to_value(&enriched).unwrap();
        assert!(json.get("usage_context").is_none());
    }

    #[test]
    fn test_parse_prompts_count_and_types() {
        assert_eq!(
            parse_prompts(r#"["one", "two"]"#, 2).unwrap(),
            vec!["one".to_string(), "two".to_string()]
        );
        assert!(matches!(
            parse_prompts(r#"["one"]"#, 2),
            Err(PromptError::CountMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            parse_prompts(r#"["one", 2]"#, 2),
            Err(PromptError::NotAString(1))
        ));
        assert!(matches!(parse_prompts("nothing", 1), Err(PromptError::Parse(_))));
        assert!(matches!(parse_prompts("  ", 1), Err(PromptError::Generation(_))));
    }

    #[test]
    fn test_enrich_rejects_mismatched_assignment() {
        let articles = vec![article("A", "u1", ""), article("B", "u2", "")];
        let templates = vec![template("t0", "Drake")];
        assert!(matches!(
            enrich_articles(&articles, &templates, &MatchAssignment::new(vec![0])),
            Err(PromptError::AssignmentMismatch { articles: 2, assigned: 1 })
        ));
        assert!(matches!(
            enrich_articles(&articles, &templates, &MatchAssignment::new(vec![0, 3])),
            Err(PromptError::MissingTemplate { article: 1, template: 3 })
        ));
    }

    #[tokio::test]
    async fn test_generate_prompts_zips_in_order() {
        let generator = RecordingGenerator::new(r#"["Drake prompt", "Cat prompt"]"#);
        let assembler = PromptAssembler::new(generator.clone());

        let articles = vec![article("A", "u1", "Body"), article("B", "u2", "")];
        let templates = vec![template("t0", "Drake"), template("t1", "Woman yelling at cat")];
        let assignment = MatchAssignment::new(vec![0, 1]);

        let prompts = assembler
            .generate_prompts(&articles, &templates, &assignment)
            .await
            .unwrap();

        assert_eq!(
            prompts,
            vec![
                MemePrompt {
                    prompt: "Drake prompt".to_string(),
                    url: "u1".to_string(),
                    template_id: "t0".to_string(),
                },
                MemePrompt {
                    prompt: "Cat prompt".to_string(),
                    url: "u2".to_string(),
                    template_id: "t1".to_string(),
                },
            ]
        );

        let requests = generator.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, PROMPT_TEMPERATURE);
        assert!(requests[0].user.contains("Woman yelling at cat"));
        assert!(requests[0].user.contains("JSON array of 2 prompt strings"));
    }

    #[tokio::test]
    async fn test_generate_prompts_rejects_short_reply() {
        let assembler = PromptAssembler::new(RecordingGenerator::new(r#"["only one"]"#));
        let articles = vec![article("A", "u1", ""), article("B", "u2", "")];
        let templates = vec![template("t0", "Drake")];
        let result = assembler
            .generate_prompts(&articles, &templates, &MatchAssignment::new(vec![0, 0]))
            .await;
        assert!(matches!(result, Err(PromptError::CountMismatch { .. })));
    }

    #[tokio::test]
    async fn test_generate_prompts_rejects_object_reply() {
        let reply = r#"{"prompts": ["Drake prompt"]}"#;
        let assembler = PromptAssembler::new(RecordingGenerator::new(reply));
        let articles = vec![article("A", "u1", "")];
        let templates = vec![template("t0", "Drake")];
        let result = assembler
            .generate_prompts(&articles, &templates, &MatchAssignment::new(vec![0]))
            .await;
        assert!(matches!(result, Err(PromptError::NotAnArray)));
    }
}
