//! Meme digest pipeline
//!
//! News search -> normalize/merge -> rank -> top-k -> template sampling ->
//! match -> prompt generation. One run is sequential; a single pipeline can
//! serve concurrent requests behind an `Arc`.

use std::sync::Arc;

use digest_core::{Article, MemePrompt, RankedArticle};
use digest_news::{NewsQuery, NewsSource};
use digest_prompts::{MemeMatcher, PromptAssembler, TemplateSampler, TemplateStore, TextGenerator};
use digest_ranking::{rank_articles, select_top_k, RankingError};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// One digest request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DigestRequest {
    /// Keywords to search news for
    #[serde(default)]
    pub trends: Vec<String>,
    /// How many days back to search
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// How many memes to produce
    #[serde(default = "default_memes")]
    pub memes: i64,
}

fn default_duration() -> u32 {
    1
}

fn default_memes() -> i64 {
    10
}

/// Orchestrates the collaborators of one digest run
pub struct MemePipeline {
    news: Arc<dyn NewsSource>,
    templates: Arc<dyn TemplateStore>,
    matcher: MemeMatcher,
    assembler: PromptAssembler,
    sampler: TemplateSampler,
    config: PipelineConfig,
}

impl MemePipeline {
    pub fn new(
        news: Arc<dyn NewsSource>,
        templates: Arc<dyn TemplateStore>,
        generator: Arc<dyn TextGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            news,
            templates,
            matcher: MemeMatcher::new(generator.clone(), config.matching),
            assembler: PromptAssembler::new(generator),
            sampler: TemplateSampler::from_os_rng(config.sample_factor),
            config,
        }
    }

    /// Replace the template sampler, e.g. with a seeded one
    pub fn with_sampler(mut self, sampler: TemplateSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Search news for `trends` and return the merged, normalized articles
    #[instrument(skip(self, trends), fields(trend_count = trends.len()))]
    pub async fn fetch_articles(
        &self,
        trends: &[String],
        days_back: u32,
    ) -> Result<Vec<Article>, PipelineError> {
        if trends.iter().all(|t| t.trim().is_empty()) {
            return Err(PipelineError::EmptyTrends);
        }

        let query = NewsQuery::new(trends.to_vec(), days_back);
        let articles = digest_news::fetch_articles(self.news.as_ref(), &query).await?;
        Ok(articles)
    }

    /// Rank articles against `trends` and keep the best `count`
    pub fn select_articles(
        &self,
        articles: Vec<Article>,
        trends: &[String],
        count: i64,
    ) -> Result<Vec<RankedArticle>, PipelineError> {
        let ranked = rank_articles(articles, trends, &self.config.ranker);
        let selected = select_top_k(ranked, count)?;

        for (i, article) in selected.iter().enumerate() {
            debug!(
                "Selected #{} '{}' (score={:.3})",
                i + 1,
                article.article.title,
                article.relevance_score
            );
        }
        Ok(selected)
    }

    /// Match articles to sampled templates and write one prompt each
    #[instrument(skip(self, articles), fields(article_count = articles.len()))]
    pub async fn generate_prompts(
        &self,
        articles: &[Article],
    ) -> Result<Vec<MemePrompt>, PipelineError> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let all_templates = self.templates.load().await?;
        let candidates = self.sampler.sample(&all_templates, articles.len());
        info!(
            "Offering {} of {} templates for {} articles",
            candidates.len(),
            all_templates.len(),
            articles.len()
        );

        let assignment = self.matcher.match_articles(articles, &candidates).await?;
        let prompts = self
            .assembler
            .generate_prompts(articles, &candidates, &assignment)
            .await?;
        Ok(prompts)
    }

    /// Full run: fetch, rank, select and generate prompts
    #[instrument(skip(self, request), fields(trends = ?request.trends, memes = request.memes))]
    pub async fn run(&self, request: &DigestRequest) -> Result<Vec<MemePrompt>, PipelineError> {
        if request.memes < 0 {
            return Err(RankingError::NegativeCount(request.memes).into());
        }

        let articles = self.fetch_articles(&request.trends, request.duration).await?;
        if articles.is_empty() {
            warn!("No articles found for {:?}", request.trends);
            return Err(PipelineError::NoArticles);
        }

        let selected: Vec<Article> = self
            .select_articles(articles, &request.trends, request.memes)?
            .into_iter()
            .map(RankedArticle::into_article)
            .collect();

        let prompts = self.generate_prompts(&selected).await?;
        info!("Digest run produced {} prompts", prompts.len());
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use digest_core::MemeTemplate;
    use digest_news::{NewsError, SortOrder};
    use digest_prompts::{GenerationError, GenerationRequest, InMemoryTemplateStore, MatchOptions};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::VecDeque;

    struct StubNews {
        records: Vec<Value>,
    }

    #[async_trait]
    impl NewsSource for StubNews {
        async fn search(&self, _query: &NewsQuery, sort: SortOrder) -> Result<Vec<Value>, NewsError> {
            Ok(match sort {
                SortOrder::Popularity => self.records.clone(),
                SortOrder::Relevancy => self.records.iter().rev().cloned().collect(),
            })
        }
    }

    struct ScriptedGenerator {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.lock().push(request.clone());
            self.replies
                .lock()
                .pop_front()
                .ok_or(GenerationError::EmptyResponse)
        }
    }

    fn news_records() -> Vec<Value> {
        vec![
            json!({
                "source": {"id": null, "name": "Local Gazette"},
                "title": "Cat becomes mayor",
                "description": "A cat was elected.",
                "url": "u1",
                "publishedAt": "2025-06-10T08:30:00Z",
                "content": "The town celebrated its new feline leader... [+1200 chars]"
            }),
            json!({
                "source": {"id": "wire", "name": "Wire"},
                "title": "Senate advances tax bill",
                "description": "Senate vote on tax bill.",
                "url": "u2",
                "publishedAt": "2025-06-29T11:21:06Z",
                "content": ""
            }),
            json!({"title": "[Removed]", "url": "removed"}),
        ]
    }

    fn templates() -> Vec<MemeTemplate> {
        vec![MemeTemplate {
            id: "drake".to_string(),
            name: "Drake Hotline Bling".to_string(),
            description: "Drake rejects one thing and approves another".to_string(),
            usage_context: "Preferences".to_string(),
        }]
    }

    fn pipeline(generator: Arc<ScriptedGenerator>, records: Vec<Value>) -> MemePipeline {
        MemePipeline::new(
            Arc::new(StubNews { records }),
            Arc::new(InMemoryTemplateStore::new(templates())),
            generator,
            PipelineConfig::default(),
        )
        .with_sampler(TemplateSampler::from_seed(7, 3))
    }

    fn request(trends: &[&str], memes: i64) -> DigestRequest {
        DigestRequest {
            trends: trends.iter().map(|t| t.to_string()).collect(),
            duration: 1,
            memes,
        }
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let generator = ScriptedGenerator::new(&["[0]", r#"["Drake rejects taxes, approves cat mayors"]"#]);
        let pipeline = pipeline(generator.clone(), news_records());

        let prompts = pipeline.run(&request(&["election", "funny"], 1)).await.unwrap();

        assert_eq!(
            prompts,
            vec![MemePrompt {
                prompt: "Drake rejects taxes, approves cat mayors".to_string(),
                url: "u1".to_string(),
                template_id: "drake".to_string(),
            }]
        );

        let requests = generator.requests.lock();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].user.contains("Cat becomes mayor"));
        assert!(!requests[0].user.contains("Senate"));
        assert!(requests[1].user.contains("The town celebrated its new feline leader..."));
        assert!(!requests[1].user.contains("[+1200 chars]"));
    }

    #[tokio::test]
    async fn test_run_without_articles() {
        let generator = ScriptedGenerator::new(&[]);
        let pipeline = pipeline(generator.clone(), vec![json!({"title": "", "url": "x"})]);

        let result = pipeline.run(&request(&["ai"], 2)).await;
        assert!(matches!(result, Err(PipelineError::NoArticles)));
        assert!(generator.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_bad_requests() {
        let pipeline = pipeline(ScriptedGenerator::new(&[]), news_records());

        assert!(matches!(
            pipeline.run(&request(&["ai"], -1)).await,
            Err(PipelineError::Ranking(RankingError::NegativeCount(-1)))
        ));
        assert!(matches!(
            pipeline.run(&request(&[" "], 1)).await,
            Err(PipelineError::EmptyTrends)
        ));
    }

    #[tokio::test]
    async fn test_zero_memes_skips_generation() {
        let generator = ScriptedGenerator::new(&[]);
        let pipeline = pipeline(generator.clone(), news_records());

        let prompts = pipeline.run(&request(&["ai"], 0)).await.unwrap();
        assert!(prompts.is_empty());
        assert!(generator.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_match_failure_surfaces() {
        let generator = ScriptedGenerator::new(&["[3, 3]"]);
        let pipeline = pipeline(generator, news_records());

        let result = pipeline.run(&request(&["cat", "senate"], 2)).await;
        assert!(matches!(result, Err(PipelineError::Matching(_))));
    }

    #[tokio::test]
    async fn test_unique_templates_enforced_when_configured() {
        let generator = ScriptedGenerator::new(&["[0, 0]"]);
        let config = PipelineConfig {
            matching: MatchOptions {
                enforce_unique_templates: true,
            },
            ..PipelineConfig::default()
        };
        let pipeline = MemePipeline::new(
            Arc::new(StubNews {
                records: news_records(),
            }),
            Arc::new(InMemoryTemplateStore::new(templates())),
            generator,
            config,
        )
        .with_sampler(TemplateSampler::from_seed(7, 3));

        let result = pipeline.run(&request(&["cat", "senate"], 2)).await;
        assert!(matches!(result, Err(PipelineError::Matching(_))));
    }

    #[test]
    fn test_request_defaults() {
        let parsed: DigestRequest = serde_json::from_str(r#"{"trends": ["AI"]}"#).unwrap();
        assert_eq!(parsed, request(&["AI"], 10));

        let empty: DigestRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.trends.is_empty());
    }
}
