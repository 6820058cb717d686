//! Server configuration and pipeline wiring from the environment

use std::path::PathBuf;
use std::sync::Arc;

use digest_core::{DigestError, DigestResult};
use digest_news::{NewsApiClient, NewsApiConfig};
use digest_prompts::{GeneratorConfig, JsonFileTemplateStore, OpenAIGenerator};
use digest_services::{MemePipeline, PipelineConfig};

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_TEMPLATES_PATH: &str = "database/meme_templates.json";

/// Server settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub templates_path: PathBuf,
}

impl ApiConfig {
    /// Read `SERVER_PORT` and `TEMPLATES_PATH`
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            templates_path: std::env::var("TEMPLATES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATES_PATH)),
        }
    }
}

/// Build the pipeline from NewsAPI, generator and pipeline settings
pub fn build_pipeline(config: &ApiConfig) -> DigestResult<MemePipeline> {
    let news_config = NewsApiConfig::from_env().map_err(|e| DigestError::config(e.to_string()))?;
    let news = NewsApiClient::new(news_config).map_err(|e| DigestError::config(e.to_string()))?;

    let generator_config =
        GeneratorConfig::from_env().map_err(|e| DigestError::config(e.to_string()))?;
    let generator =
        OpenAIGenerator::new(generator_config).map_err(|e| DigestError::config(e.to_string()))?;

    let pipeline_config = PipelineConfig::from_env()?;
    let templates = JsonFileTemplateStore::new(config.templates_path.clone());

    Ok(MemePipeline::new(
        Arc::new(news),
        Arc::new(templates),
        Arc::new(generator),
        pipeline_config,
    ))
}
