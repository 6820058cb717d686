//! Chat-completion client used for matching and prompt writing

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::GenerationError;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// One system + user exchange with a sampling temperature
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
        }
    }
}

/// Anything that turns a request into raw response text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Generator client configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    /// OpenAI-compatible endpoint, `None` for api.openai.com
    pub api_base: Option<String>,
    pub model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Read `GENERATOR_API_KEY` (or `OPENAI_API_KEY`), `GENERATOR_API_BASE`
    /// and `GENERATOR_MODEL`
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var("GENERATOR_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                GenerationError::Config("GENERATOR_API_KEY or OPENAI_API_KEY not set".to_string())
            })?;

        Ok(Self {
            api_key,
            api_base: std::env::var("GENERATOR_API_BASE")
                .ok()
                .filter(|base| !base.trim().is_empty()),
            model: std::env::var("GENERATOR_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }
}

/// Chat-completions client for OpenAI and compatible endpoints
#[derive(Debug, Clone)]
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::Config("generator API key is empty".to_string()));
        }

        let mut openai = OpenAIConfig::new().with_api_key(config.api_key);
        if let Some(base) = config.api_base {
            openai = openai.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(openai),
            model: config.model,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let chat = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system.as_str())
                    .build()
                    .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user.as_str())
                    .build()
                    .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?
                    .into(),
            ])
            .temperature(request.temperature)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;

        let response = self.client.chat().create(chat).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!("Generator returned {} chars", content.len());
        Ok(content)
    }
}

/// Strip an optional markdown code fence from a reply
///
/// The fence's opening line, language tag included, is dropped. The
/// remaining text is returned whole so callers parse exactly what the
/// generator sent.
pub fn extract_json(content: &str) -> Result<&str, GenerationError> {
    let trimmed = content.trim();
    let body = match trimmed.strip_prefix("```") {
        Some(fenced) => {
            let after_tag = fenced.split_once('\n').map_or("", |(_, rest)| rest);
            after_tag.trim_end().strip_suffix("```").unwrap_or(after_tag)
        }
        None => trimmed,
    };

    let body = body.trim();
    if body.is_empty() {
        return Err(GenerationError::NoJson);
    }
    Ok(body)
}
