//! Error types for template loading, matching and prompt generation

use thiserror::Error;

/// Text generation failures
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Failed to build request: {0}")]
    InvalidRequest(String),

    #[error("Empty response from generator")]
    EmptyResponse,

    #[error("No JSON found in response")]
    NoJson,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Template store failures
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read templates: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse templates: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid template file: {0}")]
    InvalidFormat(String),
}

/// Article-to-template matching failures
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Generator failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Response is not valid JSON: {0}")]
    Parse(String),

    #[error("Expected a JSON array of template indices")]
    NotAnArray,

    #[error("Expected {expected} template indices, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid template index at position {position}: {value}")]
    InvalidIndex { position: usize, value: String },

    #[error("Template {0} assigned to more than one article")]
    DuplicateTemplate(usize),

    #[error("No templates available for {0} articles")]
    NoTemplates(usize),
}

/// Prompt generation failures
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Generator failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Response is not valid JSON: {0}")]
    Parse(String),

    #[error("Expected a JSON array of prompt strings")]
    NotAnArray,

    #[error("Expected {expected} prompts, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Prompt at position {0} is not a string")]
    NotAString(usize),

    #[error("Assignment covers {assigned} articles, got {articles}")]
    AssignmentMismatch { articles: usize, assigned: usize },

    #[error("Article {article} assigned to unknown template {template}")]
    MissingTemplate { article: usize, template: usize },
}
