//! Meme matching and prompt generation
//!
//! Two calls to a chat-completions service turn ranked articles into
//! image prompts: the [`MemeMatcher`] picks a template per article, the
//! [`PromptAssembler`] writes one prompt per matched pair.

pub mod assembler;
pub mod error;
pub mod generator;
pub mod matcher;
pub mod templates;

pub use assembler::{enrich_articles, parse_prompts, prepare_article, EnrichedArticle, PromptAssembler};
pub use error::{GenerationError, MatchError, PromptError, TemplateError};
pub use generator::{extract_json, GenerationRequest, GeneratorConfig, OpenAIGenerator, TextGenerator};
pub use matcher::{build_match_request, validate_assignment, MatchOptions, MemeMatcher};
pub use templates::{
    parse_templates, InMemoryTemplateStore, JsonFileTemplateStore, TemplateSampler, TemplateStore,
    DEFAULT_SAMPLE_FACTOR,
};
