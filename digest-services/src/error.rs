//! Pipeline errors and their mapping onto `DigestError`

use digest_core::DigestError;
use digest_news::NewsError;
use digest_prompts::{MatchError, PromptError, TemplateError};
use digest_ranking::RankingError;

/// Errors that can occur while running the digest pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("At least one trend keyword is required")]
    EmptyTrends,

    #[error("News error: {0}")]
    News(#[from] NewsError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("Template error: {0}")]
    Templates(#[from] TemplateError),

    #[error("Matching failed: {0}")]
    Matching(#[from] MatchError),

    #[error("Prompt generation failed: {0}")]
    Prompts(#[from] PromptError),

    #[error("No articles found for the given trends")]
    NoArticles,
}

impl From<PipelineError> for DigestError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::EmptyTrends | PipelineError::Ranking(_) => {
                DigestError::invalid_input(message)
            }
            PipelineError::NoArticles => DigestError::not_found(message),
            PipelineError::News(NewsError::RequestFailed(_)) => DigestError::network(message),
            PipelineError::News(NewsError::ParseError(_)) => DigestError::parse(message),
            PipelineError::News(NewsError::EmptyQuery) => DigestError::invalid_input(message),
            PipelineError::News(NewsError::InvalidConfig(_)) => DigestError::config(message),
            PipelineError::News(NewsError::ApiError { .. })
            | PipelineError::Matching(_)
            | PipelineError::Prompts(_) => DigestError::api(message),
            PipelineError::Templates(_) => DigestError::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_onto_digest_error() {
        assert!(matches!(
            DigestError::from(PipelineError::Ranking(RankingError::NegativeCount(-2))),
            DigestError::InvalidInput(_)
        ));
        assert!(matches!(
            DigestError::from(PipelineError::NoArticles),
            DigestError::NotFound(_)
        ));
        assert!(matches!(
            DigestError::from(PipelineError::News(NewsError::RequestFailed("timeout".into()))),
            DigestError::Network(_)
        ));

        let err = DigestError::from(PipelineError::Matching(MatchError::NotAnArray));
        assert!(err.to_string().contains("Matching failed"));
    }
}
