//! Pipeline configuration

use digest_core::{DigestError, DigestResult};
use digest_prompts::{MatchOptions, DEFAULT_SAMPLE_FACTOR};
use digest_ranking::RankerConfig;

/// Tunables for one [`MemePipeline`](crate::MemePipeline)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub ranker: RankerConfig,
    pub matching: MatchOptions,
    /// Candidate templates offered per selected article
    pub sample_factor: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ranker: RankerConfig::default(),
            matching: MatchOptions::default(),
            sample_factor: DEFAULT_SAMPLE_FACTOR,
        }
    }
}

impl PipelineConfig {
    /// Read `TEMPLATE_SAMPLE_FACTOR`, `ENFORCE_UNIQUE_TEMPLATES` and
    /// `RANKING_STEMMING`, keeping defaults for anything unset
    pub fn from_env() -> DigestResult<Self> {
        let mut config = Self::default();

        if let Ok(factor) = std::env::var("TEMPLATE_SAMPLE_FACTOR") {
            config.sample_factor = factor
                .parse()
                .ok()
                .filter(|f: &usize| *f > 0)
                .ok_or_else(|| {
                    DigestError::config(format!(
                        "TEMPLATE_SAMPLE_FACTOR must be a positive integer: {}",
                        factor
                    ))
                })?;
        }
        if let Ok(flag) = std::env::var("ENFORCE_UNIQUE_TEMPLATES") {
            config.matching.enforce_unique_templates =
                parse_flag("ENFORCE_UNIQUE_TEMPLATES", &flag)?;
        }
        if let Ok(flag) = std::env::var("RANKING_STEMMING") {
            config.ranker.stemming = parse_flag("RANKING_STEMMING", &flag)?;
        }

        Ok(config)
    }
}

fn parse_flag(name: &str, value: &str) -> DigestResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DigestError::config(format!(
            "{} must be a boolean: {}",
            name, other
        ))),
    }
}
