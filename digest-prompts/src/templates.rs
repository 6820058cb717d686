//! Meme template sources and random sampling

use std::path::PathBuf;

use async_trait::async_trait;
use digest_core::MemeTemplate;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{RngCore, SeedableRng};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::TemplateError;

/// Default number of candidate templates offered per article
pub const DEFAULT_SAMPLE_FACTOR: usize = 3;

/// Read-only source of meme templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn load(&self) -> Result<Vec<MemeTemplate>, TemplateError>;
}

/// Templates kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    templates: Vec<MemeTemplate>,
}

impl InMemoryTemplateStore {
    pub fn new(templates: Vec<MemeTemplate>) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn load(&self) -> Result<Vec<MemeTemplate>, TemplateError> {
        Ok(self.templates.clone())
    }
}

/// Templates read from a JSON array on disk
///
/// Entries without an `id` are given `local_{i}` from their position.
#[derive(Debug, Clone)]
pub struct JsonFileTemplateStore {
    path: PathBuf,
}

impl JsonFileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TemplateStore for JsonFileTemplateStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<MemeTemplate>, TemplateError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let templates = parse_templates(&raw)?;
        info!("Loaded {} meme templates", templates.len());
        Ok(templates)
    }
}

/// Parse a JSON array of template objects
pub fn parse_templates(raw: &str) -> Result<Vec<MemeTemplate>, TemplateError> {
    let entries = match serde_json::from_str::<Value>(raw)? {
        Value::Array(entries) => entries,
        _ => {
            return Err(TemplateError::InvalidFormat(
                "templates must be a JSON array".to_string(),
            ))
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let Value::Object(mut fields) = entry else {
                return Err(TemplateError::InvalidFormat(format!(
                    "template {} is not an object",
                    i
                )));
            };

            let id = match fields.remove("id") {
                Some(Value::String(id)) if !id.is_empty() => id,
                Some(Value::Number(id)) => id.to_string(),
                _ => format!("local_{}", i),
            };
            fields.insert("id".to_string(), Value::String(id));

            let template: MemeTemplate = serde_json::from_value(Value::Object(fields))?;
            if template.description.trim().is_empty() {
                return Err(TemplateError::InvalidFormat(format!(
                    "template {} has no description",
                    i
                )));
            }
            Ok(template)
        })
        .collect()
}

/// Draws candidate templates for a batch of articles
pub struct TemplateSampler {
    rng: Mutex<Box<dyn RngCore + Send>>,
    factor: usize,
}

impl std::fmt::Debug for TemplateSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSampler")
            .field("factor", &self.factor)
            .finish_non_exhaustive()
    }
}

impl TemplateSampler {
    pub fn new(rng: impl RngCore + Send + 'static, factor: usize) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            factor,
        }
    }

    /// Reproducible sampler for tests and replays
    pub fn from_seed(seed: u64, factor: usize) -> Self {
        Self::new(StdRng::seed_from_u64(seed), factor)
    }

    pub fn from_os_rng(factor: usize) -> Self {
        Self::new(StdRng::from_os_rng(), factor)
    }

    /// Pick `article_count * factor` templates without replacement
    ///
    /// When fewer templates exist, all of them are returned shuffled.
    pub fn sample(&self, templates: &[MemeTemplate], article_count: usize) -> Vec<MemeTemplate> {
        if article_count == 0 {
            return Vec::new();
        }

        let wanted = article_count.saturating_mul(self.factor);
        let mut rng = self.rng.lock();

        if templates.len() <= wanted {
            debug!(
                "Only {} templates for {} wanted, using all",
                templates.len(),
                wanted
            );
            let mut all = templates.to_vec();
            all.shuffle(&mut *rng);
            return all;
        }

        templates
            .choose_multiple(&mut *rng, wanted)
            .cloned()
            .collect()
    }
}
