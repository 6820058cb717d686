//! Service layer for the meme digest
//!
//! Wires the news, ranking and prompt crates into a single
//! [`MemePipeline`] driven by a [`PipelineConfig`].

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{DigestRequest, MemePipeline};
