//! Core types for the meme digest
//!
//! This crate defines the shared data structures used across the digest
//! pipeline: normalized news articles, ranked articles, meme templates,
//! template assignments and the final prompt triples.

pub mod article;
pub mod error;
pub mod template;

pub use article::{Article, RankedArticle, REMOVED_MARKER};
pub use error::{DigestError, DigestResult};
pub use template::{MatchAssignment, MemePrompt, MemeTemplate};
