//! Error types for ranking

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    /// A negative number of articles was requested
    #[error("Cannot select a negative number of articles: {0}")]
    NegativeCount(i64),
}
