//! Relevance ranking for the meme digest
//!
//! Articles are scored against the user's keywords with a per-batch TF-IDF
//! model and cosine similarity, then cut down to the top `k`.

pub mod error;
pub mod rank;
pub mod similarity;
pub mod stop_words;
pub mod tfidf;

pub use error::RankingError;
pub use rank::{rank_articles, select_top_k, RankerConfig};
pub use similarity::cosine_similarity;
pub use tfidf::{tokenize, TfidfVectorizer};
