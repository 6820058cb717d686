//! Per-batch TF-IDF vectorizer
//!
//! Vocabulary is built from the batch itself, so vectors are only
//! comparable within one call to [`TfidfVectorizer::fit_transform`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::OnceLock;

use ndarray::Array1;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use crate::stop_words::is_stop_word;

fn word_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b\w\w+\b").ok())
        .as_ref()
}

/// Lowercased runs of two or more word characters
pub fn tokenize(text: &str) -> Vec<String> {
    let Some(pattern) = word_pattern() else {
        return Vec::new();
    };
    let lowered = text.to_lowercase();
    pattern
        .find_iter(&lowered)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Smooth-idf TF-IDF with English stop-word removal and optional stemming
pub struct TfidfVectorizer {
    stemmer: Option<Stemmer>,
}

impl fmt::Debug for TfidfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfidfVectorizer")
            .field("stemming", &self.stemmer.is_some())
            .finish()
    }
}

impl TfidfVectorizer {
    pub fn new(stemming: bool) -> Self {
        Self {
            stemmer: stemming.then(|| Stemmer::create(Algorithm::English)),
        }
    }

    /// Terms of one document after stop-word removal and stemming
    pub fn analyze(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|token| !is_stop_word(token))
            .map(|token| match &self.stemmer {
                Some(stemmer) => stemmer.stem(&token).into_owned(),
                None => token,
            })
            .collect()
    }

    /// Fit on `documents` and return one L2-normalized vector per document
    ///
    /// Weights are `count * (ln((1 + n) / (1 + df)) + 1)` over a
    /// lexicographically sorted vocabulary.
    pub fn fit_transform(&self, documents: &[String]) -> Vec<Array1<f64>> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d)).collect();

        let vocabulary: BTreeMap<&str, usize> = analyzed
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for terms in &analyzed {
            let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                if let Some(&idx) = vocabulary.get(term) {
                    document_frequency[idx] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        analyzed
            .iter()
            .map(|terms| {
                let mut counts: HashMap<usize, f64> = HashMap::new();
                for term in terms {
                    if let Some(&idx) = vocabulary.get(term.as_str()) {
                        *counts.entry(idx).or_default() += 1.0;
                    }
                }

                let mut vector = Array1::<f64>::zeros(vocabulary.len());
                for (idx, count) in counts {
                    vector[idx] = count * idf[idx];
                }

                let norm = vector.dot(&vector).sqrt();
                if norm > 0.0 {
                    vector /= norm;
                }
                vector
            })
            .collect()
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(true)
    }
}
