//! Cosine similarity between TF-IDF vectors

use ndarray::Array1;

/// Cosine similarity between two term vectors
///
/// Formula: cos(θ) = (A · B) / (||A|| ||B||)
///
/// Zero vectors (documents made only of stop words) score 0.0. TF-IDF
/// weights are non-negative, so the result lies in [0, 1].
pub fn cosine_similarity(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    debug_assert_eq!(
        a.len(),
        b.len(),
        "Vectors must share a vocabulary (got {} and {})",
        a.len(),
        b.len()
    );

    let dot_product = a.dot(b);
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(0.0, 1.0)
}
