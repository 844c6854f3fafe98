use crate::types::ranking::RankError;

pub trait Similarity {
    /// Score two vectors of equal length. Callers check dimensions first.
    fn score(&self, item: &[f32], query: &[f32]) -> f64;
}

/// Cosine similarity: dot product over the product of magnitudes.
///
/// A zero-magnitude vector has similarity 0.0 with everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct CosineSimilarity;

impl Similarity for CosineSimilarity {
    fn score(&self, item: &[f32], query: &[f32]) -> f64 {
        let mut dot = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for (&x, &y) in item.iter().zip(query.iter()) {
            let x = f64::from(x);
            let y = f64::from(y);
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let score = dot / (norm_a.sqrt() * norm_b.sqrt());
        if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Checked cosine similarity between two arbitrary vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, RankError> {
    if a.len() != b.len() {
        return Err(RankError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(CosineSimilarity.score(a, b))
}

/// Human-readable explanation attached to each ranked snippet.
pub fn similarity_reason(score: f64) -> String {
    let band = if score > 0.7 {
        "Very similar topic and content approach"
    } else if score > 0.5 {
        "Related topic with overlapping themes"
    } else if score > 0.3 {
        "Similar context or audience interest"
    } else {
        "Weak similarity"
    };
    format!("{band} (score: {score:.2})")
}
