use crate::SimilarityError;

/// Score returned when cosine similarity is undefined (either vector has a
/// zero or non-finite norm). Sits at the bottom of the cosine range so it
/// fails every confidence threshold in `(0, 1]`.
pub const UNDEFINED_SIMILARITY: f32 = -1.0;

/// Cosine similarity `dot(a, b) / (|a| * |b|)` between two equal-length vectors.
///
/// Accumulates in `f64` and clamps to `[-1, 1]` so rounding never pushes a
/// self-comparison above `1.0`. Vectors of different lengths come from
/// mismatched embedding models and are reported as
/// [`SimilarityError::DimensionMismatch`]; nothing is truncated or padded.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return Ok(UNDEFINED_SIMILARITY);
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return Ok(UNDEFINED_SIMILARITY);
    }

    Ok(score.clamp(-1.0, 1.0) as f32)
}
