use crate::core::error::{RecommendError, Result};


/// Cosine similarity of two equal-length vectors, accumulated in `f64`.
///
/// Returns `NaN` when both vectors have zero magnitude; callers must not sort
/// on that value. A single zero-magnitude side yields `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(RecommendError::InvalidInput("cosine similarity of an empty vector".into()));
    }
    if a.len() != b.len() {
        return Err(RecommendError::InvalidInput(format!(
            "vector length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let (mut dot, mut mag_a, mut mag_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 && mag_b == 0.0 {
        return Ok(f64::NAN);
    }
    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (mag_a.sqrt() * mag_b.sqrt()))
}
