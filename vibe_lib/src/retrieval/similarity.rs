use crate::error::Error;

/// Cosine of the angle between `a` and `b`.
///
/// A zero-magnitude vector has no direction and scores 0.0 against anything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, Error> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch(a.len(), b.len()));
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f64, 0.0f64, 0.0f64), |(d, aa, bb), (x, y)| {
            let (x, y) = (*x as f64, *y as f64);
            (d + x * y, aa + x * x, bb + y * y)
        });

    if na == 0.0 || nb == 0.0 {
        Ok(0.0)
    } else {
        Ok((dot / (na.sqrt() * nb.sqrt())) as f32)
    }
}
