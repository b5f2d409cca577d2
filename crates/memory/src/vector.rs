//! Vector similarity utilities.

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank items by cosine similarity to a query embedding.
///
/// Returns `(score, item)` pairs sorted by descending score, keeping only
/// items whose score meets `min_score`. Negative scores are clamped to 0.
/// Ties keep input order.
pub fn rank_by_similarity<'a, T>(
    items: impl IntoIterator<Item = (&'a [f32], &'a T)>,
    query_embedding: &[f32],
    limit: usize,
    min_score: f32,
) -> Vec<(f32, &'a T)>
where
    T: 'a,
{
    let mut scored: Vec<(f32, &T)> = items
        .into_iter()
        .filter_map(|(embedding, item)| {
            let sim = cosine_similarity(embedding, query_embedding).max(0.0);
            (sim >= min_score).then_some((sim, item))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
