use crate::chunk::Chunk;

/// A chunk paired with its similarity to one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChunk<'a> {
    /// The scored chunk
    pub chunk: &'a Chunk,
    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction. If either
/// vector has zero norm the similarity is defined as 0 rather than left
/// undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f64 = a.iter().zip(b).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum();
    let norm_a: f64 = a.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // rounding can push |cos| a hair past 1
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

/// Score every chunk against `query`, in corpus order.
///
/// Each score depends only on the query and that one chunk.
pub fn score_chunks<'a>(query: &[f32], chunks: &'a [Chunk]) -> Vec<ScoredChunk<'a>> {
    chunks
        .iter()
        .map(|chunk| ScoredChunk {
            chunk,
            score: cosine_similarity(query, &chunk.embedding),
        })
        .collect()
}

/// Sort by descending score. The sort is stable, so equal scores keep
/// their corpus order. A NaN score sorts after every number.
pub fn rank(mut scored: Vec<ScoredChunk<'_>>) -> Vec<ScoredChunk<'_>> {
    scored.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    scored
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() { f32::NEG_INFINITY } else { score }
}
