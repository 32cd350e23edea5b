use tracing::debug;
use crate::error::Error;
use super::cosine_similarity;

/// Ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranking {
    /// Maximum number of results.
    pub top_k: usize,
    /// Minimum similarity (inclusive) a result must reach.
    pub threshold: Option<f32>,
}

/// Item with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    /// Ranked item.
    pub item: T,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Outcome of a ranking.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval<T> {
    /// At least one result, best first.
    Found(Vec<Scored<T>>),
    /// Nothing to return.
    NoResults,
}

impl<T> Retrieval<T> {
    /// Results as a vector, empty for `NoResults`.
    pub fn into_vec(self) -> Vec<Scored<T>> {
        match self {
            Retrieval::Found(v) => v,
            Retrieval::NoResults => vec![],
        }
    }

    /// True for `NoResults`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Retrieval::NoResults)
    }
}

/// Score every candidate against `query` and keep the best.
///
/// Results are in non-increasing score order; equal scores keep their input
/// order. Candidates must share the query's dimensionality.
pub fn rank<T, V>(query: &[f32], candidates: impl IntoIterator<Item = (T, V)>, ranking: &Ranking) -> Result<Retrieval<T>, Error>
    where V: AsRef<[f32]>
{
    if ranking.threshold.is_some_and(|t| !t.is_finite()) {
        return Err(Error::InvalidArgument("similarity threshold must be a finite number"));
    }

    let mut scored = Vec::new();
    let mut total = 0usize;

    for (item, vector) in candidates {
        total += 1;
        let score = cosine_similarity(query, vector.as_ref())?;
        if !score.is_finite() {
            continue;
        }
        if ranking.threshold.is_some_and(|t| score < t) {
            continue;
        }
        scored.push(Scored { item, score });
    }

    // Stable sort, ties stay in input order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(ranking.top_k);

    debug!(candidates = total, kept = scored.len(), top_k = ranking.top_k, threshold = ?ranking.threshold, "ranked");

    if scored.is_empty() {
        Ok(Retrieval::NoResults)
    } else {
        Ok(Retrieval::Found(scored))
    }
}
