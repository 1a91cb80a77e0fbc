//! Cosine similarity ranking
//!
//! Brute-force exact search: every corpus vector is scored against the
//! query. A vector with zero norm (query or corpus side) scores exactly
//! `0.0` instead of propagating NaN into the ranking.

use crate::store::Corpus;
use fye_core::{FyeError, Result, Resume};
use ndarray::{ArrayView1, Axis};
use serde::Serialize;
use std::cmp::Ordering;

/// A ranked corpus record
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult<'a> {
    /// Position of the record in the corpus
    pub index: usize,

    pub record: &'a Resume,

    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Cosine similarity of two equal-length slices
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(FyeError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(cosine(ArrayView1::from(a), ArrayView1::from(b), norm(ArrayView1::from(b))))
}

/// Similarity of every corpus vector to `query`, in corpus order
pub fn score_all(corpus: &Corpus, query: &[f32]) -> Result<Vec<f32>> {
    if corpus.is_empty() {
        return Err(FyeError::EmptyCorpus);
    }
    if query.len() != corpus.dimension() {
        return Err(FyeError::DimensionMismatch {
            expected: corpus.dimension(),
            actual: query.len(),
        });
    }

    let query = ArrayView1::from(query);
    let query_norm = norm(query);

    Ok(corpus
        .embeddings()
        .axis_iter(Axis(0))
        .map(|row| cosine(row, query, query_norm))
        .collect())
}

/// Rank the corpus against `query` and keep the best `top_k`
///
/// Results are ordered by descending score; equal scores keep ascending
/// corpus order. Fewer than `top_k` results come back when the corpus is
/// smaller.
pub fn rank<'a>(corpus: &'a Corpus, query: &[f32], top_k: usize) -> Result<Vec<RankedResult<'a>>> {
    if top_k == 0 {
        return Err(FyeError::InvalidArgument(
            "top_k must be at least 1".to_string(),
        ));
    }

    let scores = score_all(corpus, query)?;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| compare_scores(scores[a], scores[b]).then(a.cmp(&b)));
    order.truncate(top_k);

    tracing::debug!(
        "Ranked {} records, returning {}",
        scores.len(),
        order.len()
    );

    Ok(order
        .into_iter()
        .map(|index| RankedResult {
            index,
            record: &corpus.records()[index],
            score: scores[index],
        })
        .collect())
}

/// Descending order on scores
fn compare_scores(a: f32, b: f32) -> Ordering {
    b.total_cmp(&a)
}

fn norm(v: ArrayView1<'_, f32>) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

fn cosine(v: ArrayView1<'_, f32>, query: ArrayView1<'_, f32>, query_norm: f64) -> f32 {
    let v_norm = norm(v);
    if v_norm == 0.0 || query_norm == 0.0 {
        return 0.0;
    }

    let dot: f64 = v
        .iter()
        .zip(query.iter())
        .map(|(&a, &b)| f64::from(a) * f64::from(b))
        .sum();

    let score = (dot / (v_norm * query_norm)).clamp(-1.0, 1.0) as f32;
    // -0.0 sorts below 0.0 under total_cmp
    if score == 0.0 {
        0.0
    } else {
        score
    }
}
