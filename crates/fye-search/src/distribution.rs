//! Similarity score distribution
//!
//! Summarizes the scores of the whole corpus (not only the top-K) for
//! histogram display.

use fye_core::{FyeError, Result};
use serde::Serialize;

/// Default number of histogram bins
pub const DEFAULT_BINS: usize = 30;

/// One equal-width histogram bin, `[start, end)` except the last which is closed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f32,
    pub end: f32,
    pub count: usize,
}

/// Scores of every corpus record plus summary statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDistribution {
    /// Scores in corpus order
    pub scores: Vec<f32>,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub histogram: Vec<HistogramBin>,
}

impl ScoreDistribution {
    /// Summarize `scores` into `bins` equal-width bins spanning min..=max
    pub fn from_scores(scores: Vec<f32>, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(FyeError::InvalidArgument(
                "histogram needs at least one bin".to_string(),
            ));
        }
        if scores.is_empty() {
            return Err(FyeError::EmptyCorpus);
        }

        let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let total: f64 = scores.iter().map(|&s| f64::from(s)).sum();
        let mean = (total / scores.len() as f64) as f32;

        // All-equal scores still get a non-empty span to draw.
        let (lo, hi) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let width = (hi - lo) / bins as f32;

        let mut histogram: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                start: lo + width * i as f32,
                end: if i + 1 == bins {
                    hi
                } else {
                    lo + width * (i + 1) as f32
                },
                count: 0,
            })
            .collect();

        for &score in &scores {
            let slot = (((score - lo) / width) as usize).min(bins - 1);
            histogram[slot].count += 1;
        }

        Ok(Self {
            scores,
            min,
            max,
            mean,
            histogram,
        })
    }

    /// Number of scores summarized
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_score() {
        let scores = vec![0.1, 0.2, 0.25, 0.9, 1.0, 0.5];
        let dist = ScoreDistribution::from_scores(scores, 4).unwrap();

        assert_eq!(dist.histogram.len(), 4);
        assert_eq!(dist.histogram.iter().map(|b| b.count).sum::<usize>(), 6);
        assert_eq!(dist.min, 0.1);
        assert_eq!(dist.max, 1.0);
        // Max lands in the closed last bin.
        assert_eq!(dist.histogram[3].count, 2);
        assert_eq!(dist.histogram[3].end, 1.0);
    }

    #[test]
    fn test_constant_scores() {
        let dist = ScoreDistribution::from_scores(vec![0.0, 0.0, 0.0], DEFAULT_BINS).unwrap();
        assert_eq!(dist.mean, 0.0);
        assert_eq!(dist.histogram.len(), DEFAULT_BINS);
        assert_eq!(dist.histogram.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    proptest::proptest! {
        #[test]
        fn prop_histogram_accounts_for_all_scores(
            scores in proptest::collection::vec(-1.0f32..=1.0, 1..200),
            bins in 1usize..40,
        ) {
            let n = scores.len();
            let dist = ScoreDistribution::from_scores(scores, bins).unwrap();

            proptest::prop_assert_eq!(dist.histogram.len(), bins);
            proptest::prop_assert_eq!(dist.histogram.iter().map(|b| b.count).sum::<usize>(), n);
            proptest::prop_assert!(dist.min <= dist.mean + 1e-6 && dist.mean <= dist.max + 1e-6);
        }
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            ScoreDistribution::from_scores(vec![0.5], 0),
            Err(FyeError::InvalidArgument(_))
        ));
        assert!(matches!(
            ScoreDistribution::from_scores(vec![], 10),
            Err(FyeError::EmptyCorpus)
        ));
    }
}
