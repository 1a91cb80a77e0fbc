//! Result assembly for the presentation layer
//!
//! Joins a ranking and a projection into one renderable structure:
//! projected points with hover metadata, highlight styling for the top
//! matches, the query marker, and axis labels with explained variance.

use fye_core::{FyeError, Result};
use fye_vector::{Corpus, Projection2D, RankedResult};
use serde::Serialize;
use std::collections::HashSet;

/// Marker appearance for a projected point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub size: u32,
    pub symbol: &'static str,
}

impl MarkerStyle {
    /// Regular corpus point
    pub const REGULAR: Self = Self {
        color: "lightblue",
        size: 8,
        symbol: "circle",
    };

    /// One of the top matches
    pub const HIGHLIGHTED: Self = Self {
        color: "orange",
        size: 12,
        symbol: "circle",
    };

    /// The query itself
    pub const QUERY: Self = Self {
        color: "red",
        size: 15,
        symbol: "star",
    };
}

/// Metadata shown when hovering a point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverInfo {
    pub name: String,
    pub job_title: String,
    pub years_experience: u32,
    pub top_skills: Vec<String>,
}

impl HoverInfo {
    /// Single-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {} years | {}",
            self.name,
            self.job_title,
            self.years_experience,
            self.top_skills.join(", ")
        )
    }
}

/// A corpus record placed in 2D
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPoint {
    /// Position in the corpus
    pub index: usize,
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub highlighted: bool,
    pub style: MarkerStyle,
    pub hover: HoverInfo,
}

/// The query placed in the same 2D space as the corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub style: MarkerStyle,
}

/// Axis title plus the variance it explains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisInfo {
    pub label: String,
    pub variance_ratio: f64,
}

/// Everything a front end needs to draw a search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderableResultSet {
    /// One point per corpus record, corpus order
    pub points: Vec<RenderPoint>,

    /// Present when the projection was fitted with the query appended
    pub query: Option<QueryPoint>,

    pub axes: [AxisInfo; 2],

    /// Mean score of the ranking, `None` for an empty ranking
    pub mean_similarity: Option<f32>,
}

impl RenderableResultSet {
    /// Points flagged as top matches
    pub fn highlighted(&self) -> impl Iterator<Item = &RenderPoint> {
        self.points.iter().filter(|p| p.highlighted)
    }
}

/// Joins rankings and projections into renderable output
#[derive(Debug, Clone, Default)]
pub struct ResultAssembler {
    query_label: Option<String>,
}

impl ResultAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text shown on the query marker
    pub fn with_query_label(mut self, query: impl Into<String>) -> Self {
        self.query_label = Some(query.into());
        self
    }

    /// Build the renderable result set
    ///
    /// `projection` must hold either one row per corpus record, or one extra
    /// trailing row for the query.
    pub fn assemble(
        &self,
        corpus: &Corpus,
        ranking: &[RankedResult<'_>],
        projection: &Projection2D,
        highlighted_indices: &[usize],
    ) -> Result<RenderableResultSet> {
        let size = corpus.len();
        let has_query = match projection.len() {
            n if n == size => false,
            n if n == size + 1 => true,
            n => {
                return Err(FyeError::DimensionMismatch {
                    expected: size,
                    actual: n,
                })
            }
        };

        if let Some(&index) = highlighted_indices.iter().find(|&&i| i >= size) {
            return Err(FyeError::IndexOutOfRange { index, size });
        }
        let highlighted: HashSet<usize> = highlighted_indices.iter().copied().collect();

        let points = corpus
            .records()
            .iter()
            .enumerate()
            .map(|(index, resume)| {
                let is_highlighted = highlighted.contains(&index);
                RenderPoint {
                    index,
                    id: resume.id,
                    x: projection.coords[[index, 0]],
                    y: projection.coords[[index, 1]],
                    highlighted: is_highlighted,
                    style: if is_highlighted {
                        MarkerStyle::HIGHLIGHTED
                    } else {
                        MarkerStyle::REGULAR
                    },
                    hover: HoverInfo {
                        name: resume.name.clone(),
                        job_title: resume.job_title.clone(),
                        years_experience: resume.years_experience,
                        top_skills: resume.top_skills(3).to_vec(),
                    },
                }
            })
            .collect();

        let query = has_query.then(|| QueryPoint {
            x: projection.coords[[size, 0]],
            y: projection.coords[[size, 1]],
            label: format!("Query: {}", self.query_label.as_deref().unwrap_or("")),
            style: MarkerStyle::QUERY,
        });

        Ok(RenderableResultSet {
            points,
            query,
            axes: axis_info(projection),
            mean_similarity: mean_similarity(ranking),
        })
    }
}

/// Mean score across a ranking
pub fn mean_similarity(ranking: &[RankedResult<'_>]) -> Option<f32> {
    if ranking.is_empty() {
        return None;
    }
    let total: f64 = ranking.iter().map(|r| f64::from(r.score)).sum();
    Some((total / ranking.len() as f64) as f32)
}

fn axis_info(projection: &Projection2D) -> [AxisInfo; 2] {
    [0, 1].map(|axis| {
        let ratio = projection.variance_ratio[axis];
        AxisInfo {
            label: format!(
                "Principal Component {} ({:.1}% variance)",
                axis + 1,
                ratio * 100.0
            ),
            variance_ratio: ratio,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fye_core::Resume;
    use fye_vector::{fit_2d, fit_2d_with_query, rank};

    fn corpus() -> Corpus {
        let records = vec![
            Resume::new(1, "Candidate 1", "")
                .with_job_title("Data Scientist")
                .with_years_experience(3)
                .with_skills(["Python", "PyTorch", "SQL", "Docker"]),
            Resume::new(2, "Candidate 2", "").with_job_title("QA Engineer"),
            Resume::new(3, "Candidate 3", "").with_job_title("Cloud Architect"),
        ];
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        Corpus::new(records, vectors).unwrap()
    }

    #[test]
    fn test_assemble_with_query() {
        let corpus = corpus();
        let query = [1.0f32, 0.0];
        let ranking = rank(&corpus, &query, 2).unwrap();
        let (projection, query_point) = fit_2d_with_query(corpus.embeddings(), &query).unwrap();
        let top: Vec<usize> = ranking.iter().map(|r| r.index).collect();

        let result = ResultAssembler::new()
            .with_query_label("python")
            .assemble(&corpus, &ranking, &projection, &top)
            .unwrap();

        assert_eq!(result.points.len(), 3);
        let highlighted: Vec<usize> = result.highlighted().map(|p| p.index).collect();
        assert_eq!(highlighted, vec![0, 2]);
        assert_eq!(result.points[1].style, MarkerStyle::REGULAR);
        assert_eq!(result.points[2].style, MarkerStyle::HIGHLIGHTED);

        let q = result.query.unwrap();
        assert_eq!([q.x, q.y], query_point);
        assert_eq!(q.label, "Query: python");
        assert_eq!(q.style, MarkerStyle::QUERY);

        assert_eq!(result.points[0].hover.top_skills, vec!["Python", "PyTorch", "SQL"]);
        assert_eq!(result.points[0].x, projection.coords[[0, 0]]);

        let expected_mean = (ranking[0].score + ranking[1].score) / 2.0;
        assert!((result.mean_similarity.unwrap() - expected_mean).abs() < 1e-6);
    }

    #[test]
    fn test_assemble_corpus_only() {
        let corpus = corpus();
        let projection = fit_2d(corpus.embeddings()).unwrap();

        let result = ResultAssembler::new()
            .assemble(&corpus, &[], &projection, &[])
            .unwrap();

        assert!(result.query.is_none());
        assert!(result.mean_similarity.is_none());
        assert_eq!(result.highlighted().count(), 0);
        assert!(result.axes[0].label.starts_with("Principal Component 1 ("));
        assert!(result.axes[0].variance_ratio >= result.axes[1].variance_ratio);
    }

    #[test]
    fn test_assemble_rejects_projection_size() {
        let corpus = corpus();
        let two = Corpus::new(
            vec![Resume::new(1, "a", ""), Resume::new(2, "b", "")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        let projection = fit_2d(two.embeddings()).unwrap();

        assert!(matches!(
            ResultAssembler::new().assemble(&corpus, &[], &projection, &[]),
            Err(FyeError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_assemble_rejects_bad_highlight() {
        let corpus = corpus();
        let projection = fit_2d(corpus.embeddings()).unwrap();

        assert!(matches!(
            ResultAssembler::new().assemble(&corpus, &[], &projection, &[7]),
            Err(FyeError::IndexOutOfRange { index: 7, size: 3 })
        ));
    }

    #[test]
    fn test_axis_label_format() {
        let corpus = corpus();
        let projection = Projection2D {
            variance_ratio: [0.4567, 0.1234],
            ..fit_2d(corpus.embeddings()).unwrap()
        };
        let result = ResultAssembler::new()
            .assemble(&corpus, &[], &projection, &[])
            .unwrap();

        assert_eq!(result.axes[0].label, "Principal Component 1 (45.7% variance)");
        assert_eq!(result.axes[1].label, "Principal Component 2 (12.3% variance)");
    }

    #[test]
    fn test_hover_summary() {
        let corpus = corpus();
        let projection = fit_2d(corpus.embeddings()).unwrap();
        let result = ResultAssembler::new()
            .assemble(&corpus, &[], &projection, &[])
            .unwrap();

        assert_eq!(
            result.points[0].hover.summary(),
            "Candidate 1 | Data Scientist | 3 years | Python, PyTorch, SQL"
        );
    }
}
