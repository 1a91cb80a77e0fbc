//! Variance-maximizing 2D projection (PCA)
//!
//! Centers the input, eigendecomposes its covariance with cyclic Jacobi
//! rotations and projects onto the two leading axes. When there are fewer
//! points than dimensions the (smaller) Gram matrix is decomposed instead
//! and its eigenvectors are mapped back into the source space.
//!
//! # Sign convention
//! Principal axes are only unique up to sign. Each axis is flipped so that
//! its largest-magnitude coefficient is positive (the lowest index wins on
//! ties), which makes output reproducible across runs.
//!
//! Author: hephaex@gmail.com

use fye_core::{FyeError, Result};
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;

/// Maximum number of full Jacobi sweeps.
const MAX_SWEEPS: usize = 100;

/// Total variance below this (relative to the data scale) counts as no spread.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Result of a 2D projection fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection2D {
    /// `N x 2` coordinates, rows in input order
    pub coords: Array2<f64>,

    /// Fraction of total variance explained by each axis
    pub variance_ratio: [f64; 2],

    /// Unit axis directions in the source space (`2 x D`)
    pub components: Array2<f64>,
}

impl Projection2D {
    /// Number of projected points
    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    /// Coordinates of the point at `index`
    pub fn point(&self, index: usize) -> Option<[f64; 2]> {
        (index < self.len()).then(|| [self.coords[[index, 0]], self.coords[[index, 1]]])
    }
}

/// Fit a 2D projection over `vectors` (`N x D`, one row per point)
pub fn fit_2d(vectors: ArrayView2<'_, f32>) -> Result<Projection2D> {
    let (n, d) = vectors.dim();
    if n < 2 {
        return Err(FyeError::InsufficientData(format!(
            "need at least 2 points to project, got {n}"
        )));
    }
    if d < 2 {
        return Err(FyeError::InsufficientData(format!(
            "need at least 2 dimensions to project, got {d}"
        )));
    }

    let data = vectors.mapv(f64::from);
    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| FyeError::InsufficientData("no points to center".to_string()))?;
    let centered = &data - &mean;

    let denom = (n - 1) as f64;
    let total_variance = centered.iter().map(|x| x * x).sum::<f64>() / denom;
    let scale = mean.iter().map(|x| x * x).sum::<f64>() + 1.0;

    if total_variance <= DEGENERATE_TOLERANCE * scale {
        tracing::debug!("Projection input has no spread, collapsing to origin");
        return Ok(Projection2D {
            coords: Array2::zeros((n, 2)),
            variance_ratio: [0.0, 0.0],
            components: Array2::zeros((2, d)),
        });
    }

    let (eigenvalues, mut components) = if d <= n {
        let covariance = centered.t().dot(&centered) / denom;
        leading_axes(covariance, 2)
    } else {
        let gram = centered.dot(&centered.t()) / denom;
        let (eigenvalues, u) = leading_axes(gram, 2);
        let mut components = Array2::<f64>::zeros((2, d));
        for (axis, &lambda) in eigenvalues.iter().enumerate() {
            if lambda <= DEGENERATE_TOLERANCE * total_variance {
                continue;
            }
            let direction = centered.t().dot(&u.row(axis)) / (lambda * denom).sqrt();
            components.row_mut(axis).assign(&direction);
        }
        (eigenvalues, components)
    };

    for mut row in components.axis_iter_mut(Axis(0)) {
        if let Some(pivot) = largest_magnitude(row.view()) {
            if row[pivot] < 0.0 {
                row.mapv_inplace(|x| -x);
            }
        }
    }

    let coords = centered.dot(&components.t());
    let ratio = |lambda: f64| (lambda / total_variance).clamp(0.0, 1.0);
    let first = ratio(eigenvalues[0]);
    let variance_ratio = [first, ratio(eigenvalues[1]).min(first)];

    tracing::debug!(
        "Fitted projection over {} points ({} dims): variance ratio {:.4} / {:.4}",
        n,
        d,
        variance_ratio[0],
        variance_ratio[1]
    );

    Ok(Projection2D {
        coords,
        variance_ratio,
        components,
    })
}

/// Fit over the corpus with `query` appended as the last row
///
/// The basis is computed jointly over corpus and query. Returns the
/// projection (corpus rows first, query last) together with the query's
/// own coordinates.
pub fn fit_2d_with_query(
    vectors: ArrayView2<'_, f32>,
    query: &[f32],
) -> Result<(Projection2D, [f64; 2])> {
    if query.len() != vectors.ncols() {
        return Err(FyeError::DimensionMismatch {
            expected: vectors.ncols(),
            actual: query.len(),
        });
    }

    let query_row = ArrayView1::from(query).insert_axis(Axis(0));
    let joint = concatenate(Axis(0), &[vectors.view(), query_row.view()])
        .map_err(|e| FyeError::Other(e.into()))?;

    let projection = fit_2d(joint.view())?;
    let query_point = projection
        .point(projection.len() - 1)
        .ok_or_else(|| FyeError::InsufficientData("query row missing".to_string()))?;

    Ok((projection, query_point))
}

/// Top `k` eigenpairs of a symmetric matrix, eigenvectors as rows
fn leading_axes(matrix: Array2<f64>, k: usize) -> (Vec<f64>, Array2<f64>) {
    let (eigenvalues, eigenvectors) = symmetric_eigen(matrix);

    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]).then(a.cmp(&b)));
    order.truncate(k);

    let dim = eigenvectors.nrows();
    let mut axes = Array2::zeros((k, dim));
    let mut values = vec![0.0; k];
    for (slot, &i) in order.iter().enumerate() {
        values[slot] = eigenvalues[i].max(0.0);
        axes.row_mut(slot).assign(&eigenvectors.column(i));
    }
    (values, axes)
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix
///
/// Returns the eigenvalues and a matrix whose columns are the matching
/// orthonormal eigenvectors.
fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>();

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= f64::EPSILON * f64::EPSILON * scale || off == 0.0 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

/// Index of the largest |x|, first one on ties; `None` for an all-zero row
fn largest_magnitude(row: ArrayView1<'_, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in row.iter().enumerate() {
        let magnitude = x.abs();
        if magnitude > best.map_or(0.0, |(_, m)| m) {
            best = Some((i, magnitude));
        }
    }
    best.map(|(i, _)| i)
}

/// Corpus rows of a projection fitted with the query appended
pub fn corpus_rows(projection: &Projection2D, corpus_len: usize) -> ArrayView2<'_, f64> {
    projection.coords.slice(s![..corpus_len.min(projection.len()), ..])
}
