//! Gaussian mixture clustering.
//!
//! Models the samples as a weighted sum of `k` three-dimensional Gaussians:
//!
//! ```text
//! P(x) = Σ π_j × N(x | μ_j, Σ_j)
//! ```
//!
//! fitted by expectation-maximization:
//! 1. **E-step**: responsibilities `P(component j | sample x)`
//! 2. **M-step**: re-estimate `π`, `μ`, `Σ` from those responsibilities
//! 3. repeat until the mean log-likelihood moves less than [`TOLERANCE`]
//!
//! Responsibilities start from a single seeded k-means run, so the result is
//! deterministic. Every covariance gets [`REG_COVAR`] added to its diagonal,
//! which keeps clusters of identical pixels positive definite.

use std::f64::consts::PI;

use super::{Clusters, centroid};
use crate::{PaletteError, PixelSample, Result};

const MAX_ITER: usize = 100;
pub const TOLERANCE: f64 = 1e-3;
pub const REG_COVAR: f64 = 1e-6;

type Vec3 = [f64; 3];
type Mat3 = [[f64; 3]; 3];

#[derive(Debug, Clone)]
struct Component {
    log_weight: f64,
    mean: Vec3,
    /// Lower Cholesky factor of the covariance.
    chol: Mat3,
    log_det: f64,
}

impl Component {
    fn log_density(&self, x: &Vec3) -> f64 {
        let d = [x[0] - self.mean[0], x[1] - self.mean[1], x[2] - self.mean[2]];
        let z = forward_substitute(&self.chol, &d);
        let mahalanobis = z[0] * z[0] + z[1] * z[1] + z[2] * z[2];
        -0.5 * (3.0 * (2.0 * PI).ln() + self.log_det + mahalanobis)
    }
}

/// Fit a `k`-component mixture and hard-assign every sample to its most likely component.
pub fn fit(samples: &[PixelSample], k: usize) -> Result<Clusters> {
    let points: Vec<Vec3> = samples.iter().map(|&s| s.map(f64::from)).collect();

    let init = centroid::fit(samples, k, 1);
    let mut resp = vec![0.0; points.len() * k];
    for (row, &cluster) in resp.chunks_exact_mut(k).zip(&init.assignments) {
        row[cluster] = 1.0;
    }

    let mut components = m_step(&points, &resp, k)?;
    let mut lower_bound = f64::NEG_INFINITY;
    let mut converged = false;

    for iteration in 1..=MAX_ITER {
        let previous = lower_bound;
        lower_bound = e_step(&points, &components, &mut resp);
        if !lower_bound.is_finite() {
            return Err(PaletteError::Extraction(format!(
                "mixture log-likelihood diverged at iteration {iteration}"
            )));
        }
        components = m_step(&points, &resp, k)?;

        if (lower_bound - previous).abs() < TOLERANCE {
            tracing::debug!(iteration, lower_bound, "mixture converged");
            converged = true;
            break;
        }
    }
    if !converged {
        tracing::warn!(
            max_iter = MAX_ITER,
            lower_bound,
            "mixture did not converge, using last estimate"
        );
    }

    // One more E-step so assignments agree with the returned means.
    e_step(&points, &components, &mut resp);
    let assignments = resp.chunks_exact(k).map(argmax).collect();
    let centers = components.iter().map(|c| c.mean).collect();

    Ok(Clusters {
        centers,
        assignments,
    })
}

/// Replace log-probabilities in `resp` by normalized responsibilities.
/// Returns the mean log-likelihood of the samples.
fn e_step(points: &[Vec3], components: &[Component], resp: &mut [f64]) -> f64 {
    let k = components.len();
    let mut total = 0.0;

    for (x, row) in points.iter().zip(resp.chunks_exact_mut(k)) {
        for (component, r) in components.iter().zip(row.iter_mut()) {
            *r = component.log_weight + component.log_density(x);
        }
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_sum = max + row.iter().map(|r| (r - max).exp()).sum::<f64>().ln();
        for r in row.iter_mut() {
            *r = (*r - log_sum).exp();
        }
        total += log_sum;
    }

    total / points.len() as f64
}

fn m_step(points: &[Vec3], resp: &[f64], k: usize) -> Result<Vec<Component>> {
    let n = points.len() as f64;

    (0..k)
        .map(|j| {
            let column = || resp.iter().skip(j).step_by(k).copied().zip(points);

            let mut weight = 0.0;
            let mut sum = [0.0; 3];
            for (r, x) in column() {
                weight += r;
                for c in 0..3 {
                    sum[c] += r * x[c];
                }
            }
            // Floor only matters for components that lost all their samples.
            let weight = weight.max(10.0 * f64::EPSILON);
            let mean = sum.map(|s| s / weight);

            let mut cov = [[0.0; 3]; 3];
            for (r, x) in column() {
                let d = [x[0] - mean[0], x[1] - mean[1], x[2] - mean[2]];
                for a in 0..3 {
                    for b in 0..=a {
                        cov[a][b] += r * d[a] * d[b];
                    }
                }
            }
            for a in 0..3 {
                for b in 0..=a {
                    cov[a][b] /= weight;
                    cov[b][a] = cov[a][b];
                }
                cov[a][a] += REG_COVAR;
            }

            let chol = cholesky(&cov).ok_or_else(|| {
                PaletteError::Extraction(format!(
                    "covariance of mixture component {j} is not positive definite"
                ))
            })?;
            let log_det = 2.0 * (0..3).map(|a| chol[a][a].ln()).sum::<f64>();

            Ok(Component {
                log_weight: (weight / n).ln(),
                mean,
                chol,
                log_det,
            })
        })
        .collect()
}

fn cholesky(m: &Mat3) -> Option<Mat3> {
    let mut l = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..=i {
            let s: f64 = (0..j).map(|p| l[i][p] * l[j][p]).sum();
            if i == j {
                let d = m[i][i] - s;
                if d.is_nan() || d <= 0.0 {
                    return None;
                }
                l[i][i] = d.sqrt();
            } else {
                l[i][j] = (m[i][j] - s) / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L z = d` for lower-triangular `L`.
fn forward_substitute(l: &Mat3, d: &Vec3) -> Vec3 {
    let z0 = d[0] / l[0][0];
    let z1 = (d[1] - l[1][0] * z0) / l[1][1];
    let z2 = (d[2] - l[2][0] * z0 - l[2][1] * z1) / l[2][2];
    [z0, z1, z2]
}

/// Index of the largest value; the lowest index wins ties.
fn argmax(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_p), (i, &p)| {
            if p > best_p { (i, p) } else { (best, best_p) }
        })
        .0
}
