//! Clustering of pixel samples into palette candidates.
//!
//! Two strategies share one contract: given samples and a cluster count `k`,
//! return `k` floating-point centers plus one cluster index per sample.
//!
//! - [`Model::Centroid`]: k-means (k-means++ seeding, Lloyd iterations) with a
//!   fixed number of seeded restarts, keeping the lowest within-cluster
//!   squared distance.
//! - [`Model::Mixture`]: full-covariance Gaussian mixture fitted with
//!   expectation-maximization; each sample goes to its most probable component.
//!
//! Both are seeded with constants so identical input always yields identical
//! output.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{PaletteError, PixelSample, Result};

pub mod centroid;
pub mod mixture;

/// Largest palette the clustering backends can index.
pub const MAX_COLORS: usize = 256;

/// Seed shared by every stochastic initialization.
pub(crate) const RANDOM_SEED: u64 = 0;

/// Clustering strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
pub enum Model {
    /// k-means.
    #[default]
    #[cfg_attr(feature = "native-bin", value(alias = "kmeans"))]
    Centroid,
    /// Gaussian mixture model.
    #[cfg_attr(feature = "native-bin", value(alias = "gmm"))]
    Mixture,
}

impl Model {
    /// Fit `k` clusters to `samples`.
    ///
    /// Fails with [`PaletteError::InvalidClusterCount`] unless
    /// `1 <= k <= min(distinct samples, MAX_COLORS)`.
    pub fn fit(self, samples: &[PixelSample], k: usize) -> Result<Clusters> {
        check_cluster_count(samples, k)?;
        tracing::debug!(model = %self, k, samples = samples.len(), "fitting clusters");

        let clusters = match self {
            Model::Centroid => centroid::fit(samples, k, centroid::RUNS),
            Model::Mixture => mixture::fit(samples, k)?,
        };

        debug_assert_eq!(clusters.centers.len(), k);
        debug_assert_eq!(clusters.assignments.len(), samples.len());
        Ok(clusters)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Model::Centroid => "centroid",
            Model::Mixture => "mixture",
        })
    }
}

impl FromStr for Model {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "centroid" | "kmeans" => Ok(Model::Centroid),
            "mixture" | "gmm" => Ok(Model::Mixture),
            _ => Err(PaletteError::UnknownModel(s.to_string())),
        }
    }
}

/// Output of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clusters {
    /// One center per cluster, in the sample color space (0–255 per channel).
    pub centers: Vec<[f64; 3]>,
    /// Cluster index for every sample, in sample order.
    pub assignments: Vec<usize>,
}

fn check_cluster_count(samples: &[PixelSample], k: usize) -> Result<()> {
    let distinct = samples.iter().collect::<HashSet<_>>().len();
    let max = distinct.min(MAX_COLORS);
    tracing::debug!(distinct, "counted distinct samples");

    if k == 0 || k > max {
        return Err(PaletteError::InvalidClusterCount { requested: k, max });
    }
    Ok(())
}
