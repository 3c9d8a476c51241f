//! k-means clustering backed by `kmeans_colors`.

use kmeans_colors::get_kmeans;
use palette::Srgb;

use super::{Clusters, RANDOM_SEED};
use crate::PixelSample;

/// Number of seeded restarts; the run with the lowest inertia wins.
pub const RUNS: u64 = 10;

const MAX_ITER: usize = 300;
// Compared against the backend's summed (signed) centroid shift on 0..1 channels,
// so opposite moves can cancel out.
const CONVERGE: f32 = 1e-5;

/// Run k-means `runs` times (at least once) with consecutive seeds and keep the
/// result with the lowest within-cluster squared distance. The earliest seed
/// wins ties.
///
/// Callers must have checked that `1 <= k <= distinct samples`.
pub fn fit(samples: &[PixelSample], k: usize, runs: u64) -> Clusters {
    let buf = normalized(samples);

    let mut best = run(samples, &buf, k, RANDOM_SEED);
    let mut best_inertia = inertia(samples, &best);
    for offset in 1..runs {
        let candidate = run(samples, &buf, k, RANDOM_SEED + offset);
        let candidate_inertia = inertia(samples, &candidate);
        if candidate_inertia < best_inertia {
            best = candidate;
            best_inertia = candidate_inertia;
        }
    }

    tracing::debug!(inertia = best_inertia, runs, "k-means finished");
    best
}

/// The backend works on 0..1 channels. The third channel is only a coordinate here,
/// which is why HSV samples can share the same buffer type.
fn normalized(samples: &[PixelSample]) -> Vec<Srgb> {
    samples
        .iter()
        .map(|&[a, b, c]| Srgb::new(a as f32 / 255.0, b as f32 / 255.0, c as f32 / 255.0))
        .collect()
}

/// One seeded k-means run, with centers recomputed from the integer samples.
fn run(samples: &[PixelSample], buf: &[Srgb], k: usize, seed: u64) -> Clusters {
    let result = get_kmeans(k, MAX_ITER, CONVERGE, false, buf, seed);
    let assignments: Vec<usize> = result.indices.iter().map(|&i| i as usize).collect();

    // Exact means, so identical pixels map back to exactly their own value.
    let mut sums = vec![[0u64; 3]; k];
    let mut counts = vec![0u64; k];
    for (&[a, b, c], &cluster) in samples.iter().zip(&assignments) {
        sums[cluster][0] += a as u64;
        sums[cluster][1] += b as u64;
        sums[cluster][2] += c as u64;
        counts[cluster] += 1;
    }

    let centers = result
        .centroids
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(centroid, (sum, &count))| {
            if count == 0 {
                [
                    centroid.red as f64 * 255.0,
                    centroid.green as f64 * 255.0,
                    centroid.blue as f64 * 255.0,
                ]
            } else {
                sum.map(|s| s as f64 / count as f64)
            }
        })
        .collect();

    Clusters {
        centers,
        assignments,
    }
}

/// Total squared distance from each sample to its assigned center.
fn inertia(samples: &[PixelSample], clusters: &Clusters) -> f64 {
    samples
        .iter()
        .zip(&clusters.assignments)
        .map(|(sample, &cluster)| {
            let center = clusters.centers[cluster];
            (0..3)
                .map(|c| {
                    let d = sample[c] as f64 - center[c];
                    d * d
                })
                .sum::<f64>()
        })
        .sum()
}
