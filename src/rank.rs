//! Ordering cluster centers by how many samples they claimed.

/// A cluster center together with its population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCenter {
    /// Index of the cluster in the clustering output.
    pub index: usize,
    pub center: [f64; 3],
    pub population: usize,
}

/// Sort `centers` by descending population, ties broken by ascending cluster index.
///
/// Clusters nobody was assigned to are kept (with population 0) so the
/// palette always has one entry per center.
pub fn rank(centers: &[[f64; 3]], assignments: &[usize]) -> Vec<RankedCenter> {
    let mut counts = vec![0usize; centers.len()];
    for &cluster in assignments {
        counts[cluster] += 1;
    }

    let mut ranked: Vec<RankedCenter> = centers
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (&center, population))| RankedCenter {
            index,
            center,
            population,
        })
        .collect();
    // Stable, so equal populations keep index order.
    ranked.sort_by(|a, b| b.population.cmp(&a.population));

    tracing::debug!(
        populations = ?ranked.iter().map(|r| r.population).collect::<Vec<_>>(),
        "ranked clusters"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn order(ranked: &[RankedCenter]) -> Vec<usize> {
        ranked.iter().map(|r| r.index).collect()
    }

    #[test]
    fn most_populous_first() {
        let centers = [[0.0; 3], [1.0; 3], [2.0; 3]];
        let ranked = rank(&centers, &[2, 1, 2, 2, 1, 0]);
        assert_eq!(order(&ranked), vec![2, 1, 0]);
        assert_eq!(ranked[0].center, [2.0; 3]);
        assert_eq!(
            ranked.iter().map(|r| r.population).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn ties_keep_index_order() {
        let centers = [[0.0; 3], [1.0; 3], [2.0; 3], [3.0; 3]];
        let ranked = rank(&centers, &[3, 1, 3, 1, 0]);
        assert_eq!(order(&ranked), vec![1, 3, 0, 2]);
    }

    #[test]
    fn empty_clusters_are_kept_last() {
        let centers = [[0.0; 3], [1.0; 3], [2.0; 3]];
        let ranked = rank(&centers, &[1, 1]);
        assert_eq!(order(&ranked), vec![1, 0, 2]);
        assert_eq!(ranked[1].population, 0);
        assert_eq!(ranked[2].population, 0);
    }
}
