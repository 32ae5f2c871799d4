//! K-Means clustering model fitting and nearest-centroid prediction

use crate::error::{Error, Result};
use linfa::prelude::*;
use linfa_clustering::{KMeans, KMeansInit};
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for the k-means search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Number of independent restarts; the run with the lowest inertia
    /// wins. Lloyd's algorithm only finds a local optimum, so one run is
    /// not enough.
    pub n_init: usize,
    /// Iteration cap per run.
    pub max_iters: usize,
    /// Convergence tolerance on centroid movement.
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_init: 10,
            max_iters: 800,
            tolerance: 1e-4,
        }
    }
}

/// Frozen clustering parameters: the fitted centroids and the inertia of
/// the winning run. Created once by [`fit_kmeans`], then read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedClusterModelState {
    /// Number of clusters.
    pub k: usize,
    /// Cluster centroids in the transformed feature space (k rows).
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares on the training data.
    pub inertia: f64,
}

/// Fit K-Means on a transformed feature matrix.
///
/// Uses k-means++ centroid spreading and `config.n_init` restarts. The
/// whole multi-restart search draws from a single `Isaac64Rng` seeded
/// with `seed`, so identical inputs and seed reproduce identical
/// centroids.
pub fn fit_kmeans(
    matrix: &Array2<f64>,
    k: usize,
    seed: u64,
    config: &KMeansConfig,
) -> Result<FittedClusterModelState> {
    let n_samples = matrix.nrows();
    if k < 1 || k > n_samples {
        return Err(Error::InvalidK { k, max: n_samples });
    }

    let rng = Isaac64Rng::seed_from_u64(seed);
    let targets: Array1<usize> = Array1::zeros(n_samples); // Dummy targets for unsupervised learning
    let dataset = Dataset::new(matrix.clone(), targets);

    let model = KMeans::params_with(k, rng, L2Dist)
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(config.n_init)
        .max_n_iterations(config.max_iters as u64)
        .tolerance(config.tolerance)
        .fit(&dataset)
        .map_err(|e| Error::Fit(e.to_string()))?;

    let centroids = model.centroids().clone();
    let state = FittedClusterModelState {
        k,
        centroids,
        inertia: 0.0,
    };
    let labels = state.assign(matrix)?;
    let inertia = compute_inertia(matrix, &labels, &state.centroids);

    Ok(FittedClusterModelState { inertia, ..state })
}

impl FittedClusterModelState {
    /// Index of the centroid nearest to `features`, by Euclidean
    /// distance. Strict-less comparison keeps the lowest index on ties.
    pub fn predict(&self, features: &ArrayView1<f64>) -> Result<usize> {
        let dim = self.centroids.ncols();
        if features.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: features.len(),
            });
        }

        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.outer_iter().enumerate() {
            let distance: f64 = features
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        Ok(closest_cluster)
    }

    /// Cluster label for every row of a feature matrix.
    pub fn assign(&self, matrix: &Array2<f64>) -> Result<Vec<usize>> {
        matrix.outer_iter().map(|row| self.predict(&row)).collect()
    }

    /// Persist the fitted state as an opaque blob.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a previously persisted state.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(matrix: &Array2<f64>, labels: &[usize], centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;

    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = matrix.row(i);
            let centroid = centroids.row(cluster);
            let distance_sq: f64 = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            inertia += distance_sq;
        }
    }

    inertia
}
