//! Training pipeline: from historical records to fitted artifacts and
//! per-cluster diagnostics.
//!
//! Cluster descriptions are derived from the training data in the same
//! run that fits the model and are persisted next to it, so a loaded
//! description table always matches the loaded centroids.

use crate::data;
use crate::error::Result;
use crate::feature::{StudentRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use crate::model::{fit_kmeans, FittedClusterModelState, KMeansConfig};
use crate::transform::FittedTransformerState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Artifact file names inside the model directory.
pub const TRANSFORMER_FILE: &str = "transformer.bin";
pub const KMEANS_FILE: &str = "kmeans.bin";
pub const DESCRIPTIONS_FILE: &str = "descriptions.bin";

/// How many categorical values to report per attribute in diagnostics.
const TOP_N_CATEGORIES: usize = 4;

/// Full training configuration. Defaults mirror the original model fit:
/// 5 clusters, seed 42.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub k: usize,
    pub seed: u64,
    pub kmeans: KMeansConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            k: 5,
            seed: 42,
            kmeans: KMeansConfig::default(),
        }
    }
}

/// Per-cluster diagnostic summary computed over the training records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    /// Number of member records.
    pub size: usize,
    /// Raw-space mean per numeric attribute, in declared order.
    pub numeric_means: Vec<(String, f64)>,
    /// Per categorical attribute, the top values with their share of the
    /// cluster as a percentage, most frequent first.
    pub category_frequencies: Vec<(String, Vec<(String, f64)>)>,
}

/// Human-readable description of one cluster, derived from its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub cluster_id: usize,
    /// One-line characterization, e.g.
    /// "high study hours, high attendance, moderate teacher quality, high assignments".
    pub headline: String,
    /// Raw-space numeric means of the member records.
    pub numeric_means: Vec<(String, f64)>,
    /// Dominant value per categorical attribute with its percentage.
    pub dominant_categories: Vec<(String, String, f64)>,
}

impl ClusterDescription {
    /// Generic stand-in for a cluster id with no registered description.
    pub fn placeholder(cluster_id: usize) -> Self {
        Self {
            cluster_id,
            headline: format!("Cluster {cluster_id} - no description available"),
            numeric_means: Vec::new(),
            dominant_categories: Vec::new(),
        }
    }
}

/// Description lookup table for all clusters of one fitted model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterDescriptions {
    entries: Vec<ClusterDescription>,
}

impl ClusterDescriptions {
    pub fn new(entries: Vec<ClusterDescription>) -> Self {
        Self { entries }
    }

    pub fn get(&self, cluster_id: usize) -> Option<&ClusterDescription> {
        self.entries.iter().find(|d| d.cluster_id == cluster_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterDescription> {
        self.entries.iter()
    }

    /// Persist the description table as an opaque blob.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a previously persisted description table.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}

/// Everything one training run produces.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub transformer: FittedTransformerState,
    pub model: FittedClusterModelState,
    pub descriptions: ClusterDescriptions,
    pub summaries: Vec<ClusterSummary>,
    /// Cluster label of each training record, in input order.
    pub labels: Vec<usize>,
}

impl TrainingOutcome {
    /// Write the three durable artifacts into `dir`, creating it if
    /// needed. The description table is persisted alongside the model so
    /// the two can never go stale relative to each other.
    pub fn persist<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.transformer.save_to_file(dir.join(TRANSFORMER_FILE))?;
        self.model.save_to_file(dir.join(KMEANS_FILE))?;
        self.descriptions.save_to_file(dir.join(DESCRIPTIONS_FILE))?;
        Ok(())
    }

    /// Member count per cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.model.k];
        for &label in &self.labels {
            if label < self.model.k {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Load historical records from CSV and run the full training pipeline.
pub fn train_from_csv<P: AsRef<Path>>(path: P, config: &TrainingConfig) -> Result<TrainingOutcome> {
    let records = data::load_records(path)?;
    train(&records, config)
}

/// Fit transformer and cluster model on historical records, label the
/// records, and derive per-cluster diagnostics and descriptions.
pub fn train(records: &[StudentRecord], config: &TrainingConfig) -> Result<TrainingOutcome> {
    let transformer = FittedTransformerState::fit(records)?;
    let matrix = transformer.transform(records);
    let model = fit_kmeans(&matrix, config.k, config.seed, &config.kmeans)?;
    let labels = model.assign(&matrix)?;

    let summaries = summarize_clusters(records, &labels, config.k);
    let descriptions = derive_descriptions(&summaries, &transformer);

    Ok(TrainingOutcome {
        transformer,
        model,
        descriptions,
        summaries,
        labels,
    })
}

/// Compute per-cluster record counts, raw numeric means, and categorical
/// value frequencies.
pub fn summarize_clusters(
    records: &[StudentRecord],
    labels: &[usize],
    k: usize,
) -> Vec<ClusterSummary> {
    let mut summaries = Vec::with_capacity(k);

    for cluster_id in 0..k {
        let members: Vec<&StudentRecord> = records
            .iter()
            .zip(labels)
            .filter(|(_, &label)| label == cluster_id)
            .map(|(record, _)| record)
            .collect();
        let size = members.len();

        let mut numeric_means = Vec::with_capacity(NUMERIC_COLUMNS.len());
        for (i, column) in NUMERIC_COLUMNS.iter().enumerate() {
            let sum: f64 = members.iter().map(|r| r.numeric_values()[i]).sum();
            let mean = if size > 0 { sum / size as f64 } else { 0.0 };
            numeric_means.push((column.to_string(), mean));
        }

        let mut category_frequencies = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
        for (i, column) in CATEGORICAL_COLUMNS.iter().enumerate() {
            // BTreeMap keeps equal-count values in a stable value order.
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for member in &members {
                *counts.entry(member.categorical_values()[i]).or_default() += 1;
            }
            let mut ranked: Vec<(String, f64)> = counts
                .into_iter()
                .map(|(value, count)| {
                    (value.to_string(), 100.0 * count as f64 / size.max(1) as f64)
                })
                .collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            ranked.truncate(TOP_N_CATEGORIES);
            category_frequencies.push((column.to_string(), ranked));
        }

        summaries.push(ClusterSummary {
            cluster_id,
            size,
            numeric_means,
            category_frequencies,
        });
    }

    summaries
}

/// Turn diagnostic summaries into description entries.
///
/// The headline qualifies each numeric attribute by where the cluster
/// mean sits relative to the global training distribution (z-score
/// against the transformer's frozen mean/stddev): beyond +-0.5 counts as
/// high/low, anything closer is moderate.
pub fn derive_descriptions(
    summaries: &[ClusterSummary],
    transformer: &FittedTransformerState,
) -> ClusterDescriptions {
    let entries = summaries
        .iter()
        .map(|summary| {
            let qualifiers: Vec<String> = summary
                .numeric_means
                .iter()
                .enumerate()
                .map(|(i, (column, mean))| {
                    let z = (mean - transformer.means()[i]) / transformer.stds()[i];
                    let level = if z > 0.5 {
                        "high"
                    } else if z < -0.5 {
                        "low"
                    } else {
                        "moderate"
                    };
                    format!("{level} {}", humanize_column(column))
                })
                .collect();

            let dominant_categories = summary
                .category_frequencies
                .iter()
                .filter_map(|(column, ranked)| {
                    ranked
                        .first()
                        .map(|(value, pct)| (column.clone(), value.clone(), *pct))
                })
                .collect();

            ClusterDescription {
                cluster_id: summary.cluster_id,
                headline: qualifiers.join(", "),
                numeric_means: summary.numeric_means.clone(),
                dominant_categories,
            }
        })
        .collect();

    ClusterDescriptions::new(entries)
}

fn humanize_column(column: &str) -> String {
    column.replace('_', " ").to_lowercase()
}
