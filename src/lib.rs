//! StudentClusters: K-Means segmentation of student profiles
//!
//! This library groups students into clusters based on study habits,
//! school environment, and family/support attributes, and answers which
//! cluster a single new profile belongs to. Fitting and inference share
//! one feature transformation so predictions stay consistent with the
//! statistics frozen at training time.

pub mod cli;
pub mod data;
pub mod error;
pub mod feature;
pub mod infer;
pub mod model;
pub mod pipeline;
pub mod transform;

// Re-export public items for easier access
pub use cli::Args;
pub use data::load_records;
pub use error::{Error, Result};
pub use feature::{StudentRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
pub use infer::{Classification, InferenceService};
pub use model::{fit_kmeans, FittedClusterModelState, KMeansConfig};
pub use pipeline::{
    train, train_from_csv, ClusterDescription, ClusterDescriptions, ClusterSummary,
    TrainingConfig, TrainingOutcome,
};
pub use transform::FittedTransformerState;
