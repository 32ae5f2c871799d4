//! Inference service: classify one student profile against fitted state
//!
//! The service owns the fitted transformer, cluster model, and
//! description table, injected at construction or loaded from a model
//! directory. All state is read-only after construction, so a single
//! service can serve any number of classify calls.

use crate::error::{Error, Result};
use crate::feature::StudentRecord;
use crate::model::FittedClusterModelState;
use crate::pipeline::{
    ClusterDescription, ClusterDescriptions, DESCRIPTIONS_FILE, KMEANS_FILE, TRANSFORMER_FILE,
};
use crate::transform::FittedTransformerState;
use serde::Serialize;
use std::path::Path;

/// Result of classifying one profile.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub cluster_id: usize,
    pub description: ClusterDescription,
}

/// Answers "which cluster does this profile belong to, and what does
/// that mean" for one record at a time.
pub struct InferenceService {
    transformer: FittedTransformerState,
    model: FittedClusterModelState,
    descriptions: ClusterDescriptions,
}

impl InferenceService {
    /// Build a service from already-loaded fitted state.
    ///
    /// Rejects mismatched artifacts: the transformer's output width must
    /// equal the centroid dimensionality, otherwise every classify call
    /// would fail anyway.
    pub fn new(
        transformer: FittedTransformerState,
        model: FittedClusterModelState,
        descriptions: ClusterDescriptions,
    ) -> Result<Self> {
        let expected = model.centroids.ncols();
        let got = transformer.n_features_out();
        if expected != got {
            return Err(Error::DimensionMismatch { expected, got });
        }
        Ok(Self {
            transformer,
            model,
            descriptions,
        })
    }

    /// Load all three artifacts from a model directory. Any failure here
    /// is fatal to the caller: without fitted state the service must
    /// refuse to start rather than serve undefined predictions.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let transformer = FittedTransformerState::load_from_file(dir.join(TRANSFORMER_FILE))?;
        let model = FittedClusterModelState::load_from_file(dir.join(KMEANS_FILE))?;
        let descriptions = ClusterDescriptions::load_from_file(dir.join(DESCRIPTIONS_FILE))?;
        Self::new(transformer, model, descriptions)
    }

    /// Number of clusters the loaded model distinguishes.
    pub fn n_clusters(&self) -> usize {
        self.model.k
    }

    /// Classify one profile: transform with the frozen parameters,
    /// assign the nearest centroid, and look up the description.
    ///
    /// A cluster id without a registered description degrades to a
    /// placeholder instead of failing; the id itself is still valid.
    pub fn classify(&self, record: &StudentRecord) -> Result<Classification> {
        let features = self.transformer.transform_one(record);
        let cluster_id = self.model.predict(&features.view())?;

        let description = match self.lookup_description(cluster_id) {
            Ok(description) => description.clone(),
            Err(Error::UnknownCluster(id)) => ClusterDescription::placeholder(id),
            Err(other) => return Err(other),
        };

        Ok(Classification {
            cluster_id,
            description,
        })
    }

    fn lookup_description(&self, cluster_id: usize) -> Result<&ClusterDescription> {
        self.descriptions
            .get(cluster_id)
            .ok_or(Error::UnknownCluster(cluster_id))
    }
}
