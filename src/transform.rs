//! Feature transformation: standardization of numeric attributes and
//! reference-dropped indicator encoding of categorical attributes.
//!
//! The parameters learned here are frozen into [`FittedTransformerState`]
//! and reused verbatim at inference, so training and inference always see
//! the same feature space. Column layout: the four standardized numeric
//! columns in declared order, then one indicator block per categorical
//! attribute in declared order, with indicator columns following the
//! sorted vocabulary (minus the dropped reference value).

use crate::error::{Error, Result};
use crate::feature::{StudentRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Frozen transformation parameters, produced once by [`FittedTransformerState::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformerState {
    /// Per-numeric-attribute mean, in `NUMERIC_COLUMNS` order.
    means: Vec<f64>,
    /// Per-numeric-attribute population standard deviation. Zero-variance
    /// attributes are stored as 1.0 so the standardized column becomes
    /// all zeros instead of dividing by zero.
    stds: Vec<f64>,
    /// Per-categorical-attribute sorted vocabulary, in `CATEGORICAL_COLUMNS`
    /// order. The first (lexicographically smallest) entry is the dropped
    /// reference category and gets no indicator column.
    vocabularies: Vec<Vec<String>>,
    /// Total width of the output feature vector.
    n_features_out: usize,
}

impl FittedTransformerState {
    /// Learn standardization statistics and categorical vocabularies from
    /// historical records.
    ///
    /// Requires at least 2 records; a standard deviation over a single
    /// observation is meaningless.
    pub fn fit(records: &[StudentRecord]) -> Result<Self> {
        if records.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "need at least 2 records to fit the transformer, got {}",
                records.len()
            )));
        }

        let n = records.len() as f64;
        let mut means = vec![0.0; NUMERIC_COLUMNS.len()];
        let mut stds = vec![0.0; NUMERIC_COLUMNS.len()];

        for record in records {
            for (i, value) in record.numeric_values().iter().enumerate() {
                means[i] += value;
            }
        }
        for mean in means.iter_mut() {
            *mean /= n;
        }

        for record in records {
            for (i, value) in record.numeric_values().iter().enumerate() {
                stds[i] += (value - means[i]).powi(2);
            }
        }
        for std in stds.iter_mut() {
            // Population stddev (ddof = 0); constant attributes fall back
            // to 1.0 so their standardized column is all zeros.
            *std = (*std / n).sqrt();
            if *std == 0.0 {
                *std = 1.0;
            }
        }

        let mut vocabularies = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
        for attr_idx in 0..CATEGORICAL_COLUMNS.len() {
            let distinct: BTreeSet<&str> = records
                .iter()
                .map(|r| r.categorical_values()[attr_idx])
                .collect();
            vocabularies.push(distinct.into_iter().map(str::to_string).collect());
        }

        let n_features_out = NUMERIC_COLUMNS.len()
            + vocabularies
                .iter()
                .map(|v: &Vec<String>| v.len().saturating_sub(1))
                .sum::<usize>();

        Ok(Self {
            means,
            stds,
            vocabularies,
            n_features_out,
        })
    }

    /// Width of the feature vectors this state produces.
    pub fn n_features_out(&self) -> usize {
        self.n_features_out
    }

    /// Per-numeric-attribute means frozen at fit time.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Per-numeric-attribute standard deviations frozen at fit time.
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Transform a batch of records into the fitted feature space.
    pub fn transform(&self, records: &[StudentRecord]) -> Array2<f64> {
        let mut matrix = Array2::zeros((records.len(), self.n_features_out));
        for (row_idx, record) in records.iter().enumerate() {
            let row = self.transform_one(record);
            matrix.row_mut(row_idx).assign(&row);
        }
        matrix
    }

    /// Transform a single record. Pure: identical input yields an
    /// identical vector on every call.
    pub fn transform_one(&self, record: &StudentRecord) -> Array1<f64> {
        let mut features = Vec::with_capacity(self.n_features_out);

        for (i, value) in record.numeric_values().iter().enumerate() {
            features.push((value - self.means[i]) / self.stds[i]);
        }

        for (attr_idx, value) in record.categorical_values().iter().enumerate() {
            let vocabulary = &self.vocabularies[attr_idx];
            // The reference entry vocabulary[0] is dropped; reference and
            // unseen values both encode as an all-zero block.
            for entry in vocabulary.iter().skip(1) {
                features.push(if entry == value { 1.0 } else { 0.0 });
            }
        }

        Array1::from_vec(features)
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
