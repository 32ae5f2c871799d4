//! Error taxonomy shared across the library

use thiserror::Error;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by data loading, fitting, and inference.
///
/// Everything propagates to the caller except `UnknownCluster`, which
/// `InferenceService::classify` recovers from with a placeholder
/// description: a missing description is a data/config mismatch and must
/// never block returning a valid cluster id.
#[derive(Debug, Error)]
pub enum Error {
    /// Input columns do not match the expected attribute set.
    #[error("schema mismatch: missing columns {missing:?}, unexpected columns {unexpected:?}")]
    Schema {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Too few records to fit the transformer.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Requested cluster count is outside the valid range for the dataset.
    #[error("invalid cluster count {k}: must be between 1 and {max} (number of samples)")]
    InvalidK { k: usize, max: usize },

    /// Feature vector length does not match the fitted dimensionality.
    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// No description registered for an otherwise valid cluster id.
    #[error("no description registered for cluster {0}")]
    UnknownCluster(usize),

    /// The clustering backend rejected the fit.
    #[error("k-means fit failed: {0}")]
    Fit(String),

    /// A `--classify` profile string could not be parsed.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("artifact serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = Error::Schema {
            missing: vec!["Teacher_Quality".to_string()],
            unexpected: vec![],
        };
        assert!(err.to_string().contains("Teacher_Quality"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = Error::DimensionMismatch {
            expected: 18,
            got: 4,
        };
        assert!(err.to_string().contains("expected 18"));
        assert!(err.to_string().contains("got 4"));
    }

    #[test]
    fn test_invalid_k_display() {
        let err = Error::InvalidK { k: 0, max: 500 };
        assert!(err.to_string().contains("invalid cluster count 0"));
    }
}
