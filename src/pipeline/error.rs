//! Error types for the analysis and evaluation pipeline.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while loading inputs or analysing individual features.
///
/// Loader errors (`MissingArtifact`) abort the enclosing call. The remaining
/// variants are raised per feature and collected by the test selector
/// without stopping the batch.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required input file is absent or could not be parsed.
    #[error("required artifact '{}' could not be loaded: {reason}", .path.display())]
    MissingArtifact { path: PathBuf, reason: String },

    /// A categorical feature's contingency table is not 2x2.
    #[error(
        "feature '{feature}' produced a {rows}x{cols} contingency table; odds ratio requires 2x2"
    )]
    MalformedContingencyTable {
        feature: String,
        rows: usize,
        cols: usize,
    },

    /// A column declared by the schema is not in the frame.
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    /// A diagnosis group has no usable observations for this feature.
    #[error("feature '{feature}' has no observations for diagnosis group {group}")]
    EmptyGroup { feature: String, group: i64 },

    /// Both groups are constant, the t statistic is undefined.
    #[error("feature '{feature}' has zero variance in both diagnosis groups")]
    ZeroVariance { feature: String },

    /// Two inputs that must line up row-for-row do not.
    #[error("{what}: expected {expected} values, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// A label outside the configured label map was observed.
    #[error("label {0} is not present in the label map")]
    UnknownLabel(i64),

    /// A loaded artifact is structurally inconsistent.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl AnalysisError {
    pub fn missing_artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AnalysisError::MissingArtifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
