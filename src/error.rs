//! Error types for configuration loading and pipeline execution.
//!
//! Every failure aborts the current run. Variants carry the operation (or
//! pipeline stage) and the column or field involved so a misconfigured
//! document can be diagnosed from the message alone.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::OperationKind;

/// Errors raised while loading a configuration or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or out-of-range configuration, detected before any data is read.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// The configuration document does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// An operation descriptor lacks a field its kind needs.
    #[error("{operation}: required field '{field}' is not set")]
    MissingField {
        operation: OperationKind,
        field: &'static str,
    },

    /// A referenced column is not part of the visible column set.
    #[error("{context}: column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        context: String,
        column: String,
        available: Vec<String>,
    },

    /// A value could not be parsed into the type an operation requires.
    #[error("{operation}: cannot parse value '{value}' in column '{column}' as a timestamp")]
    Parse {
        operation: OperationKind,
        column: String,
        value: String,
    },

    /// Numeric data was required but the column holds another type.
    #[error("{context}: column '{column}' must be numeric, found {dtype}")]
    NonNumericColumn {
        context: String,
        column: String,
        dtype: String,
    },

    /// A null value where a value is required.
    #[error("{context}: column '{column}' has a missing value at row {row}")]
    MissingValue {
        context: String,
        column: String,
        row: usize,
    },

    /// The target column holds values outside {0, 1}.
    #[error("Target column '{column}' must be binary 0/1, found values {values:?}")]
    NonBinaryTarget { column: String, values: Vec<String> },

    /// Splitting left one of the partitions without rows.
    #[error("The {0} partition is empty; adjust the split ratio or the row count")]
    EmptyPartition(&'static str),

    /// The dataset is absent locally and no download URL is configured.
    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// Fetching the dataset from its remote source failed.
    #[error("Failed to download dataset from {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The classifier could not be trained.
    #[error("Training failed: {0}")]
    Training(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_column(
        context: impl ToString,
        column: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::MissingColumn {
            context: context.to_string(),
            column: column.into(),
            available,
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, PipelineError>;
