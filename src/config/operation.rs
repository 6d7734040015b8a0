//! Operation descriptors - the typed schema of a single transformation step

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// The closed set of transformation kinds a pipeline can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Parse a column as a timestamp and promote it to the row key
    IndexOperation,
    /// Drop named columns
    RemoveColumns,
    /// Weighted sum of columns, binarized against a threshold
    ComputeTarget,
    /// Permute row order
    Shuffle,
    /// Keep the first N rows
    LimitRows,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::IndexOperation,
        OperationKind::RemoveColumns,
        OperationKind::ComputeTarget,
        OperationKind::Shuffle,
        OperationKind::LimitRows,
    ];

    /// Canonical name, as written in configuration documents and checkpoint file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::IndexOperation => "IndexOperation",
            OperationKind::RemoveColumns => "RemoveColumns",
            OperationKind::ComputeTarget => "ComputeTarget",
            OperationKind::Shuffle => "Shuffle",
            OperationKind::LimitRows => "LimitRows",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                PipelineError::validation(format!(
                    "unknown operation type '{}'. Expected one of: {}",
                    s,
                    OperationKind::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}

/// A column and the weight it contributes to a computed target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWeight {
    pub name: String,
    pub weight: f64,
}

impl ColumnWeight {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// The `columns` field: plain names (RemoveColumns) or weighted columns (ComputeTarget).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnsSpec {
    Names(Vec<String>),
    Weighted(Vec<ColumnWeight>),
}

impl ColumnsSpec {
    /// Column names, when given as a plain list.
    pub fn names(&self) -> Option<&[String]> {
        match self {
            ColumnsSpec::Names(names) => Some(names),
            ColumnsSpec::Weighted(_) => None,
        }
    }

    /// Column weights. An empty list deserializes as `Names`, so it counts as no weights.
    pub fn weights(&self) -> Option<&[ColumnWeight]> {
        match self {
            ColumnsSpec::Weighted(weights) => Some(weights),
            ColumnsSpec::Names(names) if names.is_empty() => Some(&[]),
            ColumnsSpec::Names(_) => None,
        }
    }
}

fn default_threshold() -> f64 {
    0.0
}

/// One declared transformation step.
///
/// Only the kind is checked at construction. Fields belonging to other kinds
/// are accepted; a field the kind needs is checked when the step executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationConfig {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_state: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_rows: Option<usize>,
}

impl OperationConfig {
    /// Bare descriptor of the given kind, all optional fields unset.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            column: None,
            columns: None,
            target_column: None,
            threshold: default_threshold(),
            random_state: None,
            n_rows: None,
        }
    }

    pub fn index(column: impl Into<String>) -> Self {
        Self::new(OperationKind::IndexOperation).with_column(column)
    }

    pub fn remove_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(OperationKind::RemoveColumns).with_columns(columns)
    }

    pub fn compute_target(
        weights: Vec<ColumnWeight>,
        target_column: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self::new(OperationKind::ComputeTarget)
            .with_weights(weights)
            .with_target_column(target_column)
            .with_threshold(threshold)
    }

    pub fn shuffle(random_state: Option<u64>) -> Self {
        Self {
            random_state,
            ..Self::new(OperationKind::Shuffle)
        }
    }

    pub fn limit_rows(n_rows: Option<usize>) -> Self {
        Self {
            n_rows,
            ..Self::new(OperationKind::LimitRows)
        }
    }

    /// Parse a single descriptor from a YAML mapping.
    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml::from_str(source)
            .map_err(|e| PipelineError::validation(format!("operation: {}", e)))
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(ColumnsSpec::Names(
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn with_weights(mut self, weights: Vec<ColumnWeight>) -> Self {
        self.columns = Some(ColumnsSpec::Weighted(weights));
        self
    }

    pub fn with_target_column(mut self, target_column: impl Into<String>) -> Self {
        self.target_column = Some(target_column.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// `column`, or `MissingField` naming this operation.
    pub fn require_column(&self) -> Result<&str> {
        self.column.as_deref().ok_or(PipelineError::MissingField {
            operation: self.kind,
            field: "column",
        })
    }

    /// `columns` as plain names.
    pub fn require_column_names(&self) -> Result<&[String]> {
        match &self.columns {
            None => Err(PipelineError::MissingField {
                operation: self.kind,
                field: "columns",
            }),
            Some(columns) => columns.names().ok_or_else(|| {
                PipelineError::validation(format!(
                    "{}: 'columns' must be a list of column names",
                    self.kind
                ))
            }),
        }
    }

    /// `columns` as weighted columns.
    pub fn require_weights(&self) -> Result<&[ColumnWeight]> {
        match &self.columns {
            None => Err(PipelineError::MissingField {
                operation: self.kind,
                field: "columns",
            }),
            Some(columns) => columns.weights().ok_or_else(|| {
                PipelineError::validation(format!(
                    "{}: 'columns' must be a list of {{name, weight}} entries",
                    self.kind
                ))
            }),
        }
    }

    pub fn require_target_column(&self) -> Result<&str> {
        self.target_column
            .as_deref()
            .ok_or(PipelineError::MissingField {
                operation: self.kind,
                field: "target_column",
            })
    }
}
