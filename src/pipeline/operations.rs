//! Operation registry and dispatcher
//!
//! Each [`OperationKind`] maps to one transform function. A transform takes
//! the incoming dataset by reference and returns a new dataset, so no step
//! can observe or alter another step's intermediate state.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use super::checkpoint::write_checkpoint;
use super::dataset::Dataset;
use crate::config::{OperationConfig, OperationKind};
use crate::error::{PipelineError, Result};

/// Signature shared by every registered transform
pub type Transform = fn(&Dataset, &OperationConfig) -> Result<Dataset>;

/// Datetime formats accepted by `IndexOperation`, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Date-only formats accepted by `IndexOperation`
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

impl OperationKind {
    /// The transform registered for this kind.
    pub fn transform(self) -> Transform {
        match self {
            OperationKind::IndexOperation => index_operation,
            OperationKind::RemoveColumns => remove_columns,
            OperationKind::ComputeTarget => compute_target,
            OperationKind::Shuffle => shuffle,
            OperationKind::LimitRows => limit_rows,
        }
    }
}

/// Parse `column` as timestamps and promote it to the row key.
pub fn index_operation(ds: &Dataset, op: &OperationConfig) -> Result<Dataset> {
    let name = op.require_column()?;
    let column = ds.column(name, op.kind)?;

    let timestamps = match column.dtype() {
        DataType::Datetime(_, _) => column.clone(),
        DataType::Date => column.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        DataType::String => {
            let millis = column
                .str()?
                .into_iter()
                .map(|value| value.map(|s| parse_timestamp_millis(s, op.kind, name)).transpose())
                .collect::<Result<Vec<Option<i64>>>>()?;
            Column::new(name.into(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        _ => {
            // Numbers and other types are not timestamps; report the first value
            let value = column
                .get(0)
                .map(|v| v.to_string())
                .unwrap_or_default();
            return Err(PipelineError::Parse {
                operation: op.kind,
                column: name.to_string(),
                value,
            });
        }
    };

    ds.clone().with_index(timestamps)
}

fn parse_timestamp_millis(value: &str, operation: OperationKind, column: &str) -> Result<i64> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    Err(PipelineError::Parse {
        operation,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Drop the named columns. Every name must be visible.
pub fn remove_columns(ds: &Dataset, op: &OperationConfig) -> Result<Dataset> {
    let names = op.require_column_names()?;
    for name in names {
        ds.column(name, op.kind)?;
    }
    Ok(ds.without_columns(names))
}

/// Weighted sum per row, written as 1 when `sum >= threshold`, else 0.
///
/// Weighted columns must be numeric and free of nulls and NaN.
pub fn compute_target(ds: &Dataset, op: &OperationConfig) -> Result<Dataset> {
    let weights = op.require_weights()?;
    let target_column = op.require_target_column()?;

    if ds.index_name() == Some(target_column) {
        return Err(PipelineError::validation(format!(
            "{}: target_column '{}' collides with the row key",
            op.kind, target_column
        )));
    }

    let mut sums = vec![0.0f64; ds.height()];
    for weight in weights {
        let values = numeric_values(ds, &weight.name, op.kind)?;
        for (sum, value) in sums.iter_mut().zip(values) {
            *sum += value * weight.weight;
        }
    }

    let target: Vec<i32> = sums
        .iter()
        .map(|&sum| i32::from(sum >= op.threshold))
        .collect();

    ds.clone()
        .with_column(Column::new(target_column.into(), target))
}

/// Values of a visible numeric column as `f64`, failing on nulls and NaN.
pub(crate) fn numeric_values(ds: &Dataset, name: &str, context: impl ToString) -> Result<Vec<f64>> {
    let column = ds.column(name, context.to_string())?;
    column_to_f64(column, context)
}

pub(crate) fn column_to_f64(column: &Column, context: impl ToString) -> Result<Vec<f64>> {
    let dtype = column.dtype();
    if !(dtype.is_primitive_numeric() || dtype.is_bool()) {
        return Err(PipelineError::NonNumericColumn {
            context: context.to_string(),
            column: column.name().to_string(),
            dtype: dtype.to_string(),
        });
    }

    let floats = column.cast(&DataType::Float64)?;
    floats
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.filter(|v| !v.is_nan()).ok_or_else(|| PipelineError::MissingValue {
                context: context.to_string(),
                column: column.name().to_string(),
                row,
            })
        })
        .collect()
}

/// Permute row order; a fixed `random_state` always yields the same permutation.
pub fn shuffle(ds: &Dataset, op: &OperationConfig) -> Result<Dataset> {
    let mut order: Vec<IdxSize> = (0..ds.height() as IdxSize).collect();
    match op.random_state {
        Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => order.shuffle(&mut rand::thread_rng()),
    }
    ds.take_rows(order)
}

/// Keep the first `n_rows` rows; no limit when unset.
pub fn limit_rows(ds: &Dataset, op: &OperationConfig) -> Result<Dataset> {
    match op.n_rows {
        Some(n) => Ok(ds.head(n)),
        None => Ok(ds.clone()),
    }
}

/// Apply one operation, persisting its output when a checkpoint directory is given.
pub fn apply_operation(
    ds: &Dataset,
    op: &OperationConfig,
    checkpoint_dir: Option<&Path>,
) -> Result<Dataset> {
    let result = (op.kind.transform())(ds, op)?;

    if let Some(dir) = checkpoint_dir {
        write_checkpoint(&result, dir, op.kind)?;
    }

    Ok(result)
}

/// Shape of the dataset after one applied operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub kind: OperationKind,
    pub rows: usize,
    pub columns: usize,
}

/// Fold `operations` over `ds` strictly in declared order.
pub fn apply_operations(
    ds: Dataset,
    operations: &[OperationConfig],
    checkpoint_dir: Option<&Path>,
) -> Result<(Dataset, Vec<StepRecord>)> {
    let mut records = Vec::with_capacity(operations.len());
    let mut current = ds;

    for op in operations {
        current = apply_operation(&current, op, checkpoint_dir)?;
        let (rows, columns) = current.shape();
        info!(operation = %op.kind, rows, columns, "applied operation");
        records.push(StepRecord {
            kind: op.kind,
            rows,
            columns,
        });
    }

    Ok((current, records))
}
