//! Ordered train/validation split

use polars::prelude::*;
use tracing::info;

use super::dataset::Dataset;
use crate::error::Result;

/// Feature frames and label series for both partitions.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub x_train: DataFrame,
    pub x_val: DataFrame,
    pub y_train: Series,
    pub y_val: Series,
}

impl SplitData {
    pub fn train_rows(&self) -> usize {
        self.x_train.height()
    }

    pub fn validation_rows(&self) -> usize {
        self.x_val.height()
    }
}

/// Index of the first validation row: `floor(rows * train_ratio)`.
pub fn split_boundary(rows: usize, train_ratio: f64) -> usize {
    ((rows as f64) * train_ratio).floor() as usize
}

/// Split `ds` at the train-ratio boundary, keeping row order.
///
/// Rows `[0, boundary)` train, `[boundary, N)` validate. The target column
/// is separated out as the labels; the row key is not a feature.
pub fn split_dataset(ds: &Dataset, train_ratio: f64, target: &str) -> Result<SplitData> {
    let labels = ds.column(target, "split")?.as_materialized_series().clone();
    let features = ds.visible_frame().drop(target)?;

    let rows = ds.height();
    let boundary = split_boundary(rows, train_ratio).min(rows);

    let split = SplitData {
        x_train: features.slice(0, boundary),
        x_val: features.slice(boundary as i64, rows - boundary),
        y_train: labels.slice(0, boundary),
        y_val: labels.slice(boundary as i64, rows - boundary),
    };

    info!(
        train = split.train_rows(),
        validation = split.validation_rows(),
        "split dataset"
    );
    Ok(split)
}
