//! Shared test utilities and fixture generators

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tabpipe::pipeline::Dataset;
use tempfile::TempDir;

/// Name of the CSV file written by [`create_pipeline_fixture`]
pub const DATASET_FILE: &str = "data/measurements.csv";

/// Create a DataFrame resembling a sensor export
///
/// This DataFrame includes:
/// - `Time`: hourly timestamps as strings
/// - `id`: row identifier (noise for the model, removed by the pipeline)
/// - `f1`, `f2`: numeric features; `f1 - f2 >= 0` defines the target
pub fn create_measurement_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let time: Vec<String> = (0..rows)
        .map(|i| {
            (start + Duration::hours(i as i64))
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .collect();
    let id: Vec<i64> = (0..rows as i64).collect();
    let f1: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>() * 100.0).collect();
    let f2: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>() * 100.0).collect();

    df! {
        "Time" => time,
        "id" => id,
        "f1" => f1,
        "f2" => f2,
    }
    .unwrap()
}

/// Small frame with a row counter, used by ordering tests
pub fn create_counter_dataset(rows: usize) -> Dataset {
    let row: Vec<i64> = (0..rows as i64).collect();
    let double: Vec<i64> = row.iter().map(|v| v * 2).collect();
    Dataset::new(
        df! {
            "row" => row,
            "double" => double,
        }
        .unwrap(),
    )
}

/// Write a DataFrame as CSV at `dir/relative`, creating parent directories
pub fn write_csv(dir: &Path, relative: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Operations used by the end-to-end fixture
pub const PIPELINE_OPERATIONS: &str = r#"
operations:
  - type: IndexOperation
    column: Time
  - type: RemoveColumns
    columns: [id]
  - type: ComputeTarget
    columns:
      - name: f1
        weight: 1.0
      - name: f2
        weight: -1.0
    target_column: target
    threshold: 0.0
  - type: Shuffle
    random_state: 42
  - type: LimitRows
    n_rows: 150
"#;

/// Write a complete pipeline fixture: dataset plus `pipeline.yaml` next to it
///
/// Returns the temp dir (keep it alive) and the config path.
pub fn create_pipeline_fixture(extra_yaml: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let mut df = create_measurement_dataframe(200, 7);
    write_csv(temp_dir.path(), DATASET_FILE, &mut df);

    let yaml = format!(
        "version: \"1.0\"\ndataset_file: {}\ntarget: target\nsplitting:\n  train: 0.8\n  validation: 0.2\n{}{}",
        DATASET_FILE, PIPELINE_OPERATIONS, extra_yaml
    );
    let config_path = write_config(temp_dir.path(), "pipeline.yaml", &yaml);
    (temp_dir, config_path)
}

/// Write a configuration document into `dir`
pub fn write_config(dir: &Path, name: &str, yaml: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, yaml).unwrap();
    path
}

/// Integer values of a column, in row order
pub fn i64_values(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

/// Assert that a dataset has the expected visible shape
pub fn assert_shape(ds: &Dataset, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = ds.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a dataset exposes specific columns
pub fn assert_has_columns(ds: &Dataset, expected_cols: &[&str]) {
    let actual_cols = ds.column_names();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a dataset does NOT expose specific columns
pub fn assert_missing_columns(ds: &Dataset, unexpected_cols: &[&str]) {
    let actual_cols = ds.column_names();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Count CSV files anywhere below `dir`
pub fn count_csv_files(dir: &Path) -> usize {
    let mut count = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            count += count_csv_files(&path);
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            count += 1;
        }
    }
    count
}
