//! Integration tests for complete pipeline runs

use std::path::Path;

use ndarray::{Array1, Array2};
use polars::prelude::*;
use tabpipe::config::{load_config, OperationKind};
use tabpipe::pipeline::*;
use tabpipe::{PipelineError, Result};
use tempfile::TempDir;

mod common;

use common::*;

/// Predicts the same label for every row
struct ConstantClassifier {
    label: usize,
    fitted_rows: usize,
}

impl Classifier for ConstantClassifier {
    fn fit(&mut self, features: &Array2<f64>, _labels: &Array1<usize>) -> Result<()> {
        self.fitted_rows = features.nrows();
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(Array1::from_elem(features.nrows(), self.label))
    }
}

fn checkpoint_yaml(root: &Path) -> String {
    format!("checkpoint_path: {}\n", root.display())
}

fn checkpoint_rows(path: &Path) -> usize {
    std::fs::read_to_string(path).unwrap().lines().count() - 1
}

#[test]
fn test_end_to_end_accuracy() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();

    let run = execute(&config, tmp.path()).unwrap();

    assert_eq!(run.loaded_shape, (200, 4));
    assert_eq!(run.train_rows, 120);
    assert_eq!(run.validation_rows, 30);
    assert!(
        run.result.library_accuracy >= 0.5,
        "accuracy {} below chance",
        run.result.library_accuracy
    );
    assert!(run.result.library_accuracy <= 1.0);
}

#[test]
fn test_library_and_manual_accuracy_agree() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();

    let result = run_pipeline(&config, tmp.path()).unwrap();

    assert!(
        (result.library_accuracy - result.manual_accuracy).abs() < 1e-9,
        "library {} vs manual {}",
        result.library_accuracy,
        result.manual_accuracy
    );
    assert!(result.agrees(1e-9));
}

#[test]
fn test_runs_are_reproducible() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();

    let first = run_pipeline(&config, tmp.path()).unwrap();
    let second = run_pipeline(&config, tmp.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_steps_are_recorded_in_order() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();

    let run = execute(&config, tmp.path()).unwrap();

    let kinds: Vec<OperationKind> = run.steps.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, OperationKind::ALL.to_vec());
    // Time becomes the row key, id is dropped, target is added
    assert_eq!(run.steps[0].columns, 3);
    assert_eq!(run.steps[1].columns, 2);
    assert_eq!(run.steps[2].columns, 3);
    assert_eq!(run.steps[4].rows, 150);
}

#[test]
fn test_checkpoint_per_operation() {
    let checkpoints = TempDir::new().unwrap();
    let (tmp, config_path) = create_pipeline_fixture(&checkpoint_yaml(checkpoints.path()));
    let config = load_config(&config_path).unwrap();

    let run = execute(&config, tmp.path()).unwrap();

    assert_eq!(count_csv_files(checkpoints.path()), config.operations.len());

    let dir = run.checkpoint_dir.unwrap();
    assert!(dir.starts_with(checkpoints.path().join("pipeline").join("1.0")));
    for kind in [
        OperationKind::IndexOperation,
        OperationKind::RemoveColumns,
        OperationKind::ComputeTarget,
        OperationKind::Shuffle,
    ] {
        assert_eq!(checkpoint_rows(&checkpoint_path(&dir, kind)), 200, "{kind}");
    }
    assert_eq!(
        checkpoint_rows(&checkpoint_path(&dir, OperationKind::LimitRows)),
        150
    );
}

#[test]
fn test_no_checkpoints_without_root() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();

    let run = execute(&config, tmp.path()).unwrap();

    assert!(run.checkpoint_dir.is_none());
    // Only the dataset itself
    assert_eq!(count_csv_files(tmp.path()), 1);
}

#[test]
fn test_custom_classifier() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();
    let mut classifier = ConstantClassifier {
        label: 1,
        fitted_rows: 0,
    };

    let run = execute_with(&config, tmp.path(), &mut classifier).unwrap();

    assert_eq!(classifier.fitted_rows, 120);
    assert!(run.result.agrees(1e-9));
    assert!(run.result.library_accuracy >= 0.0 && run.result.library_accuracy <= 1.0);
}

#[test]
fn test_non_binary_target_aborts() {
    let tmp = TempDir::new().unwrap();
    let mut df = create_measurement_dataframe(50, 3);
    write_csv(tmp.path(), DATASET_FILE, &mut df);
    let config_path = write_config(
        tmp.path(),
        "pipeline.yaml",
        &format!(
            "dataset_file: {}\ntarget: f1\nsplitting:\n  train: 0.8\n  validation: 0.2\noperations:\n  - type: RemoveColumns\n    columns: [Time]\n",
            DATASET_FILE
        ),
    );
    let config = load_config(&config_path).unwrap();

    let result = execute(&config, tmp.path());
    match result {
        Err(PipelineError::NonBinaryTarget { column, .. }) => assert_eq!(column, "f1"),
        other => panic!("expected NonBinaryTarget, got {:?}", other.map(|r| r.result)),
    }
}

#[test]
fn test_near_binary_target_aborts() {
    let tmp = TempDir::new().unwrap();
    let mut df = df! {
        "f" => [1.0f64, 2.0, 3.0, 4.0],
        "target" => [1.0f64, 1.0, 0.9999999999, 0.9999999999],
    }
    .unwrap();
    write_csv(tmp.path(), DATASET_FILE, &mut df);
    let config_path = write_config(
        tmp.path(),
        "pipeline.yaml",
        &format!(
            "dataset_file: {}\ntarget: target\nsplitting:\n  train: 0.5\n  validation: 0.5\noperations: []\n",
            DATASET_FILE
        ),
    );
    let config = load_config(&config_path).unwrap();

    let result = execute_with(&config, tmp.path(), &mut RandomForestClassifier::new(3, 1));
    assert!(matches!(
        result,
        Err(PipelineError::NonBinaryTarget { .. })
    ));
}

#[test]
fn test_missing_target_column_aborts() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let mut config = load_config(&config_path).unwrap();
    config.target = "label".to_string();

    let result = execute(&config, tmp.path());
    assert!(matches!(result, Err(PipelineError::MissingColumn { .. })));
}

#[test]
fn test_failing_operation_keeps_earlier_checkpoints() {
    let checkpoints = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let mut df = create_measurement_dataframe(20, 5);
    write_csv(tmp.path(), DATASET_FILE, &mut df);
    let config_path = write_config(
        tmp.path(),
        "broken.yaml",
        &format!(
            "dataset_file: {}\ntarget: target\nsplitting:\n  train: 0.8\n  validation: 0.2\n{}operations:\n  - type: Shuffle\n    random_state: 1\n  - type: RemoveColumns\n    columns: [missing]\n",
            DATASET_FILE,
            checkpoint_yaml(checkpoints.path())
        ),
    );
    let config = load_config(&config_path).unwrap();

    let result = execute(&config, tmp.path());

    assert!(matches!(result, Err(PipelineError::MissingColumn { .. })));
    assert_eq!(count_csv_files(checkpoints.path()), 1);
}

#[test]
fn test_missing_dataset_without_url() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let mut config = load_config(&config_path).unwrap();
    config.dataset_file = "data/absent.csv".to_string();

    let result = execute(&config, tmp.path());
    assert!(matches!(result, Err(PipelineError::DatasetNotFound(_))));
}

#[test]
fn test_unreachable_dataset_url() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let config = load_config(&config_path).unwrap();
    let mut config = config.with_dataset_url("http://127.0.0.1:9/measurements.csv");
    config.dataset_file = "data/remote.csv".to_string();

    let result = execute(&config, tmp.path());

    assert!(matches!(result, Err(PipelineError::Download { .. })));
    assert!(!tmp.path().join("data/remote.csv").exists());
}

#[test]
fn test_empty_validation_partition_aborts() {
    let (tmp, config_path) = create_pipeline_fixture("");
    let mut config = load_config(&config_path).unwrap();
    config.operations.push(tabpipe::config::OperationConfig::limit_rows(Some(1)));
    config.splitting.train = 0.99;

    // One row: floor(0.99) = 0 training rows
    let result = execute(&config, tmp.path());
    assert!(matches!(result, Err(PipelineError::EmptyPartition(_))));
}
