//! Pipeline orchestration: load, transform, check, split, train, evaluate

use std::path::{Path, PathBuf};

use tracing::info;

use super::evaluate::{train_and_evaluate, Classifier, RandomForestClassifier, RunResult};
use super::loader::{ensure_dataset, load_dataset};
use super::operations::{apply_operations, StepRecord};
use super::split::split_dataset;
use super::target::check_binary_target;
use crate::config::PipelineConfig;
use crate::error::Result;

/// Everything a completed run reports
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub result: RunResult,
    /// `(rows, columns)` of the dataset as loaded
    pub loaded_shape: (usize, usize),
    pub steps: Vec<StepRecord>,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub checkpoint_dir: Option<PathBuf>,
}

/// Run the pipeline with the default classifier and return both accuracies.
pub fn run_pipeline(config: &PipelineConfig, base_path: &Path) -> Result<RunResult> {
    execute(config, base_path).map(|run| run.result)
}

/// Run the pipeline with the default classifier.
pub fn execute(config: &PipelineConfig, base_path: &Path) -> Result<PipelineRun> {
    execute_with(config, base_path, &mut RandomForestClassifier::default())
}

/// Run the pipeline with a caller-supplied classifier.
///
/// `base_path` is the directory the dataset file is resolved against.
/// Any failure aborts the run; checkpoints written by earlier steps remain.
pub fn execute_with<C: Classifier>(
    config: &PipelineConfig,
    base_path: &Path,
    classifier: &mut C,
) -> Result<PipelineRun> {
    let dataset_path = ensure_dataset(config, base_path)?;
    let dataset = load_dataset(&dataset_path)?;
    let loaded_shape = dataset.shape();

    let checkpoint_dir = config.checkpoint_dir()?;
    let (dataset, steps) =
        apply_operations(dataset, &config.operations, checkpoint_dir.as_deref())?;

    check_binary_target(&dataset, &config.target)?;

    let split = split_dataset(&dataset, config.splitting.train, &config.target)?;
    let result = train_and_evaluate(&split, classifier)?;

    info!(
        library_accuracy = result.library_accuracy,
        manual_accuracy = result.manual_accuracy,
        "pipeline run complete"
    );

    Ok(PipelineRun {
        result,
        loaded_shape,
        steps,
        train_rows: split.train_rows(),
        validation_rows: split.validation_rows(),
        checkpoint_dir,
    })
}
