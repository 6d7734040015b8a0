//! Classifier training and dual-path accuracy evaluation
//!
//! Accuracy is computed twice from the same predictions: once through
//! polars series arithmetic and once by counting matches over plain
//! slices. The two must agree; a mismatch points at a problem in how
//! predictions or labels are handled rather than at model quality.

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::operations::column_to_f64;
use super::split::SplitData;
use crate::error::{PipelineError, Result};

/// Number of trees in the default forest
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Seed of the default forest, fixed so identical input trains an identical model
pub const DEFAULT_RANDOM_STATE: u64 = 1;

/// Accuracy of one run, computed two independent ways
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub library_accuracy: f64,
    pub manual_accuracy: f64,
}

impl RunResult {
    /// Whether both accuracy paths agree within `tolerance`.
    pub fn agrees(&self, tolerance: f64) -> bool {
        (self.library_accuracy - self.manual_accuracy).abs() <= tolerance
    }
}

/// A trainable binary/multiclass classifier over dense features.
pub trait Classifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<()>;

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>>;
}

/// Bagged decision trees with majority voting.
///
/// Each tree is trained on a bootstrap sample drawn from a generator seeded
/// with `random_state`.
pub struct RandomForestClassifier {
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: u64,
    trees: Vec<DecisionTree<f64, usize>>,
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_STATE)
    }
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, random_state: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_depth: None,
            random_state,
            trees: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<()> {
        let n_samples = features.nrows();
        if n_samples == 0 {
            return Err(PipelineError::EmptyPartition("training"));
        }
        if labels.len() != n_samples {
            return Err(PipelineError::Training(format!(
                "{} feature rows but {} labels",
                n_samples,
                labels.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let dataset = Dataset::new(
                features.select(Axis(0), &sample),
                labels.select(Axis(0), &sample),
            );
            let tree = DecisionTree::params()
                .max_depth(self.max_depth)
                .fit(&dataset)
                .map_err(|e| PipelineError::Training(e.to_string()))?;
            trees.push(tree);
        }

        debug!(trees = trees.len(), samples = n_samples, "trained random forest");
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        if self.trees.is_empty() {
            return Err(PipelineError::Training(
                "predict called before fit".to_string(),
            ));
        }

        let votes: Vec<Array1<usize>> = self.trees.iter().map(|tree| tree.predict(features)).collect();

        let predictions = (0..features.nrows())
            .map(|row| majority_vote(votes.iter().map(|v| v[row])))
            .collect();
        Ok(predictions)
    }
}

/// Most frequent label; ties go to the smallest label.
fn majority_vote(labels: impl Iterator<Item = usize>) -> usize {
    let mut counts: Vec<usize> = Vec::new();
    for label in labels {
        if label >= counts.len() {
            counts.resize(label + 1, 0);
        }
        counts[label] += 1;
    }

    let mut best = 0;
    for (label, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = label;
        }
    }
    best
}

/// Dense row-major matrix from numeric feature columns.
pub fn feature_matrix(features: &DataFrame) -> Result<Array2<f64>> {
    let columns = features
        .get_columns()
        .iter()
        .map(|c| column_to_f64(c, "features"))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn(
        (features.height(), columns.len()),
        |(row, col)| columns[col][row],
    ))
}

/// Class labels from a binary label series.
pub fn label_vector(labels: &Series) -> Result<Array1<usize>> {
    let values = column_to_f64(&labels.clone().into_column(), "labels")?;
    Ok(values.into_iter().map(|v| v as usize).collect())
}

/// Accuracy through polars: element-wise equality, then the mean.
pub fn library_accuracy(y_true: &Series, y_pred: &Series) -> Result<f64> {
    let y_true = y_true.cast(&DataType::UInt64)?;
    let y_pred = y_pred.cast(&DataType::UInt64)?;

    let matches = y_true.equal(&y_pred)?.into_series();
    matches
        .cast(&DataType::Float64)?
        .mean()
        .ok_or(PipelineError::EmptyPartition("validation"))
}

/// Accuracy by hand: matching positions over total count.
pub fn manual_accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    if y_true.is_empty() {
        return Err(PipelineError::EmptyPartition("validation"));
    }
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::Training(format!(
            "{} labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }

    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Train `classifier` on the training partition and score the validation partition.
pub fn train_and_evaluate<C: Classifier>(split: &SplitData, classifier: &mut C) -> Result<RunResult> {
    if split.validation_rows() == 0 {
        return Err(PipelineError::EmptyPartition("validation"));
    }

    let x_train = feature_matrix(&split.x_train)?;
    let y_train = label_vector(&split.y_train)?;
    classifier.fit(&x_train, &y_train)?;

    let x_val = feature_matrix(&split.x_val)?;
    let predictions = classifier.predict(&x_val)?;
    let y_val = label_vector(&split.y_val)?;

    let pred_series = Series::new(
        "prediction".into(),
        predictions.iter().map(|&p| p as u64).collect::<Vec<u64>>(),
    );

    let result = RunResult {
        library_accuracy: library_accuracy(&split.y_val, &pred_series)?,
        manual_accuracy: manual_accuracy(&y_val.to_vec(), &predictions.to_vec())?,
    };

    info!(accuracy = result.library_accuracy, "library accuracy");
    info!(accuracy = result.manual_accuracy, "manual accuracy");
    Ok(result)
}
