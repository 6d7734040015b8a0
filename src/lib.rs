//! tabpipe: configuration-driven tabular pipelines
//!
//! Loads a dataset, applies a declared sequence of operations, splits the
//! result into training and validation partitions, trains a classifier and
//! reports accuracy computed two independent ways.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{PipelineError, Result};
