//! Run result export functionality

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::{PipelineRun, RunResult};

/// Metadata about the pipeline run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// tabpipe version
    pub tabpipe_version: String,
    pub config_name: String,
    pub config_version: String,
    pub dataset_file: String,
    pub target_column: String,
    pub operations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_dir: Option<String>,
}

/// Complete run export: metadata plus the accuracy pair
#[derive(Debug, Serialize)]
pub struct RunExport {
    pub metadata: RunMetadata,
    pub train_rows: usize,
    pub validation_rows: usize,
    #[serde(flatten)]
    pub result: RunResult,
}

impl RunExport {
    pub fn new(config: &PipelineConfig, run: &PipelineRun) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                tabpipe_version: env!("CARGO_PKG_VERSION").to_string(),
                config_name: config.config_name().to_string(),
                config_version: config.version.clone(),
                dataset_file: config.dataset_file.clone(),
                target_column: config.target.clone(),
                operations: config
                    .operations
                    .iter()
                    .map(|op| op.kind.to_string())
                    .collect(),
                checkpoint_dir: run
                    .checkpoint_dir
                    .as_ref()
                    .map(|p| p.display().to_string()),
            },
            train_rows: run.train_rows,
            validation_rows: run.validation_rows,
            result: run.result,
        }
    }
}

/// Write the run export as pretty-printed JSON.
pub fn export_run_result(export: &RunExport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_keys_are_flattened() {
        let result = RunResult {
            library_accuracy: 0.75,
            manual_accuracy: 0.75,
        };
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["library_accuracy"], 0.75);
        assert_eq!(value["manual_accuracy"], 0.75);
        assert_eq!(value.as_object().unwrap().len(), 2);
    }
}
