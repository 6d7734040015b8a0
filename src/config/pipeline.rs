//! Pipeline configuration document and its derived checkpoint directory

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::operation::OperationConfig;
use crate::error::{PipelineError, Result};

/// Name used for the checkpoint layout when the configuration was not loaded from a file
const DEFAULT_CONFIG_NAME: &str = "pipeline";

/// Timestamp format of the per-run checkpoint directory
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Train/validation ratios. Only `train` positions the split boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplittingConfig {
    pub train: f64,
    pub validation: f64,
}

impl SplittingConfig {
    pub fn new(train: f64, validation: f64) -> Result<Self> {
        let splitting = Self { train, validation };
        splitting.validate()?;
        Ok(splitting)
    }

    /// Each ratio must lie strictly between 0 and 1. Their sum is not checked.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("train", self.train), ("validation", self.validation)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(PipelineError::validation(format!(
                    "splitting.{}: ratio must be between 0 and 1 (exclusive), got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Storage format for checkpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Csv,
}

impl StoreFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            StoreFormat::Csv => "csv",
        }
    }
}

fn default_version() -> String {
    "0.1".to_string()
}

fn default_config_name() -> String {
    DEFAULT_CONFIG_NAME.to_string()
}

/// A complete pipeline description.
///
/// Immutable during a run apart from the checkpoint directory, which is
/// derived on first access and cached until explicitly invalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_version")]
    pub version: String,
    pub dataset_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_url: Option<String>,
    pub operations: Vec<OperationConfig>,
    pub target: String,
    pub splitting: SplittingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_path: Option<PathBuf>,
    #[serde(default)]
    pub store_format: StoreFormat,

    #[serde(skip, default = "default_config_name")]
    config_name: String,
    #[serde(skip)]
    checkpoint_dir: OnceCell<Option<PathBuf>>,
}

impl PipelineConfig {
    pub fn new(
        dataset_file: impl Into<String>,
        operations: Vec<OperationConfig>,
        target: impl Into<String>,
        splitting: SplittingConfig,
    ) -> Self {
        Self {
            version: default_version(),
            dataset_file: dataset_file.into(),
            dataset_url: None,
            operations,
            target: target.into(),
            splitting,
            checkpoint_path: None,
            store_format: StoreFormat::default(),
            config_name: default_config_name(),
            checkpoint_dir: OnceCell::new(),
        }
    }

    /// Parse and validate a configuration from YAML text.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_yaml::from_str(source).map_err(|e| PipelineError::validation(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = Some(url.into());
        self
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.set_checkpoint_root(Some(path.into()));
        self.invalidate_checkpoint_dir();
        self
    }

    pub fn with_config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self.invalidate_checkpoint_dir();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset_file.trim().is_empty() {
            return Err(PipelineError::validation("dataset_file must not be empty"));
        }
        if self.target.trim().is_empty() {
            return Err(PipelineError::validation("target must not be empty"));
        }
        self.splitting.validate()
    }

    /// Identity of this configuration in the checkpoint layout (the config file stem).
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Replace the checkpoint root. A directory derived earlier stays cached
    /// until [`invalidate_checkpoint_dir`](Self::invalidate_checkpoint_dir) is called.
    pub fn set_checkpoint_root(&mut self, root: Option<PathBuf>) {
        self.checkpoint_path = root;
    }

    /// Forget the cached checkpoint directory; the next access derives a fresh one.
    pub fn invalidate_checkpoint_dir(&mut self) {
        self.checkpoint_dir.take();
    }

    /// Directory receiving this run's checkpoints:
    /// `<checkpoint_path>/<config name>/<version>/<UTC timestamp>`.
    ///
    /// Created on first access and memoized, so every operation of a run
    /// writes into the same directory.
    pub fn checkpoint_dir(&self) -> Result<Option<PathBuf>> {
        if let Some(dir) = self.checkpoint_dir.get() {
            return Ok(dir.clone());
        }

        let dir = match &self.checkpoint_path {
            None => None,
            Some(root) => {
                let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT).to_string();
                let dir = root
                    .join(&self.config_name)
                    .join(&self.version)
                    .join(timestamp);
                std::fs::create_dir_all(&dir)?;
                debug!(path = %dir.display(), "created checkpoint directory");
                Some(dir)
            }
        };

        Ok(self.checkpoint_dir.get_or_init(|| dir).clone())
    }
}

/// Load and validate a pipeline configuration from a YAML file.
///
/// The file stem becomes the configuration name used in the checkpoint layout.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        return Err(PipelineError::ConfigNotFound(path.to_path_buf()));
    }

    let source = std::fs::read_to_string(path)?;
    let config = PipelineConfig::from_yaml(&source)
        .map_err(|e| match e {
            PipelineError::Validation(msg) => {
                PipelineError::Validation(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(DEFAULT_CONFIG_NAME);

    debug!(
        config = name,
        operations = config.operations.len(),
        "loaded pipeline configuration"
    );

    Ok(config.with_config_name(name))
}
