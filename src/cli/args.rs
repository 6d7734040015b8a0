//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

/// Configuration document used when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// tabpipe - Transform a dataset, train a classifier and cross-check its accuracy
#[derive(Parser, Debug)]
#[command(name = "tabpipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML).
    /// The dataset path inside it is resolved relative to this file's directory.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the checkpoint root directory from the configuration
    #[arg(long)]
    pub checkpoint_path: Option<PathBuf>,

    /// Write the run result as JSON to this path
    #[arg(long)]
    pub output_json: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    /// Directory the dataset file is resolved against: the config file's parent.
    pub fn base_path(&self) -> PathBuf {
        match self.config.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        }
    }
}
