//! Dataset acquisition and CSV loading

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use polars::prelude::*;
use tracing::info;

use super::dataset::Dataset;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::utils::{create_download_bar, finish_with_success};

/// Rows scanned for CSV schema inference
const INFER_SCHEMA_LENGTH: usize = 10_000;

const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Make sure the configured dataset exists under `base_path`, downloading it
/// from `dataset_url` when it is absent. Returns the local path.
pub fn ensure_dataset(config: &PipelineConfig, base_path: &Path) -> Result<PathBuf> {
    let dataset_path = base_path.join(&config.dataset_file);
    if dataset_path.exists() {
        return Ok(dataset_path);
    }

    let url = config
        .dataset_url
        .as_deref()
        .ok_or_else(|| PipelineError::DatasetNotFound(dataset_path.clone()))?;

    info!(file = %config.dataset_file, url, "dataset not found locally, downloading");
    download_file(url, &dataset_path)?;
    info!(path = %dataset_path.display(), "downloaded dataset");

    Ok(dataset_path)
}

/// Fetch `url` into `destination`, creating parent directories as needed.
pub fn download_file(url: &str, destination: &Path) -> Result<()> {
    let download_err = |source| PipelineError::Download {
        url: url.to_string(),
        source,
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write to a sibling file first so an interrupted download never looks complete
    let partial = destination.with_extension("part");
    let pb = create_download_bar(response.content_length(), url);
    if let Err(e) = copy_to_file(&mut response, &partial, &pb) {
        pb.abandon();
        return Err(e);
    }

    std::fs::rename(&partial, destination)?;
    finish_with_success(&pb, "Download complete");
    Ok(())
}

/// Stream `reader` into a new file at `path`, advancing `pb` per chunk.
/// On failure the partially written file is removed.
fn copy_to_file(reader: &mut impl Read, path: &Path, pb: &ProgressBar) -> Result<()> {
    let result = (|| -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let mut buffer = vec![0u8; DOWNLOAD_CHUNK_SIZE];
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            writer.write_all(&buffer[..read])?;
            pb.inc(read as u64);
        }
        writer.flush()?;
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(path);
    }
    result
}

/// Load a CSV file into a [`Dataset`].
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(PipelineError::DatasetNotFound(path.to_path_buf()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_LENGTH))
        .finish()?
        .collect()?;

    let (rows, cols) = df.shape();
    info!(path = %path.display(), rows, cols, "loaded dataset");

    Ok(Dataset::new(df))
}
