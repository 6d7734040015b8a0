//! Per-operation checkpoint files

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use super::dataset::Dataset;
use crate::config::{OperationKind, StoreFormat};
use crate::error::Result;

/// Location of the checkpoint written after an operation of `kind`.
pub fn checkpoint_path(dir: &Path, kind: OperationKind) -> PathBuf {
    dir.join(format!("{}.{}", kind, StoreFormat::Csv.extension()))
}

/// Write `ds` as CSV into `dir`, named after the operation kind.
///
/// The row key, when present, is the leading column.
pub fn write_checkpoint(ds: &Dataset, dir: &Path, kind: OperationKind) -> Result<PathBuf> {
    let path = checkpoint_path(dir, kind);
    let mut frame = ds.frame().clone();
    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut frame)?;

    debug!(path = %path.display(), rows = frame.height(), "wrote checkpoint");
    Ok(path)
}
