//! Tabular dataset with an optional row key
//!
//! The row key is stored as the leading column of the underlying frame so
//! that row-wise operations (take, head, slice) keep it aligned with the
//! data. It is hidden from the visible column set.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    index: Option<String>,
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame, index: None }
    }

    /// The full frame, row key included as its first column.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn index(&self) -> Option<&Column> {
        self.index
            .as_deref()
            .and_then(|name| self.frame.column(name).ok())
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// `(rows, visible columns)`
    pub fn shape(&self) -> (usize, usize) {
        let hidden = usize::from(self.index.is_some());
        (self.frame.height(), self.frame.width() - hidden)
    }

    /// Visible column names in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| Some(name.as_str()) != self.index.as_deref())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        Some(name) != self.index.as_deref() && self.frame.column(name).is_ok()
    }

    /// A visible column, or `MissingColumn` attributed to `context`.
    pub fn column(&self, name: &str, context: impl ToString) -> Result<&Column> {
        if !self.has_column(name) {
            return Err(PipelineError::missing_column(
                context,
                name,
                self.column_names(),
            ));
        }
        Ok(self.frame.column(name)?)
    }

    /// The visible columns as a frame, without the row key.
    pub fn visible_frame(&self) -> DataFrame {
        match &self.index {
            Some(name) => self.frame.drop(name).unwrap_or_else(|_| self.frame.clone()),
            None => self.frame.clone(),
        }
    }

    /// Promote `key` to the row key, replacing any previous key.
    ///
    /// A visible column with the same name is removed from the visible set.
    pub fn with_index(self, key: Column) -> Result<Self> {
        let name = key.name().to_string();
        let mut columns: Vec<Column> = Vec::with_capacity(self.frame.width());
        columns.push(key);
        columns.extend(
            self.frame
                .get_columns()
                .iter()
                .filter(|c| c.name().as_str() != name)
                .filter(|c| Some(c.name().as_str()) != self.index.as_deref())
                .cloned(),
        );

        Ok(Self {
            frame: DataFrame::new(columns)?,
            index: Some(name),
        })
    }

    /// Drop visible columns; names are expected to be validated by the caller.
    pub fn without_columns(&self, names: &[String]) -> Self {
        Self {
            frame: self.frame.drop_many(names.iter().map(String::as_str)),
            index: self.index.clone(),
        }
    }

    /// Add a column, or replace the visible column of the same name.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        self.frame.with_column(column)?;
        Ok(self)
    }

    /// Rows at the given positions, in that order.
    pub fn take_rows(&self, indices: Vec<IdxSize>) -> Result<Self> {
        let indices = IdxCa::from_vec("idx".into(), indices);
        Ok(Self {
            frame: self.frame.take(&indices)?,
            index: self.index.clone(),
        })
    }

    pub fn head(&self, n: usize) -> Self {
        Self {
            frame: self.frame.head(Some(n)),
            index: self.index.clone(),
        }
    }

    /// Rows `[offset, offset + len)`.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            frame: self.frame.slice(offset as i64, len),
            index: self.index.clone(),
        }
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
