//! Target column precondition
//!
//! Training requires a binary 0/1 target. The check runs after all
//! operations and before splitting, so a non-binary target never reaches
//! the classifier.

use polars::prelude::*;
use tracing::debug;

use super::dataset::Dataset;
use crate::error::{PipelineError, Result};

/// Fail with `NonBinaryTarget` unless every value of `target` is 0 or 1.
///
/// Nulls and non-numeric columns fail the check as well.
pub fn check_binary_target(ds: &Dataset, target: &str) -> Result<()> {
    let target_col = ds.column(target, "target check")?;

    let non_binary = || -> Result<PipelineError> {
        Ok(PipelineError::NonBinaryTarget {
            column: target.to_string(),
            values: unique_values_as_strings(target_col)?,
        })
    };

    let dtype = target_col.dtype();
    if !(dtype.is_primitive_numeric() || dtype.is_bool()) {
        return Err(non_binary()?);
    }

    if target_col.null_count() > 0 {
        return Err(non_binary()?);
    }

    let float_col = target_col.cast(&DataType::Float64)?;
    let unique = float_col.unique()?;
    let is_binary = unique
        .f64()?
        .into_iter()
        .flatten()
        .all(|v| v == 0.0 || v == 1.0);

    if !is_binary {
        return Err(non_binary()?);
    }

    debug!(column = target, "target column is binary");
    Ok(())
}

/// Distinct values of a column rendered as sorted strings, nulls as "null".
fn unique_values_as_strings(col: &Column) -> Result<Vec<String>> {
    let unique = col.unique()?;

    let mut values: Vec<String> = match unique.dtype() {
        DataType::String => unique
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string).unwrap_or_else(|| "null".to_string()))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let cast = unique.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)).unwrap_or_else(|| "null".to_string()))
                .collect()
        }
        _ => {
            let cast = unique.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(str::to_string).unwrap_or_else(|| "null".to_string()))
                .collect()
        }
    };

    values.sort();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_int_target_passes() {
        let ds = Dataset::new(df! { "target" => [0i32, 1, 0, 1] }.unwrap());
        assert!(check_binary_target(&ds, "target").is_ok());
    }

    #[test]
    fn test_binary_float_target_passes() {
        let ds = Dataset::new(df! { "target" => [0.0f64, 1.0, 1.0] }.unwrap());
        assert!(check_binary_target(&ds, "target").is_ok());
    }

    #[test]
    fn test_single_class_target_passes() {
        let ds = Dataset::new(df! { "target" => [1i32, 1, 1] }.unwrap());
        assert!(check_binary_target(&ds, "target").is_ok());
    }

    #[test]
    fn test_multi_value_target_fails() {
        let ds = Dataset::new(df! { "target" => [0i32, 1, 2, 1] }.unwrap());
        match check_binary_target(&ds, "target").unwrap_err() {
            PipelineError::NonBinaryTarget { column, values } => {
                assert_eq!(column, "target");
                assert_eq!(values, vec!["0", "1", "2"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_near_binary_float_target_fails() {
        let ds = Dataset::new(df! { "target" => [1.0f64, 0.9999999999, 0.0] }.unwrap());
        match check_binary_target(&ds, "target").unwrap_err() {
            PipelineError::NonBinaryTarget { column, values } => {
                assert_eq!(column, "target");
                assert_eq!(values.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nan_target_fails() {
        let ds = Dataset::new(df! { "target" => [0.0f64, f64::NAN, 1.0] }.unwrap());
        assert!(matches!(
            check_binary_target(&ds, "target"),
            Err(PipelineError::NonBinaryTarget { .. })
        ));
    }

    #[test]
    fn test_string_target_fails() {
        let ds = Dataset::new(df! { "target" => ["G", "B", "G"] }.unwrap());
        assert!(matches!(
            check_binary_target(&ds, "target"),
            Err(PipelineError::NonBinaryTarget { .. })
        ));
    }

    #[test]
    fn test_null_in_target_fails() {
        let ds = Dataset::new(df! { "target" => [Some(0i32), None, Some(1)] }.unwrap());
        assert!(matches!(
            check_binary_target(&ds, "target"),
            Err(PipelineError::NonBinaryTarget { .. })
        ));
    }

    #[test]
    fn test_missing_target_column() {
        let ds = Dataset::new(df! { "other" => [0i32, 1] }.unwrap());
        assert!(matches!(
            check_binary_target(&ds, "target"),
            Err(PipelineError::MissingColumn { .. })
        ));
    }
}
