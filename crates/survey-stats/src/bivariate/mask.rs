//! Boolean row masks.

use crate::error::{Result, StatsError};
use polars::prelude::*;

/// Rows kept for one split category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMask(Vec<bool>);

impl RowMask {
    pub fn new(keep: Vec<bool>) -> Self {
        Self(keep)
    }

    /// Mask of length `len` keeping rows where `keep(row)` holds.
    pub fn from_fn(len: usize, keep: impl Fn(usize) -> bool) -> Self {
        Self((0..len).map(keep).collect())
    }

    /// Number of kept rows.
    pub fn selected(&self) -> usize {
        self.0.iter().filter(|keep| **keep).count()
    }

    /// Copy of `series` with every dropped row set to null. Length, name and
    /// dtype are preserved.
    pub fn apply(&self, series: &Series) -> Result<Series> {
        if series.len() != self.0.len() {
            return Err(StatsError::Internal(format!(
                "mask of {} rows applied to column '{}' of {} rows",
                self.0.len(),
                series.name(),
                series.len()
            )));
        }

        let mask = BooleanChunked::from_slice(PlSmallStr::from_static("mask"), &self.0);
        let absent = Series::full_null(series.name().clone(), series.len(), series.dtype());
        Ok(series.zip_with(&mask, &absent)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_nulls_dropped_rows() {
        let series = Series::new("v".into(), &[1i64, 2, 3, 4]);
        let mask = RowMask::new(vec![true, false, true, false]);

        let masked = mask.apply(&series).unwrap();
        assert_eq!(masked.len(), 4);
        assert_eq!(masked.name().as_str(), "v");
        assert_eq!(masked.dtype(), &DataType::Int64);
        assert_eq!(masked.null_count(), 2);
        let values: Vec<Option<i64>> = masked.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1), None, Some(3), None]);
    }

    #[test]
    fn test_apply_on_text() {
        let series = Series::new("s".into(), &["a", "b"]);
        let masked = RowMask::new(vec![false, true]).apply(&series).unwrap();
        let values: Vec<Option<&str>> = masked.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![None, Some("b")]);
    }

    #[test]
    fn test_apply_length_mismatch() {
        let series = Series::new("v".into(), &[1i64, 2]);
        assert!(RowMask::new(vec![true]).apply(&series).is_err());
    }

    #[test]
    fn test_from_fn_and_counts() {
        let mask = RowMask::from_fn(5, |row| row % 2 == 0);
        assert_eq!(mask, RowMask::new(vec![true, false, true, false, true]));
        assert_eq!(mask.selected(), 3);
    }
}
