//! Weight-based frequency mass.
//!
//! With a weight column configured, category frequencies and missing-code
//! buckets are additionally reported as sums of weights rather than row
//! counts. Rows with an absent weight contribute nothing.

use crate::error::{Result, StatsError};
use crate::schema::CategoryValue;
use crate::utils::lenient_numeric_values;
use polars::prelude::*;

/// Per-row weights, read once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightColumn {
    name: String,
    values: Vec<Option<f64>>,
}

impl WeightColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Read the named column; unparseable weights count as absent. A column
    /// without a single numeric weight is rejected.
    pub fn from_frame(df: &DataFrame, name: &str) -> Result<Self> {
        let column = df
            .column(name)
            .map_err(|_| StatsError::ColumnNotFound(name.to_string()))?;
        let values = lenient_numeric_values(column.as_materialized_series())?;
        if values.iter().all(Option::is_none) {
            return Err(StatsError::NoValidValues(name.to_string()));
        }
        Ok(Self::new(name, values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weight of `row`; absent weights and out-of-range rows yield `None`.
    pub fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().flatten()
    }

    /// Sum of weights over rows selected by `predicate`.
    pub fn sum_where(&self, mut predicate: impl FnMut(usize) -> bool) -> f64 {
        self.values
            .iter()
            .enumerate()
            .filter(|(row, _)| predicate(*row))
            .filter_map(|(_, weight)| *weight)
            .fold(0.0, |total, weight| total + weight)
    }
}

/// Weight mass per declared category, matched on raw values.
pub fn category_weights(
    raw: &[Option<f64>],
    categories: &[CategoryValue],
    weights: &WeightColumn,
) -> Vec<f64> {
    categories
        .iter()
        .map(|category| {
            let code = category.value as f64;
            weights.sum_where(|row| raw.get(row).copied().flatten() == Some(code))
        })
        .collect()
}

/// Weight mass per missing-code bucket, matched on canonical values.
pub fn bucket_weights(canonical: &[Option<f64>], codes: &[f64], weights: &WeightColumn) -> Vec<f64> {
    codes
        .iter()
        .map(|code| weights.sum_where(|row| canonical.get(row).copied().flatten() == Some(*code)))
        .collect()
}

/// Values with their weights, for rows where both are present and the
/// value passes `keep`.
pub fn weighted_points(
    values: &[Option<f64>],
    weights: &WeightColumn,
    keep: impl Fn(f64) -> bool,
) -> (Vec<f64>, Vec<f64>) {
    values
        .iter()
        .enumerate()
        .filter_map(|(row, value)| {
            let value = (*value)?;
            let weight = weights.get(row)?;
            keep(value).then_some((value, weight))
        })
        .unzip()
}
