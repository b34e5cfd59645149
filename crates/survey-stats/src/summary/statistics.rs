//! Compact statistics tables.
//!
//! Independent from the frequency blocks: the `valid`/`invalid` entries here
//! always exclude negative codes, whatever the block next to them reports.

use crate::missing::{canonical_value, is_blank_text};
use crate::types::{NumericValue, StatisticsTable};
use crate::utils::format_float;

pub const NUMERIC_STATISTICS: [&str; 8] = [
    "Min.", "1st Qu.", "Median", "Mean", "3rd Qu.", "Max.", "valid", "invalid",
];

/// Median of an ascending slice; NaN when empty.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => f64::NAN,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// First quartile, median, third quartile by halving the sorted sequence.
///
/// The lower half is the first `n/2` elements. The upper half starts at
/// `n/2` for even `n` and at `n/2 + 1` for odd `n`, so the middle element
/// of an odd-length sequence belongs to neither half. No interpolation.
pub fn quartiles(sorted: &[f64]) -> (f64, f64, f64) {
    let mid = sorted.len() / 2;
    let upper_start = if sorted.len() % 2 == 0 { mid } else { mid + 1 };
    (
        median(&sorted[..mid]),
        median(sorted),
        median(&sorted[upper_start.min(sorted.len())..]),
    )
}

/// Eight-row summary over the non-negative values of a numeric column.
pub fn numeric_table(values: &[Option<f64>], integral: bool) -> StatisticsTable {
    let mut valid: Vec<f64> = values
        .iter()
        .flatten()
        .map(|v| canonical_value(*v))
        .filter(|v| *v >= 0.0)
        .collect();
    valid.sort_by(f64::total_cmp);

    let n = valid.len();
    let invalid = values.len() - n;
    let (q1, med, q3) = quartiles(&valid);
    let mean = if n == 0 {
        f64::NAN
    } else {
        valid.iter().sum::<f64>() / n as f64
    };
    let bound = |value: Option<&f64>| {
        value.map_or_else(
            || format_float(f64::NAN),
            |v| NumericValue::new(*v, integral).to_string(),
        )
    };

    let entries = vec![
        bound(valid.first()),
        format_float(q1),
        format_float(med),
        format_float(mean),
        format_float(q3),
        bound(valid.last()),
        n.to_string(),
        invalid.to_string(),
    ];
    StatisticsTable::new(NUMERIC_STATISTICS.into_iter().zip(entries).collect(), n)
}

/// Valid/invalid counts; invalid is null rows plus negative codes.
pub fn categorical_table(values: &[Option<f64>]) -> StatisticsTable {
    let invalid = values
        .iter()
        .filter(|value| match value {
            None => true,
            Some(v) => canonical_value(*v) < 0.0,
        })
        .count();
    valid_invalid(values.len(), invalid)
}

/// Valid/invalid counts; invalid is null rows plus `""` and `"."`.
pub fn string_table(values: &[Option<String>]) -> StatisticsTable {
    let invalid = values
        .iter()
        .filter(|value| is_blank_text(value.as_deref()))
        .count();
    valid_invalid(values.len(), invalid)
}

fn valid_invalid(total: usize, invalid: usize) -> StatisticsTable {
    let valid = total - invalid;
    StatisticsTable::new(
        vec![("valid", valid.to_string()), ("invalid", invalid.to_string())],
        valid,
    )
}
