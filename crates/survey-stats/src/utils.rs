//! Shared helpers for reading column values and printing numbers.

use crate::error::{Result, StatsError};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType stores integers.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Read a column as floats, treating unparseable text as absent.
///
/// NaN is folded into absent so that float columns and nullable integer
/// columns report the same null counts.
pub fn lenient_numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    if series.dtype() == &DataType::String {
        return Ok(series
            .str()?
            .into_iter()
            .map(|value| value.and_then(|text| text.trim().parse::<f64>().ok()))
            .map(drop_nan)
            .collect());
    }

    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().map(drop_nan).collect())
}

/// Read a column as floats, failing on text that is not a number.
///
/// Empty strings count as absent.
pub fn strict_numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    if series.dtype() != &DataType::String {
        if !is_numeric_dtype(series.dtype()) && series.dtype() != &DataType::Boolean {
            return Err(StatsError::TypeConversionFailed {
                column: series.name().to_string(),
                target_type: "numeric".to_string(),
                reason: format!("unsupported storage type {}", series.dtype()),
            });
        }
        return lenient_numeric_values(series);
    }

    series
        .str()?
        .into_iter()
        .map(|value| match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse::<f64>().map(|v| drop_nan(Some(v))).map_err(|_| {
                StatsError::TypeConversionFailed {
                    column: series.name().to_string(),
                    target_type: "numeric".to_string(),
                    reason: format!("'{text}' is not a number"),
                }
            }),
        })
        .collect()
}

/// Read a column as text.
pub fn text_values(series: &Series) -> Result<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

#[inline]
fn drop_nan(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

// =============================================================================
// Number Formatting
// =============================================================================

/// Print a float the way survey tooling expects in statistics tables:
/// integral values keep a trailing `.0`, very large and very small
/// magnitudes switch to exponent notation (`1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        if let Some((mantissa, exponent)) = formatted.split_once('e') {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{mantissa}e{sign}{:02}", exponent.abs());
        }
        return formatted;
    }

    let formatted = format!("{value}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

// =============================================================================
// Tests
// =============================================================================
