//! Univariate summaries.
//!
//! [`Summarizer`] dispatches once on a [`Classification`] and produces the
//! distribution block and, separately, the compact statistics table:
//!
//! - [`categorical`]: frequencies over the declared vocabulary
//! - [`numeric`]: range, Gaussian density and missing-code buckets
//! - [`string`]: distinct valid / missing value counts
//! - [`statistics`]: the `names`/`values` tables
//! - [`density`]: the kernel density estimator

pub mod categorical;
pub mod density;
pub mod numeric;
pub mod statistics;
pub mod string;

use crate::classifier::Classification;
use crate::error::{Result, StatsError};
use crate::schema::CategoryValue;
use crate::types::{EmptyBlock, StatisticsTable, UniBlock};
use crate::utils::{is_integer_dtype, lenient_numeric_values, strict_numeric_values, text_values};
use crate::weighted::WeightColumn;
use numeric::NumericOptions;
use polars::prelude::*;

/// Computes univariate blocks with run-wide settings.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer<'a> {
    density_points: usize,
    weights: Option<&'a WeightColumn>,
}

impl<'a> Summarizer<'a> {
    pub fn new(density_points: usize) -> Self {
        Self {
            density_points,
            weights: None,
        }
    }

    pub fn with_weights(mut self, weights: Option<&'a WeightColumn>) -> Self {
        self.weights = weights;
        self
    }

    /// Distribution block of `series`.
    ///
    /// `translated` supplies second-language category labels. Numeric
    /// variables require every non-empty value to parse as a number.
    pub fn frequencies(
        &self,
        classification: &Classification<'_>,
        series: Option<&Series>,
        translated: Option<&[CategoryValue]>,
    ) -> Result<UniBlock> {
        let series = match (classification, series) {
            (Classification::Unknown, _) => return Ok(UniBlock::Empty(EmptyBlock {})),
            (_, Some(series)) => series,
            (_, None) => return Err(StatsError::Internal("column required".to_string())),
        };

        Ok(match classification {
            Classification::Categorical(categories) => {
                let raw = lenient_numeric_values(series)?;
                UniBlock::Categorical(categorical::summarize(
                    &raw,
                    categories,
                    translated,
                    self.weights,
                ))
            }
            Classification::Numeric => {
                let values = strict_numeric_values(series)?;
                let options = NumericOptions {
                    density_points: self.density_points,
                    weights: self.weights,
                    variable: series.name().as_str(),
                };
                UniBlock::Numeric(numeric::summarize(&values, &options))
            }
            Classification::String => UniBlock::String(string::summarize(&text_values(series)?)),
            Classification::Unknown => UniBlock::Empty(EmptyBlock {}),
        })
    }

    /// Statistics table of `series`. Unknown variables get an empty table.
    pub fn statistics(
        &self,
        classification: &Classification<'_>,
        series: Option<&Series>,
    ) -> Result<StatisticsTable> {
        let series = match (classification, series) {
            (Classification::Unknown, _) => return Ok(StatisticsTable::default()),
            (_, Some(series)) => series,
            (_, None) => return Err(StatsError::Internal("column required".to_string())),
        };

        Ok(match classification {
            Classification::Categorical(_) => {
                statistics::categorical_table(&lenient_numeric_values(series)?)
            }
            Classification::Numeric => statistics::numeric_table(
                &strict_numeric_values(series)?,
                is_integer_dtype(series.dtype()),
            ),
            Classification::String => statistics::string_table(&text_values(series)?),
            Classification::Unknown => StatisticsTable::default(),
        })
    }
}
