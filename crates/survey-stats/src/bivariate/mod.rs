//! Cross-tabulation against a split variable.
//!
//! A [`SplitPlan`] is built once per run from the split variable: one
//! [`RowMask`] per split category. Each target variable is then summarized
//! once per category on a masked copy of its column. Fields that do not
//! depend on the category (category metadata, density range) are computed
//! on the unmasked column and reported once.

pub mod mask;

pub use mask::RowMask;

use crate::classifier::Classification;
use crate::error::{Result, StatsError};
use crate::missing::translate_sentinel;
use crate::schema::{CategoryValue, VariableDescriptor};
use crate::summary::Summarizer;
use crate::types::{SplitBreakdown, SplitCategoryStats, SplitCell, UniBlock};
use crate::utils::{lenient_numeric_values, text_values};
use indexmap::IndexMap;
use polars::prelude::*;
use tracing::debug;

/// One category of the split variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCategory {
    /// Key in the `categories` map: the canonical code, or the raw text for
    /// splits without a vocabulary.
    pub key: String,
    pub label: String,
    pub mask: RowMask,
}

/// The split variable's categories and their row masks.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    pub variable: String,
    pub label: String,
    pub categories: Vec<SplitCategory>,
}

impl SplitPlan {
    /// Build masks for every category of `descriptor`.
    ///
    /// Declared categories are used in declared order, including those no
    /// row carries. Without a vocabulary, the distinct non-null values are
    /// used in order of first appearance.
    pub fn build(descriptor: &VariableDescriptor, df: &DataFrame) -> Result<Self> {
        let column = df
            .column(&descriptor.name)
            .map_err(|_| StatsError::SplitVariableNotFound(descriptor.name.clone()))?;
        let series = column.as_materialized_series();

        let categories = if descriptor.values.is_empty() {
            observed_categories(series)?
        } else {
            declared_categories(series, &descriptor.values)?
        };
        debug!(
            "Split variable '{}' has {} categories",
            descriptor.name,
            categories.len()
        );

        Ok(Self {
            variable: descriptor.name.clone(),
            label: descriptor.label.clone(),
            categories,
        })
    }

    /// Summarize one target variable per split category.
    pub fn cross_tabulate(
        &self,
        summarizer: &Summarizer<'_>,
        classification: &Classification<'_>,
        series: Option<&Series>,
        translated: Option<&[CategoryValue]>,
    ) -> Result<SplitBreakdown> {
        let unmasked = summarizer.frequencies(classification, series, translated)?;
        let (category_labels, range) = match unmasked {
            UniBlock::Categorical(block) => (Some(block.labels), None),
            UniBlock::Numeric(block) => (None, Some(block.range)),
            UniBlock::String(_) | UniBlock::Empty(_) => (None, None),
        };

        let mut categories = IndexMap::with_capacity(self.categories.len());
        for category in &self.categories {
            debug!(
                "{}={}: {} rows",
                self.variable,
                category.key,
                category.mask.selected()
            );
            let masked = series.map(|s| category.mask.apply(s)).transpose()?;
            let block = summarizer.frequencies(classification, masked.as_ref(), translated)?;
            categories.insert(
                category.key.clone(),
                SplitCategoryStats {
                    label: category.label.clone(),
                    stats: split_cell(block),
                },
            );
        }

        Ok(SplitBreakdown {
            label: self.label.clone(),
            categories,
            category_labels,
            range,
        })
    }
}

/// Drop the fields that are reported once per split.
fn split_cell(block: UniBlock) -> SplitCell {
    match block {
        UniBlock::Categorical(block) => SplitCell::Categorical(block.counts),
        UniBlock::Numeric(block) => SplitCell::Numeric(block.distribution),
        UniBlock::String(block) => SplitCell::String(block),
        UniBlock::Empty(block) => SplitCell::Empty(block),
    }
}

fn declared_categories(series: &Series, values: &[CategoryValue]) -> Result<Vec<SplitCategory>> {
    let raw = lenient_numeric_values(series)?;
    Ok(values
        .iter()
        .map(|category| {
            let code = category.value as f64;
            SplitCategory {
                key: translate_sentinel(category.value).to_string(),
                label: category.label.clone(),
                mask: RowMask::from_fn(raw.len(), |row| raw[row] == Some(code)),
            }
        })
        .collect())
}

fn observed_categories(series: &Series) -> Result<Vec<SplitCategory>> {
    let text = text_values(series)?;
    let mut seen: Vec<&str> = Vec::new();
    for value in text.iter().flatten() {
        if !seen.contains(&value.as_str()) {
            seen.push(value);
        }
    }

    Ok(seen
        .into_iter()
        .map(|value| SplitCategory {
            key: value.to_string(),
            label: value.to_string(),
            mask: RowMask::from_fn(text.len(), |row| text[row].as_deref() == Some(value)),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn frame() -> DataFrame {
        df![
            "sex" => [1i64, 2, 1, 2, 1, 1],
            "q1" => [Some(1i64), Some(2), Some(2), None, Some(-1), Some(1)],
            "age" => [20i64, 30, 40, 50, 60, 70],
            "region" => ["north", "south", "north", "east", "south", "north"],
        ]
        .unwrap()
    }

    fn sex() -> VariableDescriptor {
        VariableDescriptor::categorical(
            "sex",
            "Gender",
            vec![
                CategoryValue::new(1, "male"),
                CategoryValue::new(2, "female"),
                CategoryValue::new(3, "diverse"),
            ],
        )
    }

    fn series<'a>(df: &'a DataFrame, name: &str) -> &'a Series {
        df.column(name).unwrap().as_materialized_series()
    }

    #[test]
    fn test_plan_keeps_declared_order_and_empty_categories() {
        let df = frame();
        let plan = SplitPlan::build(&sex(), &df).unwrap();

        let keys: Vec<&str> = plan.categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "2", "3"]);
        assert_eq!(plan.categories[0].mask.selected(), 4);
        assert_eq!(plan.categories[1].mask.selected(), 2);
        assert_eq!(plan.categories[2].mask.selected(), 0);
        assert_eq!(plan.label, "Gender");
    }

    #[test]
    fn test_plan_without_vocabulary_uses_first_appearance() {
        let df = frame();
        let plan = SplitPlan::build(&VariableDescriptor::string("region", "Region"), &df).unwrap();

        let keys: Vec<&str> = plan.categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["north", "south", "east"]);
        assert_eq!(plan.categories[0].label, "north");
        assert_eq!(plan.categories[0].mask.selected(), 3);
    }

    #[test]
    fn test_plan_missing_column() {
        let df = frame();
        let err = SplitPlan::build(&VariableDescriptor::new("nope", ""), &df).unwrap_err();
        assert_eq!(err.error_code(), "SPLIT_VARIABLE_NOT_FOUND");
    }

    #[test]
    fn test_categorical_cross_tab() {
        let df = frame();
        let plan = SplitPlan::build(&sex(), &df).unwrap();
        let vocabulary = vec![
            CategoryValue::new(-1, "no answer"),
            CategoryValue::new(1, "yes"),
            CategoryValue::new(2, "no"),
        ];
        let classification = Classification::Categorical(&vocabulary);

        let breakdown = plan
            .cross_tabulate(
                &Summarizer::new(20),
                &classification,
                Some(series(&df, "q1")),
                None,
            )
            .unwrap();

        assert_eq!(
            serde_json::to_value(&breakdown).unwrap(),
            json!({
                "label": "Gender",
                "categories": {
                    "1": {"label": "male", "frequencies": [1, 1, 2]},
                    "2": {"label": "female", "frequencies": [0, 1, 0]},
                    "3": {"label": "diverse", "frequencies": [0, 0, 0]}
                },
                "values": ["-1", "1", "2"],
                "missings": ["true", "false", "false"],
                "labels": ["no answer", "yes", "no"]
            })
        );
    }

    #[test]
    fn test_numeric_cross_tab_hoists_range() {
        let df = frame();
        let plan = SplitPlan::build(&sex(), &df).unwrap();

        let breakdown = plan
            .cross_tabulate(
                &Summarizer::new(20),
                &Classification::Numeric,
                Some(series(&df, "age")),
                None,
            )
            .unwrap();

        let range = breakdown.range.clone().unwrap();
        assert_eq!(range.min, Some(20.0));
        assert_eq!(range.max, Some(70.0));
        assert!(breakdown.category_labels.is_none());

        let SplitCell::Numeric(male) = &breakdown.categories["1"].stats else {
            panic!("expected numeric cell");
        };
        assert_eq!(male.total, 6);
        assert_eq!(male.valid, 4);
        assert_eq!(male.density.len(), 20);

        let SplitCell::Numeric(diverse) = &breakdown.categories["3"].stats else {
            panic!("expected numeric cell");
        };
        assert_eq!(diverse.valid, 0);
        assert!(diverse.density.is_empty());

        let value = serde_json::to_value(&breakdown).unwrap();
        assert!(value["categories"]["1"].get("min").is_none());
        assert_eq!(value["min"], json!(20));
    }

    #[test]
    fn test_unknown_target_gets_empty_cells() {
        let df = frame();
        let plan = SplitPlan::build(&sex(), &df).unwrap();
        let breakdown = plan
            .cross_tabulate(&Summarizer::new(20), &Classification::Unknown, None, None)
            .unwrap();
        assert_eq!(breakdown.categories.len(), 3);
        assert_eq!(
            serde_json::to_value(&breakdown.categories["2"]).unwrap(),
            json!({"label": "female"})
        );
    }
}
