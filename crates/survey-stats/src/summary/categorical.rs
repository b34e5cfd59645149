//! Frequencies over a declared category vocabulary.

use crate::missing::translate_sentinel;
use crate::schema::CategoryValue;
use crate::types::{CategoricalCounts, CategoricalFrequencies, CategoryLabels};
use crate::weighted::{WeightColumn, category_weights};

/// Count rows per declared category, in declared order.
///
/// Matching is against the raw value, so a category declared with a
/// sentinel code only matches rows storing that sentinel. Values outside the
/// vocabulary are ignored; categories without rows count zero.
pub fn summarize(
    raw: &[Option<f64>],
    categories: &[CategoryValue],
    translated: Option<&[CategoryValue]>,
    weights: Option<&WeightColumn>,
) -> CategoricalFrequencies {
    CategoricalFrequencies {
        counts: counts(raw, categories, weights),
        labels: labels(categories, translated),
    }
}

pub fn counts(
    raw: &[Option<f64>],
    categories: &[CategoryValue],
    weights: Option<&WeightColumn>,
) -> CategoricalCounts {
    let frequencies = categories
        .iter()
        .map(|category| {
            let code = category.value as f64;
            raw.iter().filter(|value| **value == Some(code)).count() as u64
        })
        .collect();

    CategoricalCounts {
        frequencies,
        weighted: weights.map(|weights| category_weights(raw, categories, weights)),
    }
}

/// Value, missing flag and label per category. Second-language labels are
/// looked up by value; a value without a translation gets an empty label.
pub fn labels(categories: &[CategoryValue], translated: Option<&[CategoryValue]>) -> CategoryLabels {
    let canonical: Vec<i64> = categories
        .iter()
        .map(|category| translate_sentinel(category.value))
        .collect();

    CategoryLabels {
        values: canonical.iter().map(i64::to_string).collect(),
        missings: canonical.iter().map(|code| *code < 0).collect(),
        labels: categories.iter().map(|c| c.label.clone()).collect(),
        labels_de: translated.map(|translated| {
            categories
                .iter()
                .map(|category| {
                    translated
                        .iter()
                        .find(|t| t.value == category.value)
                        .map(|t| t.label.clone())
                        .unwrap_or_default()
                })
                .collect()
        }),
    }
}
