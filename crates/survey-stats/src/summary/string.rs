//! Distinct-value counts for text variables.

use crate::missing::is_missing_text;
use crate::types::StringFrequencies;
use std::collections::HashSet;

/// Number of distinct non-missing values and number of distinct missing
/// values. An absent value counts as one distinct missing value.
pub fn summarize(values: &[Option<String>]) -> StringFrequencies {
    let distinct: HashSet<Option<&str>> = values.iter().map(Option::as_deref).collect();
    let missing = distinct.iter().filter(|value| is_missing_text(**value)).count();

    StringFrequencies {
        frequencies: vec![distinct.len() - missing],
        missings: vec![missing],
    }
}
