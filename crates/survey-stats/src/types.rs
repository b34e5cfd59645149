//! Output types of the statistics engine.
//!
//! Everything here serializes into the nested document consumed by the
//! report renderers. Field order follows declaration order; maps keep
//! insertion order via [`IndexMap`].

use crate::utils::format_float;
use indexmap::IndexMap;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// Scalars
// =============================================================================

/// A number that remembers whether its column stored integers. Used for the
/// `Min.`/`Max.` rows of the statistics table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Integer(i64),
    Float(f64),
}

impl NumericValue {
    pub fn new(value: f64, integral: bool) -> Self {
        if integral && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Self::Integer(value as i64)
        } else {
            Self::Float(value)
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

fn bools_as_strings<S: Serializer>(flags: &[bool], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(flags.len()))?;
    for flag in flags {
        seq.serialize_element(if *flag { "true" } else { "false" })?;
    }
    seq.end()
}

// =============================================================================
// Univariate blocks
// =============================================================================

/// Frequency mass per declared category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalCounts {
    pub frequencies: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted: Option<Vec<f64>>,
}

/// Category metadata; identical for every split category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryLabels {
    /// Canonical (sentinel-translated) values.
    pub values: Vec<String>,
    #[serde(serialize_with = "bools_as_strings")]
    pub missings: Vec<bool>,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_de: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalFrequencies {
    #[serde(flatten)]
    pub counts: CategoricalCounts,
    #[serde(flatten)]
    pub labels: CategoryLabels,
}

/// Evaluation range of a numeric density; identical for every split category.
///
/// Bounds are always floats, whatever the column's storage type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub by: f64,
}

/// Negative codes found in a numeric column, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericMissings {
    pub frequencies: Vec<u64>,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericDistribution {
    pub density: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted: Option<Vec<f64>>,
    pub total: usize,
    /// Rows minus null rows. Negative codes are NOT subtracted here, unlike
    /// the `valid` entry of the statistics table.
    pub valid: usize,
    pub missing: Vec<u64>,
    pub missings: NumericMissings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericFrequencies {
    #[serde(flatten)]
    pub range: NumericRange,
    #[serde(flatten)]
    pub distribution: NumericDistribution,
}

/// Distinct-value counts of a text variable, as single-element sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StringFrequencies {
    pub frequencies: Vec<usize>,
    pub missings: Vec<usize>,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EmptyBlock {}

/// The distribution block of one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniBlock {
    Categorical(CategoricalFrequencies),
    Numeric(NumericFrequencies),
    String(StringFrequencies),
    Empty(EmptyBlock),
}

// =============================================================================
// Statistics table
// =============================================================================

/// Compact `names`/`values` summary. An empty table serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsTable {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Number of valid observations the table was computed over.
    #[serde(skip)]
    pub valid_observations: usize,
}

impl StatisticsTable {
    pub fn new(entries: Vec<(&str, String)>, valid_observations: usize) -> Self {
        let (names, values) = entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .unzip();
        Self {
            names,
            values,
            valid_observations,
        }
    }

    /// Look up a value by its row name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i].as_str())
    }
}

// =============================================================================
// Bivariate blocks
// =============================================================================

/// Per-category distribution with the split-invariant fields removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SplitCell {
    Categorical(CategoricalCounts),
    Numeric(NumericDistribution),
    String(StringFrequencies),
    Empty(EmptyBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitCategoryStats {
    pub label: String,
    #[serde(flatten)]
    pub stats: SplitCell,
}

/// Cross-tabulation of one variable against the split variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitBreakdown {
    /// Label of the split variable.
    pub label: String,
    pub categories: IndexMap<String, SplitCategoryStats>,
    #[serde(flatten)]
    pub category_labels: Option<CategoryLabels>,
    #[serde(flatten)]
    pub range: Option<NumericRange>,
}

// =============================================================================
// Records and document
// =============================================================================

/// Everything computed for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableRecord {
    pub study: String,
    pub analysis_unit: String,
    pub period: String,
    pub sub_type: String,
    pub boost: String,
    pub dataset: String,
    pub variable: String,
    pub name: String,
    pub name_cs: String,
    pub label: String,
    pub scale: String,
    pub categories: UniBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_de: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bi: Option<IndexMap<String, SplitBreakdown>>,
}

/// A variable that was skipped because its statistics could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableFailure {
    pub variable: String,
    pub code: String,
    pub message: String,
}

/// Ordered mapping from lower-cased variable name to its record.
///
/// Serializes as the plain mapping; `failures` is diagnostic only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsDocument {
    pub variables: IndexMap<String, VariableRecord>,
    pub failures: Vec<VariableFailure>,
}

impl StatisticsDocument {
    pub fn get(&self, name: &str) -> Option<&VariableRecord> {
        self.variables.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Serialize for StatisticsDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.variables.serialize(serializer)
    }
}
