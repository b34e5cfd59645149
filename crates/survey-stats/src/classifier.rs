//! Decides how each variable is summarized.

use crate::schema::{CategoryValue, Scale, VariableDescriptor};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;

/// The summarization strategy selected for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Frequencies over the declared vocabulary.
    Categorical(&'a [CategoryValue]),
    Numeric,
    String,
    /// No usable metadata or data; produces empty blocks.
    Unknown,
}

impl Classification<'_> {
    pub fn scale(&self) -> Scale {
        match self {
            Self::Categorical(_) => Scale::Categorical,
            Self::Numeric => Scale::Numeric,
            Self::String => Scale::String,
            Self::Unknown => Scale::Unknown,
        }
    }
}

/// Classify a variable from its descriptor, falling back to the storage type
/// of its column.
///
/// Rules, first match wins:
/// 1. a non-empty value vocabulary makes it categorical,
/// 2. a declared scale is taken as-is,
/// 3. numeric storage makes it numeric, any other storage makes it a string,
/// 4. without a declaration or a column it is unknown.
///
/// A declared categorical scale without a vocabulary has nothing to count and
/// is treated like an undeclared one.
pub fn classify<'a>(descriptor: &'a VariableDescriptor, df: &DataFrame) -> Classification<'a> {
    if !descriptor.values.is_empty() {
        return Classification::Categorical(&descriptor.values);
    }

    match descriptor.scale {
        Some(Scale::Numeric) => return Classification::Numeric,
        Some(Scale::String) => return Classification::String,
        Some(Scale::Unknown) => return Classification::Unknown,
        Some(Scale::Categorical) | None => {}
    }

    match df.column(&descriptor.name) {
        Ok(column) if is_numeric_dtype(column.dtype()) => Classification::Numeric,
        Ok(_) => Classification::String,
        Err(_) => Classification::Unknown,
    }
}
