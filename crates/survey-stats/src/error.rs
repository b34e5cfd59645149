//! Error types for the statistics engine.
//!
//! Errors fall into two groups: run-fatal errors raised while validating the
//! schema and configuration, and per-variable errors that the document
//! assembler records and skips past. Errors serialize as `{code, message}` so
//! a failure list can be embedded in machine-readable output.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for statistics generation.
#[derive(Error, Debug)]
pub enum StatsError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The variable schema is structurally invalid.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured split variable has no descriptor or no column.
    #[error("Split variable '{0}' not found")]
    SplitVariableNotFound(String),

    /// A column required by the whole run holds no usable values.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// Kernel density estimation could not be carried out.
    #[error("Density estimation failed: {0}")]
    DensityEstimation(String),

    /// Internal error (e.g., worker panic).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StatsError>,
    },
}

impl StatsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StatsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidSchema(_) => "INVALID_SCHEMA",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::SplitVariableNotFound(_) => "SPLIT_VARIABLE_NOT_FOUND",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::DensityEstimation(_) => "DENSITY_ESTIMATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error only affects a single variable.
    ///
    /// Recoverable errors skip the variable; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::TypeConversionFailed { .. }
            | Self::DensityEstimation(_)
            | Self::Polars(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for StatsError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for StatsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("StatsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| StatsError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            StatsError::InvalidSchema("x".to_string()).error_code(),
            "INVALID_SCHEMA"
        );
        assert_eq!(
            StatsError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_recoverable() {
        let conversion = StatsError::TypeConversionFailed {
            column: "age".to_string(),
            target_type: "numeric".to_string(),
            reason: "'abc' is not a number".to_string(),
        };
        assert!(conversion.is_recoverable());
        assert!(StatsError::ColumnNotFound("x".to_string()).is_recoverable());
        assert!(!StatsError::InvalidSchema("x".to_string()).is_recoverable());
        assert!(!StatsError::SplitVariableNotFound("sex".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = StatsError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_config_validation_error_conversion() {
        let error: StatsError = crate::config::ConfigValidationError::InvalidDensityPoints(1).into();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
        assert!(error.to_string().contains("at least 2"));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_with_context() {
        let error = StatsError::ColumnNotFound("test".to_string()).with_context("Variable 'test'");
        assert!(error.to_string().contains("Variable 'test'"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(error.is_recoverable());
    }
}
