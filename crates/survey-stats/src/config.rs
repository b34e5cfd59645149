//! Configuration for statistics generation.
//!
//! Built with the same fluent builder the rest of the crate uses: every
//! setting is optional on the builder and falls back to its default.

use serde::{Deserialize, Serialize};

/// Minimum number of valid observations a variable needs (exclusive) before
/// its statistics table is published. Fixed; not part of [`StatsConfig`].
pub const STATISTICS_THRESHOLD: usize = 10;

/// Default number of evaluation points for numeric density estimates.
pub const DEFAULT_DENSITY_POINTS: usize = 20;

/// Configuration for a statistics run.
///
/// # Example
///
/// ```rust,ignore
/// use survey_stats::StatsConfig;
///
/// let config = StatsConfig::builder()
///     .density_points(40)
///     .weight_column("weight")
///     .split_column("sex")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Resolution of the numeric density evaluation grid.
    /// Default: 20
    pub density_points: usize,

    /// Column holding per-respondent weights.
    /// Default: None
    pub weight_column: Option<String>,

    /// Variable used to partition rows for cross-tabulation.
    /// Default: None
    pub split_column: Option<String>,

    /// Compute variables on the rayon thread pool.
    /// Default: false
    pub parallel: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            density_points: DEFAULT_DENSITY_POINTS,
            weight_column: None,
            split_column: None,
            parallel: false,
        }
    }
}

impl StatsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> StatsConfigBuilder {
        StatsConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.density_points < 2 {
            return Err(ConfigValidationError::InvalidDensityPoints(
                self.density_points,
            ));
        }

        for (field, value) in [
            ("weight_column", &self.weight_column),
            ("split_column", &self.split_column),
        ] {
            if value.as_deref().is_some_and(|name| name.trim().is_empty()) {
                return Err(ConfigValidationError::EmptyColumnName {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid density points: {0} (must be at least 2)")]
    InvalidDensityPoints(usize),

    #[error("Empty column name for '{field}'")]
    EmptyColumnName { field: String },
}

/// Builder for [`StatsConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct StatsConfigBuilder {
    density_points: Option<usize>,
    weight_column: Option<String>,
    split_column: Option<String>,
    parallel: Option<bool>,
}

impl StatsConfigBuilder {
    /// Set the number of density evaluation points.
    pub fn density_points(mut self, points: usize) -> Self {
        self.density_points = Some(points);
        self
    }

    /// Set the weight column.
    pub fn weight_column(mut self, column: impl Into<String>) -> Self {
        self.weight_column = Some(column.into());
        self
    }

    /// Set the split variable for cross-tabulation.
    ///
    /// Only one split variable is active per run.
    pub fn split_column(mut self, column: impl Into<String>) -> Self {
        self.split_column = Some(column.into());
        self
    }

    /// Enable or disable per-variable parallelism.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `StatsConfig` or an error if validation fails.
    pub fn build(self) -> Result<StatsConfig, ConfigValidationError> {
        let config = StatsConfig {
            density_points: self.density_points.unwrap_or(DEFAULT_DENSITY_POINTS),
            weight_column: self.weight_column,
            split_column: self.split_column,
            parallel: self.parallel.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
