//! Survey Statistics Library
//!
//! Descriptive statistics documents for survey datasets, built with Rust and
//! Polars.
//!
//! # Overview
//!
//! For every variable of a dataset schema the library computes:
//!
//! - **Frequencies**: category counts over the declared vocabulary, a Gaussian
//!   density over the observed range, or distinct valid/missing string counts
//! - **Statistics**: a compact `names`/`values` table (quartiles, mean,
//!   valid/invalid counts), published once a variable has enough valid values
//! - **Weighted Output**: weight sums next to every count when a weight column
//!   is configured
//! - **Cross-Tabulation**: the same summaries broken down by the categories of
//!   a split variable
//!
//! Survey missing-value conventions are applied throughout: negative codes
//! are missing, and unsigned sentinel codes near `2^32` are translated to
//! their negative equivalents.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use survey_stats::{DatasetSchema, StatisticsGenerator, StatsConfig, StudyInfo};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("persons.csv".into()))?
//!     .finish()?;
//! let schema = DatasetSchema::from_package_path("datapackage.json")?;
//!
//! let config = StatsConfig::builder()
//!     .split_column("sex")
//!     .weight_column("weight")
//!     .build()?;
//!
//! let document = StatisticsGenerator::builder()
//!     .config(config)
//!     .study(StudyInfo::new("soep-core"))
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .generate(&df, &schema, None)?;
//!
//! for failure in &document.failures {
//!     eprintln!("skipped {}: {}", failure.variable, failure.message);
//! }
//! println!("{}", serde_json::to_string_pretty(&document)?);
//! ```

pub mod bivariate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod missing;
pub mod pipeline;
pub mod schema;
pub mod summary;
pub mod types;
pub mod utils;
pub mod weighted;

// Re-exports for convenient access
pub use bivariate::{RowMask, SplitPlan};
pub use classifier::{Classification, classify};
pub use config::{
    ConfigValidationError, DEFAULT_DENSITY_POINTS, STATISTICS_THRESHOLD, StatsConfig,
    StatsConfigBuilder,
};
pub use error::{Result as StatsResult, ResultExt, StatsError};
pub use missing::{is_missing_code, is_missing_text, sentinel_table, translate_sentinel};
pub use pipeline::{
    ClosureProgressReporter, GenerationStage, ProgressReporter, ProgressUpdate,
    StatisticsGenerator, StatisticsGeneratorBuilder,
};
pub use schema::{CategoryValue, DatasetSchema, Scale, StudyInfo, VariableDescriptor};
pub use summary::Summarizer;
pub use types::{
    StatisticsDocument, StatisticsTable, UniBlock, VariableFailure, VariableRecord,
};
pub use weighted::WeightColumn;
