//! Pipeline module.
//!
//! Walks the schema, computes one record per variable and assembles the
//! statistics document.

mod assembler;
mod builder;
pub mod progress;

pub use builder::{StatisticsGenerator, StatisticsGeneratorBuilder};
pub use progress::{ClosureProgressReporter, GenerationStage, ProgressReporter, ProgressUpdate};
