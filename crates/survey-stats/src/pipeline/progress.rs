//! Progress reporting for statistics generation.
//!
//! A run reports one update while validating its inputs, one per variable,
//! and a final complete or failed update.
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_stats::StatisticsGenerator;
//!
//! let document = StatisticsGenerator::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .generate(&df, &schema, None)?;
//! ```

use serde::{Deserialize, Serialize};

/// Phases of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    /// Validating the schema and configuration, building the split plan
    Initializing,
    /// Computing per-variable records
    Summarizing,
    /// Document assembled
    Complete,
    /// A run-fatal error stopped generation
    Failed,
}

impl GenerationStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Summarizing => "Summarizing Variables",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.05,
            Self::Summarizing => 0.95,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Overall progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::Summarizing => 0.05,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: GenerationStage,

    /// Variable being processed, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: GenerationStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Update for the `current`-th of `total` items.
    pub fn with_items(
        stage: GenerationStage,
        sub_stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            sub_stage: Some(sub_stage.into()),
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(GenerationStage::Complete, 1.0, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(GenerationStage::Failed, 0.0, message)
    }
}

/// Receives progress updates during generation.
///
/// With `parallel` enabled, updates arrive from rayon worker threads and may
/// be out of order.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(GenerationStage::Initializing, 0.5, "Validating schema");
        assert_eq!(update.stage, GenerationStage::Initializing);
        assert_eq!(update.stage.display_name(), "Initializing");
        assert!(update.sub_stage.is_none());
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(
            GenerationStage::Summarizing,
            "age",
            3,
            12,
            "Summarized age",
        );
        assert_eq!(update.sub_stage, Some("age".to_string()));
        assert_eq!(update.stage_progress, 0.25);
        assert_eq!(update.items_processed, Some(3));
        assert_eq!(update.items_total, Some(12));
        assert!(update.progress > 0.05 && update.progress < 1.0);
    }

    #[test]
    fn test_with_items_zero_total() {
        let update = ProgressUpdate::with_items(GenerationStage::Summarizing, "x", 0, 0, "");
        assert_eq!(update.stage_progress, 0.0);
    }

    #[test]
    fn test_terminal_updates() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.stage, GenerationStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, GenerationStage::Failed);
        assert_eq!(failed.progress, 0.0);
        assert_eq!(failed.message, "boom");
    }

    #[test]
    fn test_stage_weights_sum() {
        let total: f32 = [GenerationStage::Initializing, GenerationStage::Summarizing]
            .iter()
            .map(|s| s.weight())
            .sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_closure_reporter_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let remote = reporter.clone();
        std::thread::spawn(move || {
            remote.report(ProgressUpdate::new(GenerationStage::Summarizing, 0.5, "worker"));
        })
        .join()
        .expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_progress_update_json() {
        let update = ProgressUpdate::with_items(GenerationStage::Summarizing, "q1", 1, 2, "Summarized q1");
        let json = serde_json::to_string(&update).expect("Should serialize");
        assert!(json.contains("\"stage\":\"summarizing\""));
        assert!(json.contains("\"sub_stage\":\"q1\""));
        assert!(json.contains("\"items_total\":2"));

        let back: ProgressUpdate = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back.stage, GenerationStage::Summarizing);
    }
}
