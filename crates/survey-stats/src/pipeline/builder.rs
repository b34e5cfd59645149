//! The statistics generator and its builder.

use crate::bivariate::SplitPlan;
use crate::config::{ConfigValidationError, StatsConfig};
use crate::error::{Result, StatsError};
use crate::pipeline::assembler::VariableAssembler;
use crate::pipeline::progress::{
    ClosureProgressReporter, GenerationStage, ProgressReporter, ProgressUpdate,
};
use crate::schema::{DatasetSchema, StudyInfo, VariableDescriptor};
use crate::summary::Summarizer;
use crate::types::{StatisticsDocument, VariableFailure, VariableRecord};
use crate::weighted::WeightColumn;
use polars::prelude::*;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Computes a [`StatisticsDocument`] for a dataset and its variable schema.
///
/// Use [`StatisticsGenerator::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use survey_stats::{DatasetSchema, StatisticsGenerator, StatsConfig, StudyInfo};
///
/// let schema = DatasetSchema::from_package_path("datapackage.json")?;
/// let document = StatisticsGenerator::builder()
///     .config(StatsConfig::builder().split_column("sex").build()?)
///     .study(StudyInfo::new("soep-core"))
///     .build()?
///     .generate(&df, &schema, None)?;
///
/// println!("{}", serde_json::to_string_pretty(&document)?);
/// ```
pub struct StatisticsGenerator {
    config: StatsConfig,
    study: StudyInfo,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(StatisticsGenerator: Send, Sync);

/// Outcome of one variable.
type VariableOutcome = std::result::Result<VariableRecord, VariableFailure>;

impl StatisticsGenerator {
    pub fn builder() -> StatisticsGeneratorBuilder {
        StatisticsGeneratorBuilder::default()
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn study(&self) -> &StudyInfo {
        &self.study
    }

    /// Compute the statistics document.
    ///
    /// `translated` is an optional second-language schema listing the same
    /// variables in the same order.
    ///
    /// # Errors
    ///
    /// Structurally invalid input is fatal: an invalid or mismatched schema,
    /// a configured split variable missing from the schema or the dataset,
    /// or a configured weight column missing from the dataset. Errors of a
    /// single variable are logged and recorded in
    /// [`StatisticsDocument::failures`] instead.
    pub fn generate(
        &self,
        df: &DataFrame,
        schema: &DatasetSchema,
        translated: Option<&DatasetSchema>,
    ) -> Result<StatisticsDocument> {
        match self.generate_internal(df, schema, translated) {
            Ok(document) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Computed statistics for {} variables",
                    document.len()
                )));
                Ok(document)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Statistics generation failed: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn generate_internal(
        &self,
        df: &DataFrame,
        schema: &DatasetSchema,
        translated: Option<&DatasetSchema>,
    ) -> Result<StatisticsDocument> {
        let start_time = Instant::now();
        info!(
            "Generating statistics for '{}': {} variables, {} rows",
            schema.name,
            schema.fields.len(),
            df.height()
        );
        self.report_progress(ProgressUpdate::new(
            GenerationStage::Initializing,
            0.0,
            "Validating schema...",
        ));

        self.config.validate()?;
        schema.validate()?;
        if let Some(translated) = translated {
            schema.check_translation(translated)?;
        }

        let weights = self
            .config
            .weight_column
            .as_deref()
            .map(|name| WeightColumn::from_frame(df, name))
            .transpose()?;
        let split = self
            .config
            .split_column
            .as_deref()
            .map(|name| {
                let descriptor = schema
                    .field(name)
                    .ok_or_else(|| StatsError::SplitVariableNotFound(name.to_string()))?;
                SplitPlan::build(descriptor, df)
            })
            .transpose()?;

        let assembler = VariableAssembler {
            df,
            study: &self.study,
            dataset: schema.name.to_lowercase(),
            summarizer: Summarizer::new(self.config.density_points).with_weights(weights.as_ref()),
            split,
        };

        self.report_progress(ProgressUpdate::new(
            GenerationStage::Initializing,
            1.0,
            "Schema validated",
        ));

        let jobs: Vec<(&VariableDescriptor, Option<&VariableDescriptor>)> = schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field, translated.and_then(|t| t.fields.get(i))))
            .collect();
        let total = jobs.len();
        let done = AtomicUsize::new(0);

        let run = |(descriptor, translated): &(&VariableDescriptor, Option<&VariableDescriptor>)| {
            let outcome = self.variable(&assembler, descriptor, *translated);
            let current = done.fetch_add(1, Ordering::SeqCst) + 1;
            self.report_progress(ProgressUpdate::with_items(
                GenerationStage::Summarizing,
                descriptor.name.clone(),
                current,
                total,
                format!("Summarized {}", descriptor.name),
            ));
            outcome
        };

        let outcomes: Vec<VariableOutcome> = if self.config.parallel {
            debug!("Summarizing {} variables on the rayon pool", total);
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        let mut document = StatisticsDocument::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => {
                    document.variables.insert(record.name.clone(), record);
                }
                Err(failure) => document.failures.push(failure),
            }
        }

        info!(
            "Computed {} variables ({} skipped) in {:.2?}",
            document.len(),
            document.failures.len(),
            start_time.elapsed()
        );
        Ok(document)
    }

    fn variable(
        &self,
        assembler: &VariableAssembler<'_>,
        descriptor: &VariableDescriptor,
        translated: Option<&VariableDescriptor>,
    ) -> VariableOutcome {
        debug!("Summarizing {}", descriptor.name);
        assembler.record(descriptor, translated).map_err(|e| {
            warn!("Skipping variable '{}': {}", descriptor.name, e);
            VariableFailure {
                variable: descriptor.name.clone(),
                code: e.error_code().to_string(),
                message: e.to_string(),
            }
        })
    }
}

/// Builder for [`StatisticsGenerator`].
#[derive(Default)]
pub struct StatisticsGeneratorBuilder {
    config: Option<StatsConfig>,
    study: Option<StudyInfo>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(StatisticsGeneratorBuilder: Send);

impl StatisticsGeneratorBuilder {
    pub fn config(mut self, config: StatsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Identification strings copied into every record.
    pub fn study(mut self, study: StudyInfo) -> Self {
        self.study = Some(study);
        self
    }

    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the generator. Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<StatisticsGenerator, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(StatisticsGenerator {
            config,
            study: self.study.unwrap_or_default(),
            progress_reporter: self.progress_reporter,
        })
    }
}
