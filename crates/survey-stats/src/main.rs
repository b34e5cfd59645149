//! CLI entry point for the survey statistics generator.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use survey_stats::{DatasetSchema, StatisticsDocument, StatisticsGenerator, StatsConfig, StudyInfo};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Descriptive statistics for survey datasets",
    long_about = "Computes per-variable frequencies, densities and summary statistics for a \
                  survey dataset described by a tabular data package.\n\n\
                  EXAMPLES:\n  \
                  # Univariate statistics to stdout\n  \
                  survey-stats --data persons.csv --schema datapackage.json\n\n  \
                  # Cross-tabulate by sex, weighted, with German labels\n  \
                  survey-stats --data persons.csv --schema datapackage.json \\\n    \
                  --schema-de datapackage_de.json --split sex --weight phrf -o stats.json"
)]
struct Args {
    /// Path to the CSV dataset
    #[arg(long)]
    data: PathBuf,

    /// Path to the tabular data package describing the variables
    #[arg(long)]
    schema: PathBuf,

    /// Path to a second-language data package with the same variables
    #[arg(long)]
    schema_de: Option<PathBuf>,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Study name copied into every record
    #[arg(long, default_value = "")]
    study: String,

    /// Analysis unit copied into every record
    #[arg(long, default_value = "")]
    analysis_unit: String,

    /// Period copied into every record
    #[arg(long, default_value = "")]
    period: String,

    /// Sub-type copied into every record
    #[arg(long, default_value = "")]
    sub_type: String,

    /// Boost sample marker copied into every record
    #[arg(long, default_value = "")]
    boost: String,

    /// Variable whose categories partition the rows for cross-tabulation
    #[arg(long)]
    split: Option<String>,

    /// Column holding respondent weights
    #[arg(long)]
    weight: Option<String>,

    /// Number of points of the density grid
    #[arg(long, default_value = "20")]
    density_points: usize,

    /// Compute variables in parallel
    #[arg(long)]
    parallel: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout carries
/// only the document.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !args.data.exists() {
        return Err(anyhow!("Data file not found: {}", args.data.display()));
    }

    let schema = DatasetSchema::from_package_path(&args.schema)
        .with_context(|| format!("Failed to load schema {}", args.schema.display()))?;
    let translated = args
        .schema_de
        .as_ref()
        .map(|path| {
            DatasetSchema::from_package_path(path)
                .with_context(|| format!("Failed to load schema {}", path.display()))
        })
        .transpose()?;

    info!("Loading dataset from: {}", args.data.display());
    let data = load_csv(&args.data)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let mut config_builder = StatsConfig::builder()
        .density_points(args.density_points)
        .parallel(args.parallel);
    if let Some(ref split) = args.split {
        config_builder = config_builder.split_column(split);
    }
    if let Some(ref weight) = args.weight {
        config_builder = config_builder.weight_column(weight);
    }
    let config = config_builder.build()?;

    let study = StudyInfo {
        study: args.study.clone(),
        analysis_unit: args.analysis_unit.clone(),
        period: args.period.clone(),
        sub_type: args.sub_type.clone(),
        boost: args.boost.clone(),
    };

    let document = StatisticsGenerator::builder()
        .config(config)
        .study(study)
        .on_progress(|update| {
            debug!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?
        .generate(&data, &schema, translated.as_ref())?;

    for failure in &document.failures {
        warn!(
            "Variable '{}' skipped [{}]: {}",
            failure.variable, failure.code, failure.message
        );
    }

    write_document(&document, args.output.as_deref(), args.compact)?;
    info!(
        "Wrote statistics for {} of {} variables",
        document.len(),
        schema.fields.len()
    );
    Ok(())
}

fn load_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn write_document(document: &StatisticsDocument, output: Option<&Path>, compact: bool) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(File::create(path)?)
        }
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    if compact {
        serde_json::to_writer(&mut writer, document)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, document)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = output {
        info!("Statistics written to: {}", path.display());
    }
    Ok(())
}
