//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{
    ArtifactLayout, DatasetSchema, SelectorConfig, SuccessCriteria, DEFAULT_ALPHA,
    DEFAULT_INFER_SCHEMA_LENGTH,
};

/// asthmastat - Statistical analysis of asthma patient data
#[derive(Parser, Debug)]
#[command(name = "asthmastat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test every feature for association with the asthma diagnosis
    Study {
        /// Patient dataset (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// JSON file overriding the built-in dataset schema
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Significance level for every test (the 0.05 normality threshold is fixed)
        #[arg(long, default_value_t = DEFAULT_ALPHA, value_parser = validate_probability)]
        alpha: f64,

        /// Skip consolidation of Ethnicity and EducationLevel
        #[arg(long, default_value = "false")]
        no_consolidate: bool,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
        infer_schema_length: usize,

        /// Print the report as JSON instead of tables
        #[arg(long, default_value = "false")]
        json: bool,

        /// Write the JSON report to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Evaluate a trained classifier on its train and test splits
    Evaluate {
        /// Directory holding one sub-directory per artifact version
        #[arg(long)]
        artifacts: PathBuf,

        /// Artifact version to evaluate
        #[arg(long, default_value = "v1")]
        version: String,

        /// Minimum recall for the asthma class
        #[arg(long, default_value = "0.80", value_parser = validate_probability)]
        min_recall: f64,

        /// Minimum precision for the asthma class
        #[arg(long, default_value = "0.60", value_parser = validate_probability)]
        min_precision: f64,

        /// Print the report as JSON instead of tables
        #[arg(long, default_value = "false")]
        json: bool,

        /// Write the JSON report to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

/// Settings of one `study` run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub schema: DatasetSchema,
    pub selector: SelectorConfig,
    pub consolidate: bool,
    pub infer_schema_length: usize,
}

impl AnalysisConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            schema: DatasetSchema::default(),
            selector: SelectorConfig::default(),
            consolidate: true,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// Settings of one `evaluate` run
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub layout: ArtifactLayout,
    pub criteria: SuccessCriteria,
    pub infer_schema_length: usize,
}

impl EvaluationConfig {
    pub fn new(artifacts: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            layout: ArtifactLayout::new(artifacts, version),
            criteria: SuccessCriteria::default(),
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// Validator for probability-valued parameters
fn validate_probability(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}
