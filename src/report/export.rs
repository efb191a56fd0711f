//! JSON report export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    ClassifierPerformance, ContinuousSummary, CriteriaAssessment, DatasetOverview,
    FeatureCorrelation, HypothesisVerdict, ProportionTable, SelectionReport, SelectorConfig,
};

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub asthmastat_version: String,
    /// Dataset or artifact directory the report was produced from
    pub source: String,
}

impl RunMetadata {
    pub fn new(source: &Path) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            asthmastat_version: env!("CARGO_PKG_VERSION").to_string(),
            source: source.display().to_string(),
        }
    }
}

/// Summary counts of a study run
#[derive(Debug, Serialize)]
pub struct StudySummary {
    pub features_tested: usize,
    pub significant_features: usize,
    pub failed_features: usize,
    pub hypotheses_supported: usize,
}

/// Complete `study` report
#[derive(Debug, Serialize)]
pub struct StudyExport {
    pub metadata: RunMetadata,
    pub config: SelectorConfig,
    pub overview: DatasetOverview,
    pub summary: StudySummary,
    pub tests: SelectionReport,
    pub correlations: Vec<FeatureCorrelation>,
    pub continuous_summaries: Vec<ContinuousSummary>,
    pub proportions: Vec<ProportionTable>,
    pub hypotheses: Vec<HypothesisVerdict>,
}

/// Inputs of a study report, borrowed from the run
pub struct StudyParts<'a> {
    pub source: &'a Path,
    pub config: &'a SelectorConfig,
    pub overview: DatasetOverview,
    pub report: &'a SelectionReport,
    pub correlations: &'a [FeatureCorrelation],
    pub continuous_summaries: &'a [ContinuousSummary],
    pub proportions: &'a [ProportionTable],
    pub hypotheses: &'a [HypothesisVerdict],
}

pub fn build_study_export(parts: StudyParts<'_>) -> StudyExport {
    StudyExport {
        metadata: RunMetadata::new(parts.source),
        config: parts.config.clone(),
        overview: parts.overview,
        summary: StudySummary {
            features_tested: parts.report.results.len(),
            significant_features: parts.report.significant().count(),
            failed_features: parts.report.failures.len(),
            hypotheses_supported: parts.hypotheses.iter().filter(|h| h.supported).count(),
        },
        tests: parts.report.clone(),
        correlations: parts.correlations.to_vec(),
        continuous_summaries: parts.continuous_summaries.to_vec(),
        proportions: parts.proportions.to_vec(),
        hypotheses: parts.hypotheses.to_vec(),
    }
}

/// Complete `evaluate` report
#[derive(Debug, Serialize)]
pub struct EvaluationExport {
    pub metadata: RunMetadata,
    pub version: String,
    pub performance: ClassifierPerformance,
    pub assessments: Vec<CriteriaAssessment>,
}

pub fn build_evaluation_export(
    source: &Path,
    version: &str,
    performance: &ClassifierPerformance,
    assessments: &[CriteriaAssessment],
) -> EvaluationExport {
    EvaluationExport {
        metadata: RunMetadata::new(source),
        version: version.to_string(),
        performance: performance.clone(),
        assessments: assessments.to_vec(),
    }
}

pub fn to_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

/// Write a report to a JSON file
pub fn export_json<T: Serialize>(report: &T, output_path: &Path) -> Result<()> {
    let json = to_json(report)?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    Ok(())
}
