//! Descriptive summaries by diagnosis group
//!
//! Distribution summaries of continuous features and row-normalised
//! proportion tables of categorical features, one per diagnosis group.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::AnalysisResult;
use super::schema::DatasetSchema;
use super::target::{paired_codes, split_by_diagnosis, ASTHMA, NO_ASTHMA};
use crate::stats::mean_and_variance;

/// Five-number summary plus mean and standard deviation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl GroupSummary {
    /// Summarise a sample. Returns `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let (mean, variance) = mean_and_variance(&sorted);

        Some(Self {
            count: sorted.len(),
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of a sorted, non-empty sample.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Continuous feature summarised per diagnosis group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousSummary {
    pub feature: String,
    pub no_asthma: Option<GroupSummary>,
    pub asthma: Option<GroupSummary>,
}

pub fn describe_continuous(
    df: &DataFrame,
    schema: &DatasetSchema,
) -> AnalysisResult<Vec<ContinuousSummary>> {
    schema
        .continuous_features()
        .map(|feature| -> AnalysisResult<ContinuousSummary> {
            let groups = split_by_diagnosis(df, feature, &schema.target)?;
            Ok(ContinuousSummary {
                feature: feature.to_string(),
                no_asthma: GroupSummary::from_values(&groups.no_asthma),
                asthma: GroupSummary::from_values(&groups.asthma),
            })
        })
        .collect()
}

/// Percentage of each diagnosis group at every feature level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTable {
    pub feature: String,
    /// Sorted feature levels (columns)
    pub levels: Vec<i64>,
    /// One row per diagnosis code: `(diagnosis, percentages per level)`
    pub rows: Vec<(i64, Vec<f64>)>,
}

/// Build the diagnosis x level percentage table for one feature.
pub fn proportion_table(
    df: &DataFrame,
    feature: &str,
    target: &str,
) -> AnalysisResult<ProportionTable> {
    let pairs = paired_codes(df, feature, target)?;
    let levels: Vec<i64> = pairs
        .iter()
        .map(|(level, _)| *level)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = [NO_ASTHMA, ASTHMA]
        .iter()
        .map(|&diagnosis| {
            let group: Vec<i64> = pairs
                .iter()
                .filter(|(_, d)| *d == diagnosis)
                .map(|(level, _)| *level)
                .collect();
            let total = group.len() as f64;
            let pct = levels
                .iter()
                .map(|level| {
                    if total == 0.0 {
                        0.0
                    } else {
                        group.iter().filter(|l| *l == level).count() as f64 / total * 100.0
                    }
                })
                .collect();
            (diagnosis, pct)
        })
        .collect();

    Ok(ProportionTable {
        feature: feature.to_string(),
        levels,
        rows,
    })
}

pub fn proportion_tables(
    df: &DataFrame,
    schema: &DatasetSchema,
) -> AnalysisResult<Vec<ProportionTable>> {
    schema
        .categorical_features()
        .map(|feature| proportion_table(df, feature, &schema.target))
        .collect()
}
