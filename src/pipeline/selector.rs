//! Statistical test selection
//!
//! Chooses and runs the appropriate hypothesis test for every feature:
//!
//! - continuous features: Shapiro-Wilk on both diagnosis groups, then Welch's
//!   t-test when both look normal, Mann-Whitney U otherwise
//! - categorical features: chi-square test of independence, replaced by
//!   Fisher's exact test when any expected cell count is below 5
//!
//! A failure on one feature is recorded in the report and never stops the
//! remaining features from being tested.

use rayon::prelude::*;
use serde::Serialize;

use polars::prelude::DataFrame;

use super::error::{AnalysisError, AnalysisResult};
use super::schema::{DatasetSchema, FeatureKind};
use super::target::{paired_codes, split_by_diagnosis, DiagnosisGroups, ASTHMA, NO_ASTHMA};
use crate::stats::{
    mann_whitney_u, shapiro_wilk, welch_t_test, ContingencyTable, MIN_NORMALITY_SAMPLES,
};

/// Significance level for reported p-values
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Expected cell count below which the chi-square approximation is rejected
pub const DEFAULT_MIN_EXPECTED_COUNT: f64 = 5.0;

/// Configuration for test selection
#[derive(Debug, Clone, Serialize)]
pub struct SelectorConfig {
    /// p-value threshold for the significance flag
    pub alpha: f64,
    /// Normality is accepted when the Shapiro-Wilk p-value exceeds this
    pub normality_alpha: f64,
    /// Groups smaller than this get a normality p-value of 0
    pub min_normality_samples: usize,
    /// Minimum expected count for every cell to keep the chi-square result
    pub min_expected_count: f64,
    /// Apply Yates' continuity correction to 2x2 chi-square tests
    pub yates_correction: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            normality_alpha: DEFAULT_ALPHA,
            min_normality_samples: MIN_NORMALITY_SAMPLES,
            min_expected_count: DEFAULT_MIN_EXPECTED_COUNT,
            yates_correction: true,
        }
    }
}

impl SelectorConfig {
    /// Default selection rules with a different significance level.
    /// The normality threshold that picks the continuous test stays fixed.
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}

/// The hypothesis test that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TestKind {
    #[serde(rename = "t-test")]
    TTest,
    #[serde(rename = "Mann-Whitney U")]
    MannWhitneyU,
    #[serde(rename = "Chi-square")]
    ChiSquare,
    #[serde(rename = "Fisher's exact")]
    FisherExact,
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestKind::TTest => write!(f, "t-test"),
            TestKind::MannWhitneyU => write!(f, "Mann-Whitney U"),
            TestKind::ChiSquare => write!(f, "Chi-square"),
            TestKind::FisherExact => write!(f, "Fisher's exact"),
        }
    }
}

/// Path-specific evidence behind a result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum TestDetails {
    Continuous {
        n_no_asthma: usize,
        n_asthma: usize,
        normality_p_no_asthma: f64,
        normality_p_asthma: f64,
    },
    Categorical {
        table: ContingencyTable,
        min_expected_count: f64,
        /// Chi-square p-value, kept for reference even when discarded
        #[serde(skip_serializing_if = "Option::is_none")]
        chi_square_p_value: Option<f64>,
    },
}

/// Outcome of the selected test for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub feature: String,
    pub test: TestKind,
    /// t, U (first group), chi-square, or the exact-test odds ratio
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    /// Categorical features only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_ratio: Option<f64>,
    pub details: TestDetails,
}

/// A feature that could not be tested
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFailure {
    pub feature: String,
    pub reason: String,
}

/// Results for every tested feature plus isolated per-feature failures
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionReport {
    pub results: Vec<TestResult>,
    pub failures: Vec<FeatureFailure>,
}

impl SelectionReport {
    pub fn get(&self, feature: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.feature == feature)
    }

    pub fn significant(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.significant)
    }

    pub fn continuous(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.details, TestDetails::Continuous { .. }))
    }

    pub fn categorical(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.details, TestDetails::Categorical { .. }))
    }
}

/// Normality p-value for one group, forced to 0 for groups too small to test.
pub fn normality_p_value(values: &[f64], config: &SelectorConfig) -> f64 {
    if values.len() < config.min_normality_samples.max(MIN_NORMALITY_SAMPLES) {
        return 0.0;
    }
    shapiro_wilk(values).map(|t| t.p_value).unwrap_or(0.0)
}

/// Run the continuous path on pre-split groups.
pub fn test_continuous_groups(
    feature: &str,
    groups: &DiagnosisGroups,
    config: &SelectorConfig,
) -> AnalysisResult<TestResult> {
    if groups.no_asthma.is_empty() {
        return Err(AnalysisError::EmptyGroup {
            feature: feature.to_string(),
            group: NO_ASTHMA,
        });
    }
    if groups.asthma.is_empty() {
        return Err(AnalysisError::EmptyGroup {
            feature: feature.to_string(),
            group: ASTHMA,
        });
    }

    let p0 = normality_p_value(&groups.no_asthma, config);
    let p1 = normality_p_value(&groups.asthma, config);
    let both_normal = p0 > config.normality_alpha && p1 > config.normality_alpha;

    let (test, outcome) = if both_normal {
        let outcome = welch_t_test(&groups.no_asthma, &groups.asthma).ok_or_else(|| {
            AnalysisError::ZeroVariance {
                feature: feature.to_string(),
            }
        })?;
        (TestKind::TTest, outcome)
    } else {
        let outcome = mann_whitney_u(&groups.no_asthma, &groups.asthma).ok_or_else(|| {
            AnalysisError::EmptyGroup {
                feature: feature.to_string(),
                group: NO_ASTHMA,
            }
        })?;
        (TestKind::MannWhitneyU, outcome)
    };

    log::debug!(
        "{}: normality p = ({:.4}, {:.4}) -> {} (p = {:.4})",
        feature,
        p0,
        p1,
        test,
        outcome.p_value
    );

    Ok(TestResult {
        feature: feature.to_string(),
        test,
        statistic: outcome.statistic,
        p_value: outcome.p_value,
        significant: outcome.p_value < config.alpha,
        odds_ratio: None,
        details: TestDetails::Continuous {
            n_no_asthma: groups.no_asthma.len(),
            n_asthma: groups.asthma.len(),
            normality_p_no_asthma: p0,
            normality_p_asthma: p1,
        },
    })
}

/// Run the continuous path for a frame column.
pub fn test_continuous_feature(
    df: &DataFrame,
    feature: &str,
    target: &str,
    config: &SelectorConfig,
) -> AnalysisResult<TestResult> {
    let groups = split_by_diagnosis(df, feature, target)?;
    test_continuous_groups(feature, &groups, config)
}

/// Run the categorical path on a feature x diagnosis table.
///
/// Tables that are not 2x2 are rejected with
/// [`AnalysisError::MalformedContingencyTable`].
pub fn test_contingency_table(
    feature: &str,
    table: &ContingencyTable,
    config: &SelectorConfig,
) -> AnalysisResult<TestResult> {
    if !table.is_2x2() {
        let (rows, cols) = table.shape();
        log::warn!(
            "{}: {}x{} contingency table, skipping (2x2 required)",
            feature,
            rows,
            cols
        );
        return Err(AnalysisError::MalformedContingencyTable {
            feature: feature.to_string(),
            rows,
            cols,
        });
    }

    let min_expected = table.min_expected_count();
    let chi = table.chi_square(config.yates_correction);
    let chi_valid = min_expected >= config.min_expected_count;

    let (test, statistic, p_value, odds_ratio) = match chi.as_ref().filter(|_| chi_valid) {
        Some(chi) => {
            let odds_ratio = table.odds_ratio().ok_or_else(|| malformed(feature, table))?;
            (TestKind::ChiSquare, chi.statistic, chi.p_value, odds_ratio)
        }
        None => {
            let fisher = table.fisher_exact().ok_or_else(|| malformed(feature, table))?;
            (
                TestKind::FisherExact,
                fisher.odds_ratio,
                fisher.p_value,
                fisher.odds_ratio,
            )
        }
    };

    log::debug!(
        "{}: min expected count {:.2} -> {} (p = {:.4}, OR = {:.3})",
        feature,
        min_expected,
        test,
        p_value,
        odds_ratio
    );

    Ok(TestResult {
        feature: feature.to_string(),
        test,
        statistic,
        p_value,
        significant: p_value < config.alpha,
        odds_ratio: Some(odds_ratio),
        details: TestDetails::Categorical {
            table: table.clone(),
            min_expected_count: min_expected,
            chi_square_p_value: chi.map(|c| c.p_value),
        },
    })
}

fn malformed(feature: &str, table: &ContingencyTable) -> AnalysisError {
    let (rows, cols) = table.shape();
    AnalysisError::MalformedContingencyTable {
        feature: feature.to_string(),
        rows,
        cols,
    }
}

/// Run the categorical path for a frame column.
pub fn test_categorical_feature(
    df: &DataFrame,
    feature: &str,
    target: &str,
    config: &SelectorConfig,
) -> AnalysisResult<TestResult> {
    let pairs = paired_codes(df, feature, target)?;
    let table = ContingencyTable::from_pairs(pairs);
    test_contingency_table(feature, &table, config)
}

/// Test every feature declared in `schema`.
///
/// Dispatch is by declared kind. Results keep schema order; failures are
/// collected alongside rather than aborting the batch.
pub fn run_statistical_tests(
    df: &DataFrame,
    schema: &DatasetSchema,
    config: &SelectorConfig,
) -> SelectionReport {
    let outcomes: Vec<(String, AnalysisResult<TestResult>)> = schema
        .features
        .par_iter()
        .filter(|f| f.name != schema.target)
        .map(|f| {
            let outcome = match f.kind {
                FeatureKind::Continuous => {
                    test_continuous_feature(df, &f.name, &schema.target, config)
                }
                FeatureKind::Categorical | FeatureKind::Binary => {
                    test_categorical_feature(df, &f.name, &schema.target, config)
                }
            };
            (f.name.clone(), outcome)
        })
        .collect();

    let mut report = SelectionReport::default();
    for (feature, outcome) in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(e) => {
                log::warn!("Feature '{}' could not be tested: {}", feature, e);
                report.failures.push(FeatureFailure {
                    feature,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}
