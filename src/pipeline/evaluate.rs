//! Classifier evaluation: confusion matrices and precision/recall
//!
//! Matrix rows are actual labels and columns are predicted labels, both in
//! label-map order.

use polars::prelude::DataFrame;
use serde::Serialize;

use super::error::{AnalysisError, AnalysisResult};
use super::model::{LabelledSplit, Predictor};
use super::target::{ASTHMA, NO_ASTHMA};

/// Ordered mapping from class value to display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMap {
    pub classes: Vec<(i64, String)>,
}

impl LabelMap {
    /// Class values `0..n` named in order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            classes: names
                .iter()
                .enumerate()
                .map(|(i, name)| (i as i64, name.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn index_of(&self, value: i64) -> AnalysisResult<usize> {
        self.classes
            .iter()
            .position(|(v, _)| *v == value)
            .ok_or(AnalysisError::UnknownLabel(value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(_, name)| name.as_str())
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self {
            classes: vec![
                (NO_ASTHMA, "No asthma".to_string()),
                (ASTHMA, "Asthma".to_string()),
            ],
        }
    }
}

/// Precision and recall of one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    /// Number of actual instances of the class
    pub support: u64,
}

/// Evaluation of one split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionSummary {
    pub split: String,
    pub labels: Vec<String>,
    /// `matrix[actual][predicted]`
    pub matrix: Vec<Vec<u64>>,
    pub report: Vec<ClassMetrics>,
    pub accuracy: f64,
}

impl ConfusionSummary {
    pub fn metrics_for(&self, class: &str) -> Option<&ClassMetrics> {
        self.report.iter().find(|m| m.class == class)
    }
}

/// Train and test evaluation of one classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierPerformance {
    pub train: ConfusionSummary,
    pub test: ConfusionSummary,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ratio(numerator: u64, denominator: u64, what: &str, class: &str, split: &str) -> f64 {
    if denominator == 0 {
        log::warn!(
            "{} for class '{}' on {} split is undefined; reporting 0.0",
            what,
            class,
            split
        );
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Build the confusion summary of already-predicted labels.
pub fn summarize_predictions(
    split: &str,
    actual: &[i64],
    predicted: &[i64],
    label_map: &LabelMap,
) -> AnalysisResult<ConfusionSummary> {
    if actual.len() != predicted.len() {
        return Err(AnalysisError::LengthMismatch {
            what: format!("{} predictions", split),
            expected: actual.len(),
            actual: predicted.len(),
        });
    }

    let k = label_map.len();
    let mut matrix = vec![vec![0u64; k]; k];
    for (a, p) in actual.iter().zip(predicted) {
        let row = label_map.index_of(*a)?;
        let col = label_map.index_of(*p)?;
        matrix[row][col] += 1;
    }

    let report = label_map
        .names()
        .enumerate()
        .map(|(i, class)| {
            let tp = matrix[i][i];
            let predicted_total: u64 = matrix.iter().map(|row| row[i]).sum();
            let actual_total: u64 = matrix[i].iter().sum();
            ClassMetrics {
                class: class.to_string(),
                precision: round2(ratio(tp, predicted_total, "precision", class, split)),
                recall: round2(ratio(tp, actual_total, "recall", class, split)),
                support: actual_total,
            }
        })
        .collect();

    let correct: u64 = (0..k).map(|i| matrix[i][i]).sum();
    let accuracy = if actual.is_empty() {
        0.0
    } else {
        round2(correct as f64 / actual.len() as f64)
    };

    Ok(ConfusionSummary {
        split: split.to_string(),
        labels: label_map.names().map(str::to_string).collect(),
        matrix,
        report,
        accuracy,
    })
}

/// Predict one split and summarise it.
pub fn evaluate_split(
    split: &str,
    features: &DataFrame,
    labels: &[i64],
    predictor: &dyn Predictor,
    label_map: &LabelMap,
) -> AnalysisResult<ConfusionSummary> {
    if features.height() != labels.len() {
        return Err(AnalysisError::LengthMismatch {
            what: format!("{} labels", split),
            expected: features.height(),
            actual: labels.len(),
        });
    }
    let predicted = predictor.predict(features)?;
    summarize_predictions(split, labels, &predicted, label_map)
}

/// Evaluate a classifier on its train and test splits.
pub fn evaluate_classifier(
    train: &LabelledSplit,
    test: &LabelledSplit,
    predictor: &dyn Predictor,
    label_map: &LabelMap,
) -> AnalysisResult<ClassifierPerformance> {
    Ok(ClassifierPerformance {
        train: evaluate_split("train", &train.features, &train.labels, predictor, label_map)?,
        test: evaluate_split("test", &test.features, &test.labels, predictor, label_map)?,
    })
}

/// Minimum precision and recall for the class of interest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessCriteria {
    pub class: String,
    pub min_recall: f64,
    pub min_precision: f64,
}

impl Default for SuccessCriteria {
    fn default() -> Self {
        Self {
            class: "Asthma".to_string(),
            min_recall: 0.80,
            min_precision: 0.60,
        }
    }
}

/// Whether one split met the criteria
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriteriaAssessment {
    pub split: String,
    pub recall: f64,
    pub precision: f64,
    pub recall_met: bool,
    pub precision_met: bool,
}

impl CriteriaAssessment {
    pub fn passed(&self) -> bool {
        self.recall_met && self.precision_met
    }
}

impl SuccessCriteria {
    /// `None` when the class is absent from the summary.
    pub fn assess(&self, summary: &ConfusionSummary) -> Option<CriteriaAssessment> {
        let metrics = summary.metrics_for(&self.class)?;
        Some(CriteriaAssessment {
            split: summary.split.clone(),
            recall: metrics.recall,
            precision: metrics.precision,
            recall_met: metrics.recall >= self.min_recall,
            precision_met: metrics.precision >= self.min_precision,
        })
    }
}
