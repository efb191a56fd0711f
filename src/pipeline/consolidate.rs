//! Categorical consolidation
//!
//! Collapses sparse multi-level categorical codes into two levels so that
//! every categorical feature yields a 2x2 contingency table.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::AnalysisResult;

/// Level mapping for one column. Levels not listed pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationRule {
    pub column: String,
    /// `(from, to)` pairs
    pub mapping: Vec<(i64, i64)>,
}

impl ConsolidationRule {
    pub fn new(column: &str, mapping: &[(i64, i64)]) -> Self {
        Self {
            column: column.to_string(),
            mapping: mapping.to_vec(),
        }
    }

    /// Map a single level.
    pub fn apply(&self, value: i64) -> i64 {
        self.mapping
            .iter()
            .find(|(from, _)| *from == value)
            .map(|(_, to)| *to)
            .unwrap_or(value)
    }
}

/// The fixed mapping table used for the asthma dataset.
///
/// `Ethnicity`: Caucasian (0) vs other (1, 2, 3 -> 1).
/// `EducationLevel`: high school / bachelor's (1, 2) -> 1, higher (3) -> 0.
/// Education level 0 ("None") is not listed and keeps its code.
pub fn default_rules() -> Vec<ConsolidationRule> {
    vec![
        ConsolidationRule::new("Ethnicity", &[(0, 0), (1, 1), (2, 1), (3, 1)]),
        ConsolidationRule::new("EducationLevel", &[(1, 1), (2, 1), (3, 0)]),
    ]
}

/// Apply consolidation rules, returning a new frame.
///
/// The input is not modified and columns named by a rule but absent from the
/// frame are skipped. Nulls stay null.
pub fn consolidate(df: &DataFrame, rules: &[ConsolidationRule]) -> AnalysisResult<DataFrame> {
    let mut out = df.clone();

    for rule in rules {
        if out.get_column_index(&rule.column).is_none() {
            log::debug!("Consolidation skipped: column '{}' not present", rule.column);
            continue;
        }

        let cast = out.column(&rule.column)?.cast(&DataType::Int64)?;
        let mapped: Vec<Option<i64>> = cast
            .i64()?
            .iter()
            .map(|v| v.map(|level| rule.apply(level)))
            .collect();

        out.with_column(Series::new(rule.column.as_str().into(), mapped))?;
    }

    Ok(out)
}
