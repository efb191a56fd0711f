//! Target column access and diagnosis-group partitioning
//!
//! Helpers that pull typed values out of the analysis frame and split a
//! feature by diagnosis group.

use polars::prelude::*;

use super::error::{AnalysisError, AnalysisResult};

/// Diagnosis code for patients without asthma
pub const NO_ASTHMA: i64 = 0;

/// Diagnosis code for patients with asthma
pub const ASTHMA: i64 = 1;

/// Float values of a column (nulls kept as `None`)
pub fn float_values(df: &DataFrame, name: &str) -> AnalysisResult<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.iter().collect())
}

/// Integer codes of a column (nulls kept as `None`)
pub fn int_values(df: &DataFrame, name: &str) -> AnalysisResult<Vec<Option<i64>>> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::Int64)?;
    Ok(cast.i64()?.iter().collect())
}

/// Continuous values of `feature` split by diagnosis.
///
/// Rows with a null/NaN feature value or a null diagnosis are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosisGroups {
    /// Diagnosis = 0
    pub no_asthma: Vec<f64>,
    /// Diagnosis = 1
    pub asthma: Vec<f64>,
}

pub fn split_by_diagnosis(
    df: &DataFrame,
    feature: &str,
    target: &str,
) -> AnalysisResult<DiagnosisGroups> {
    let values = float_values(df, feature)?;
    let labels = int_values(df, target)?;

    let mut groups = DiagnosisGroups::default();
    for (value, label) in values.into_iter().zip(labels) {
        match (value, label) {
            (Some(v), Some(NO_ASTHMA)) if !v.is_nan() => groups.no_asthma.push(v),
            (Some(v), Some(ASTHMA)) if !v.is_nan() => groups.asthma.push(v),
            _ => {}
        }
    }
    Ok(groups)
}

/// `(feature level, diagnosis)` pairs with nulls dropped
pub fn paired_codes(
    df: &DataFrame,
    feature: &str,
    target: &str,
) -> AnalysisResult<Vec<(i64, i64)>> {
    let levels = int_values(df, feature)?;
    let labels = int_values(df, target)?;
    Ok(levels
        .into_iter()
        .zip(labels)
        .filter_map(|(level, label)| Some((level?, label?)))
        .collect())
}

/// Count patients per diagnosis code `(no_asthma, asthma)`.
pub fn count_diagnoses(df: &DataFrame, target: &str) -> AnalysisResult<(usize, usize)> {
    let labels = int_values(df, target)?;
    let asthma = labels.iter().filter(|l| **l == Some(ASTHMA)).count();
    let no_asthma = labels.iter().filter(|l| **l == Some(NO_ASTHMA)).count();
    Ok((no_asthma, asthma))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_diagnosis_drops_missing() {
        let df = df! {
            "Diagnosis" => [Some(0i64), Some(1), Some(0), Some(1), None],
            "BMI" => [Some(20.0f64), Some(30.0), None, Some(f64::NAN), Some(25.0)],
        }
        .unwrap();

        let groups = split_by_diagnosis(&df, "BMI", "Diagnosis").unwrap();
        assert_eq!(groups.no_asthma, vec![20.0]);
        assert_eq!(groups.asthma, vec![30.0]);
    }

    #[test]
    fn test_paired_codes() {
        let df = df! {
            "Diagnosis" => [Some(0i64), Some(1), None],
            "Smoking" => [Some(1i64), None, Some(0)],
        }
        .unwrap();
        assert_eq!(paired_codes(&df, "Smoking", "Diagnosis").unwrap(), vec![(1, 0)]);
    }

    #[test]
    fn test_count_diagnoses() {
        let df = df! { "Diagnosis" => [0i64, 1, 0, 0] }.unwrap();
        assert_eq!(count_diagnoses(&df, "Diagnosis").unwrap(), (3, 1));
    }

    #[test]
    fn test_missing_column() {
        let df = df! { "Diagnosis" => [0i64] }.unwrap();
        let err = float_values(&df, "BMI").unwrap_err();
        assert!(err.to_string().contains("BMI"));
    }
}
