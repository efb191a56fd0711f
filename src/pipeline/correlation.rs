//! Feature-target correlation
//!
//! Pearson correlation of every feature against the binary diagnosis, used
//! for descriptive ranking only (no hypothesis test).

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use super::error::AnalysisResult;
use super::schema::DatasetSchema;
use super::target::float_values;

/// Correlation of one feature with the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCorrelation {
    pub feature: String,
    /// `None` when either column is constant or no complete pairs exist
    pub coefficient: Option<f64>,
}

/// Correlate every schema feature with the target, in schema order.
pub fn target_correlations(
    df: &DataFrame,
    schema: &DatasetSchema,
) -> AnalysisResult<Vec<FeatureCorrelation>> {
    let target = float_values(df, &schema.target)?;

    schema
        .features
        .par_iter()
        .filter(|f| f.name != schema.target)
        .map(|f| -> AnalysisResult<FeatureCorrelation> {
            let values = float_values(df, &f.name)?;
            Ok(FeatureCorrelation {
                feature: f.name.clone(),
                coefficient: pearson_correlation(&values, &target),
            })
        })
        .collect()
}

/// Sort correlations by absolute coefficient, strongest first. Undefined
/// coefficients go last.
pub fn rank_by_strength(correlations: &[FeatureCorrelation]) -> Vec<FeatureCorrelation> {
    let mut ranked = correlations.to_vec();
    ranked.sort_by(|a, b| {
        let a = a.coefficient.map(f64::abs).unwrap_or(-1.0);
        let b = b.coefficient.map(f64::abs).unwrap_or(-1.0);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Pearson correlation using Welford's single-pass algorithm.
///
/// Pairs where either value is missing or NaN are skipped.
pub fn pearson_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in x.iter().zip(y.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            if x.is_nan() || y.is_nan() {
                continue;
            }
            n += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if n < 2.0 || var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_perfect_positive() {
        let r = pearson_correlation(&some(&[1.0, 2.0, 3.0, 4.0]), &some(&[2.0, 4.0, 6.0, 8.0]));
        assert!((r.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_negative() {
        let r = pearson_correlation(&some(&[1.0, 2.0, 3.0]), &some(&[3.0, 2.0, 1.0]));
        assert!((r.unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_is_undefined() {
        assert!(pearson_correlation(&some(&[1.0, 1.0, 1.0]), &some(&[0.0, 1.0, 0.0])).is_none());
    }

    #[test]
    fn test_missing_pairs_skipped() {
        let x = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        let y = vec![Some(1.0), Some(100.0), Some(2.0), Some(3.0)];
        assert!((pearson_correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_by_strength() {
        let correlations = vec![
            FeatureCorrelation {
                feature: "a".into(),
                coefficient: Some(0.1),
            },
            FeatureCorrelation {
                feature: "b".into(),
                coefficient: None,
            },
            FeatureCorrelation {
                feature: "c".into(),
                coefficient: Some(-0.5),
            },
        ];
        let ranked = rank_by_strength(&correlations);
        let names: Vec<&str> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
