//! Tests for feature-diagnosis correlation

use asthmastat::pipeline::{
    consolidate, default_rules, pearson_correlation, prepare_patient_frame, rank_by_strength,
    target_correlations, DatasetSchema, FeatureKind, FeatureSpec,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_correlations_follow_schema_order() {
    let schema = DatasetSchema::asthma();
    let df = prepare_patient_frame(&common::create_patient_dataframe(200, 21), &schema).unwrap();
    let df = consolidate(&df, &default_rules()).unwrap();

    let correlations = target_correlations(&df, &schema).unwrap();
    let names: Vec<&str> = correlations.iter().map(|c| c.feature.as_str()).collect();
    let declared: Vec<&str> = schema.feature_names().collect();
    assert_eq!(names, declared);
}

#[test]
fn test_strongest_correlations_ranked_first() {
    let schema = DatasetSchema::asthma();
    let df = prepare_patient_frame(&common::create_patient_dataframe(200, 21), &schema).unwrap();

    let ranked = rank_by_strength(&target_correlations(&df, &schema).unwrap());

    assert_eq!(ranked[0].feature, "LungFunctionFEV1");
    assert!(ranked[0].coefficient.unwrap() < -0.6);
    assert_eq!(ranked[1].feature, "Wheezing");
    assert!(ranked[1].coefficient.unwrap() > 0.4);
}

#[test]
fn test_constant_feature_has_no_coefficient() {
    let df = df! {
        "Diagnosis" => [0i64, 1, 0, 1],
        "Eczema" => [1i64, 1, 1, 1],
    }
    .unwrap();
    let schema = DatasetSchema {
        target: "Diagnosis".to_string(),
        excluded: vec![],
        features: vec![FeatureSpec {
            name: "Eczema".to_string(),
            kind: FeatureKind::Binary,
        }],
    };

    let correlations = target_correlations(&df, &schema).unwrap();
    assert_eq!(correlations.len(), 1);
    assert!(correlations[0].coefficient.is_none());
}

#[test]
fn test_pearson_known_value() {
    let x: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().map(Some).collect();
    let y: Vec<Option<f64>> = [2.0, 1.0, 4.0, 3.0, 5.0].into_iter().map(Some).collect();
    let r = pearson_correlation(&x, &y).unwrap();
    assert!((r - 0.8).abs() < 1e-12);
}
