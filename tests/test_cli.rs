//! Tests for CLI argument parsing and the binary

use assert_cmd::Command;
use asthmastat::cli::{Cli, Commands};
use clap::Parser;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_study_default_values() {
    let cli = Cli::parse_from(["asthmastat", "study", "-i", "data.csv"]);

    match cli.command {
        Commands::Study {
            input,
            schema,
            alpha,
            no_consolidate,
            infer_schema_length,
            json,
            export,
        } => {
            assert_eq!(input, PathBuf::from("data.csv"));
            assert!(schema.is_none());
            assert_eq!(alpha, 0.05, "Default alpha should be 0.05");
            assert!(!no_consolidate);
            assert_eq!(
                infer_schema_length, 10000,
                "Default schema inference should be 10000"
            );
            assert!(!json);
            assert!(export.is_none());
        }
        _ => panic!("expected study command"),
    }
}

#[test]
fn test_evaluate_default_values() {
    let cli = Cli::parse_from(["asthmastat", "evaluate", "--artifacts", "outputs"]);

    match cli.command {
        Commands::Evaluate {
            artifacts,
            version,
            min_recall,
            min_precision,
            ..
        } => {
            assert_eq!(artifacts, PathBuf::from("outputs"));
            assert_eq!(version, "v1");
            assert_eq!(min_recall, 0.80);
            assert_eq!(min_precision, 0.60);
        }
        _ => panic!("expected evaluate command"),
    }
}

#[test]
fn test_alpha_out_of_range_rejected() {
    let result = Cli::try_parse_from(["asthmastat", "study", "-i", "data.csv", "--alpha", "1.5"]);
    assert!(result.is_err());
}

#[test]
fn test_study_requires_input() {
    assert!(Cli::try_parse_from(["asthmastat", "study"]).is_err());
}

#[test]
fn test_study_json_output() {
    let mut df = common::create_patient_dataframe(200, 13);
    let (_dir, path) = common::create_temp_csv(&mut df);

    let output = Command::cargo_bin("asthmastat")
        .unwrap()
        .args(["study", "--json", "-i"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["tests"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 26);
    assert_eq!(report["summary"]["failed_features"], 0);
    assert_eq!(report["hypotheses"].as_array().unwrap().len(), 4);
    assert_eq!(report["hypotheses"][1]["id"], "H2");
    assert_eq!(report["hypotheses"][1]["supported"], true);
}

#[test]
fn test_study_export_file() {
    let mut df = common::create_patient_dataframe(100, 17);
    let (dir, path) = common::create_temp_csv(&mut df);
    let export = dir.path().join("study.json");

    Command::cargo_bin("asthmastat")
        .unwrap()
        .args(["study", "-i"])
        .arg(&path)
        .arg("--export")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Study complete"));

    let text = std::fs::read_to_string(&export).unwrap();
    assert!(text.contains("\"asthmastat_version\""));
}

#[test]
fn test_study_missing_input_fails() {
    Command::cargo_bin("asthmastat")
        .unwrap()
        .args(["study", "--json", "-i", "does_not_exist.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does_not_exist.csv"));
}

#[test]
fn test_evaluate_json_output() {
    let temp_dir = TempDir::new().unwrap();
    common::write_artifacts(temp_dir.path());

    let output = Command::cargo_bin("asthmastat")
        .unwrap()
        .args(["evaluate", "--json", "--artifacts"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["version"], "v1");
    assert_eq!(report["performance"]["train"]["accuracy"], 1.0);
    assert_eq!(report["assessments"][1]["split"], "test");
    assert_eq!(report["assessments"][1]["recall_met"], false);
}

#[test]
fn test_evaluate_missing_artifacts_fails() {
    let temp_dir = TempDir::new().unwrap();

    Command::cargo_bin("asthmastat")
        .unwrap()
        .args(["evaluate", "--artifacts"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "clf_pipeline_data_cleaning_feat_eng.json",
        ));
}

fn study_test_kind(data: &std::path::Path, schema: &std::path::Path, extra: &[&str]) -> String {
    let output = Command::cargo_bin("asthmastat")
        .unwrap()
        .args(["study", "--json", "--no-consolidate", "-i"])
        .arg(data)
        .arg("--schema")
        .arg(schema)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    report["tests"]["results"][0]["test"]
        .as_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_study_alpha_keeps_continuous_test_choice() {
    let values: Vec<f64> = common::NORMALISH
        .iter()
        .chain(common::RIGHT_SKEWED.iter())
        .copied()
        .collect();
    let diagnosis: Vec<i64> = [0i64; 10].into_iter().chain([1i64; 10]).collect();
    let mut df = polars::df! {
        "BMI" => values,
        "Diagnosis" => diagnosis,
    }
    .unwrap();
    let (dir, data) = common::create_temp_csv(&mut df);
    let schema = dir.path().join("schema.json");
    std::fs::write(
        &schema,
        r#"{ "target": "Diagnosis", "features": [{ "name": "BMI", "kind": "continuous" }] }"#,
    )
    .unwrap();

    assert_eq!(study_test_kind(&data, &schema, &[]), "Mann-Whitney U");
    assert_eq!(
        study_test_kind(&data, &schema, &["--alpha", "0.01"]),
        "Mann-Whitney U"
    );
}
