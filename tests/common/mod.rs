//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Ten quantiles of a standard normal; passes Shapiro-Wilk comfortably
pub const NORMALISH: [f64; 10] = [
    -1.55, -1.00, -0.65, -0.37, -0.12, 0.12, 0.37, 0.65, 1.00, 1.55,
];

/// Two tight clusters at the ends of [0, 1]; rejected by Shapiro-Wilk.
/// Ten evenly spread uniform draws usually pass normality, so the
/// non-normal group has to be strongly bimodal.
pub const BIMODAL_EDGES: [f64; 10] = [0.0, 0.01, 0.02, 0.03, 0.04, 0.96, 0.97, 0.98, 0.99, 1.0];

/// Right-skewed sample with a Shapiro-Wilk p-value between 0.01 and 0.05
pub const RIGHT_SKEWED: [f64; 10] = [1.0, 1.1, 1.2, 1.3, 1.5, 1.8, 2.2, 2.9, 3.9, 5.5];

const BINARY_FEATURES: [&str; 14] = [
    "Gender",
    "Smoking",
    "PetAllergy",
    "FamilyHistoryAsthma",
    "HistoryOfAllergies",
    "Eczema",
    "HayFever",
    "GastroesophagealReflux",
    "ShortnessOfBreath",
    "ChestTightness",
    "Coughing",
    "NighttimeSymptoms",
    "ExerciseInduced",
    "Wheezing",
];

const UNIFORM_FEATURES: [(&str, f64, f64); 7] = [
    ("BMI", 15.0, 40.0),
    ("PhysicalActivity", 0.0, 10.0),
    ("DietQuality", 0.0, 10.0),
    ("SleepQuality", 4.0, 10.0),
    ("PollutionExposure", 0.0, 10.0),
    ("PollenExposure", 0.0, 10.0),
    ("DustExposure", 0.0, 10.0),
];

/// Synthetic patient table with every column of the asthma dataset.
///
/// Every fourth patient has asthma. Asthma patients wheeze far more often
/// and have lower FEV1; every other feature is noise. `Age` is stored as
/// an integer and `DoctorInCharge` as a string, as in the real file.
pub fn create_patient_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let diagnosis: Vec<i64> = (0..rows).map(|i| i64::from(i % 4 == 0)).collect();

    let mut columns: Vec<Column> = Vec::new();
    columns.push(Column::new(
        "PatientID".into(),
        (0..rows).map(|i| 5034 + i as i64).collect::<Vec<i64>>(),
    ));
    columns.push(Column::new(
        "Age".into(),
        (0..rows)
            .map(|_| rng.gen_range(5i64..80))
            .collect::<Vec<i64>>(),
    ));
    columns.push(Column::new(
        "Ethnicity".into(),
        (0..rows)
            .map(|_| rng.gen_range(0i64..4))
            .collect::<Vec<i64>>(),
    ));
    columns.push(Column::new(
        "EducationLevel".into(),
        (0..rows)
            .map(|_| rng.gen_range(0i64..4))
            .collect::<Vec<i64>>(),
    ));

    for (name, low, high) in UNIFORM_FEATURES {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen_range(low..high)).collect();
        columns.push(Column::new(name.into(), values));
    }

    for name in BINARY_FEATURES {
        let values: Vec<i64> = diagnosis
            .iter()
            .map(|&d| {
                let p = match (name, d) {
                    ("Wheezing", 1) => 0.85,
                    ("Wheezing", _) => 0.15,
                    _ => 0.5,
                };
                i64::from(rng.gen_bool(p))
            })
            .collect();
        columns.push(Column::new(name.into(), values));
    }

    let fev1: Vec<f64> = diagnosis
        .iter()
        .map(|&d| {
            let base = if d == 1 { 1.5 } else { 2.5 };
            base + rng.gen_range(0.0..1.0)
        })
        .collect();
    columns.push(Column::new("LungFunctionFEV1".into(), fev1));
    columns.push(Column::new(
        "LungFunctionFVC".into(),
        (0..rows)
            .map(|_| rng.gen_range(1.5..6.0))
            .collect::<Vec<f64>>(),
    ));

    columns.push(Column::new("Diagnosis".into(), diagnosis));
    columns.push(Column::new(
        "DoctorInCharge".into(),
        vec!["Dr_Confid"; rows],
    ));

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("asthma_disease_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("asthma_disease_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

fn write_csv(path: &Path, df: &mut DataFrame) {
    let mut file = std::fs::File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
}

/// Write a complete `v1` artifact set under `root`.
///
/// The model scales `x1` by (mean 0, scale 2) and predicts asthma when
/// `x1 > 0`. Train predictions are all correct; on the test split the
/// asthma class gets precision 0.5 and recall 0.5.
pub fn write_artifacts(root: &Path) -> PathBuf {
    let dir = root.join("v1");
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(
        dir.join("clf_pipeline_data_cleaning_feat_eng.json"),
        r#"{"steps": [{"kind": "drop_columns", "columns": ["PatientID", "DoctorInCharge"]}]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("clf_pipeline_model.json"),
        r#"{
            "transform": {"steps": [
                {"kind": "standard_scaler", "columns": ["x1"], "mean": [0.0], "scale": [2.0]}
            ]},
            "model": {
                "kind": "logistic_regression",
                "features": ["x1", "x2"],
                "coefficients": [3.0, 0.0],
                "intercept": 0.0,
                "threshold": 0.5,
                "classes": [0, 1]
            }
        }"#,
    )
    .unwrap();

    let mut x_train = df! {
        "x1" => [-2.0f64, -1.0, -0.5, 1.0, 2.0, 0.5],
        "x2" => [1.0f64, 0.0, 1.0, 0.0, 1.0, 0.0],
    }
    .unwrap();
    let mut y_train = df! { "Diagnosis" => [0i64, 0, 0, 1, 1, 1] }.unwrap();
    let mut x_test = df! {
        "x1" => [-1.0f64, 1.0, 1.0, -1.0],
        "x2" => [0.0f64, 0.0, 1.0, 1.0],
    }
    .unwrap();
    let mut y_test = df! { "Diagnosis" => [0i64, 1, 0, 1] }.unwrap();

    write_csv(&dir.join("X_train.csv"), &mut x_train);
    write_csv(&dir.join("y_train.csv"), &mut y_train);
    write_csv(&dir.join("X_test.csv"), &mut x_test);
    write_csv(&dir.join("y_test.csv"), &mut y_test);

    dir
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
