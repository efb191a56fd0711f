//! Dataset schema: the declared semantic type of every analysed column
//!
//! Test dispatch in the selector is a lookup into this table rather than an
//! inspection of storage types at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, AnalysisResult};

/// Default name of the diagnosis column
pub const DIAGNOSIS_COLUMN: &str = "Diagnosis";

/// Identifier columns that never take part in the analysis
pub const EXCLUDED_COLUMNS: [&str; 2] = ["PatientID", "DoctorInCharge"];

/// Semantic type of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Continuous numeric measurement (tested with t-test / Mann-Whitney U)
    Continuous,
    /// Multi-level categorical or ordinal code
    Categorical,
    /// Two-level indicator
    Binary,
}

impl FeatureKind {
    /// Whether the feature goes through the contingency-table path
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureKind::Categorical | FeatureKind::Binary)
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Continuous => write!(f, "continuous"),
            FeatureKind::Categorical => write!(f, "categorical"),
            FeatureKind::Binary => write!(f, "binary"),
        }
    }
}

/// A named feature with its declared kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

/// Declared layout of a patient dataset.
///
/// Preconditions on the data itself (no missing values, no duplicate
/// patient identifiers) are guaranteed upstream and not re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Binary target column (1 = asthma, 0 = no asthma)
    pub target: String,
    /// Columns dropped before analysis when present
    #[serde(default)]
    pub excluded: Vec<String>,
    /// Analysed features in presentation order
    pub features: Vec<FeatureSpec>,
}

impl DatasetSchema {
    /// Schema of the asthma disease dataset: 10 continuous measurements,
    /// 16 categorical/binary attributes and the diagnosis target.
    pub fn asthma() -> Self {
        use FeatureKind::*;

        let features = [
            ("Age", Continuous),
            ("Gender", Binary),
            ("Ethnicity", Categorical),
            ("EducationLevel", Categorical),
            ("BMI", Continuous),
            ("Smoking", Binary),
            ("PhysicalActivity", Continuous),
            ("DietQuality", Continuous),
            ("SleepQuality", Continuous),
            ("PollutionExposure", Continuous),
            ("PollenExposure", Continuous),
            ("DustExposure", Continuous),
            ("PetAllergy", Binary),
            ("FamilyHistoryAsthma", Binary),
            ("HistoryOfAllergies", Binary),
            ("Eczema", Binary),
            ("HayFever", Binary),
            ("GastroesophagealReflux", Binary),
            ("LungFunctionFEV1", Continuous),
            ("LungFunctionFVC", Continuous),
            ("Wheezing", Binary),
            ("ShortnessOfBreath", Binary),
            ("ChestTightness", Binary),
            ("Coughing", Binary),
            ("NighttimeSymptoms", Binary),
            ("ExerciseInduced", Binary),
        ];

        Self {
            target: DIAGNOSIS_COLUMN.to_string(),
            excluded: EXCLUDED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            features: features
                .iter()
                .map(|(name, kind)| FeatureSpec {
                    name: name.to_string(),
                    kind: *kind,
                })
                .collect(),
        }
    }

    /// Load a schema override from a JSON file.
    pub fn from_json_file(path: &Path) -> AnalysisResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::missing_artifact(path, e))?;
        let schema: DatasetSchema = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::missing_artifact(path, e))?;
        schema.validate()?;
        Ok(schema)
    }

    /// The target must not also be declared as a feature.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.features.iter().any(|f| f.name == self.target) {
            return Err(AnalysisError::InvalidArtifact(format!(
                "target column '{}' is also declared as a feature",
                self.target
            )));
        }
        Ok(())
    }

    /// Declared kind of a column, if it is a feature.
    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        self.features.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    pub fn continuous_features(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Continuous)
            .map(|f| f.name.as_str())
    }

    /// Categorical and binary features. The target is never included.
    pub fn categorical_features(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter(|f| f.kind.is_categorical() && f.name != self.target)
            .map(|f| f.name.as_str())
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self::asthma()
    }
}
