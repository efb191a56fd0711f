//! Fitted classifier artifacts
//!
//! A fitted classifier is consumed only through [`Predictor`]. The concrete
//! [`ClassifierPipeline`] is a JSON document with an ordered list of feature
//! transforms followed by a single model stage.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, AnalysisResult};
use super::loader::{drop_columns_if_present, load_dataset, load_labels};
use super::target::float_values;

/// File name of the cleaning / feature-engineering pipeline
pub const CLEANING_PIPELINE_FILE: &str = "clf_pipeline_data_cleaning_feat_eng.json";
/// File name of the scaling + model pipeline
pub const MODEL_PIPELINE_FILE: &str = "clf_pipeline_model.json";

/// Anything that maps a feature frame to one class label per row.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &DataFrame) -> AnalysisResult<Vec<i64>>;
}

/// One feature-transform step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformStep {
    /// Remove columns if present
    DropColumns { columns: Vec<String> },
    /// `(x - mean) / scale` per column
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl TransformStep {
    fn validate(&self) -> AnalysisResult<()> {
        if let TransformStep::StandardScaler {
            columns,
            mean,
            scale,
        } = self
        {
            if mean.len() != columns.len() || scale.len() != columns.len() {
                return Err(AnalysisError::InvalidArtifact(format!(
                    "standard_scaler has {} columns but {} means and {} scales",
                    columns.len(),
                    mean.len(),
                    scale.len()
                )));
            }
            if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(AnalysisError::InvalidArtifact(
                    "standard_scaler scale must be finite and non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn apply(&self, df: &DataFrame) -> AnalysisResult<DataFrame> {
        match self {
            TransformStep::DropColumns { columns } => Ok(drop_columns_if_present(df, columns)),
            TransformStep::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                let mut out = df.clone();
                for ((name, mean), scale) in columns.iter().zip(mean).zip(scale) {
                    let scaled: Vec<Option<f64>> = float_values(df, name)?
                        .into_iter()
                        .map(|v| v.map(|x| (x - mean) / scale))
                        .collect();
                    out.with_column(Series::new(name.as_str().into(), scaled))?;
                }
                Ok(out)
            }
        }
    }
}

/// Ordered sequence of transform steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTransform {
    #[serde(default)]
    pub steps: Vec<TransformStep>,
}

impl FeatureTransform {
    pub fn apply(&self, df: &DataFrame) -> AnalysisResult<DataFrame> {
        let mut out = df.clone();
        for step in &self.steps {
            out = step.apply(&out)?;
        }
        Ok(out)
    }

    pub fn from_json_file(path: &Path) -> AnalysisResult<Self> {
        let transform: FeatureTransform = read_json(path)?;
        for step in &transform.steps {
            step.validate()?;
        }
        Ok(transform)
    }
}

/// Final estimator of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelStage {
    /// Binary logistic regression. Predicts `classes[1]` when the positive
    /// class probability is at least `threshold`, otherwise `classes[0]`.
    LogisticRegression {
        features: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default = "default_classes")]
        classes: [i64; 2],
    },
}

fn default_threshold() -> f64 {
    0.5
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

impl ModelStage {
    fn validate(&self) -> AnalysisResult<()> {
        let ModelStage::LogisticRegression {
            features,
            coefficients,
            threshold,
            ..
        } = self;
        if features.len() != coefficients.len() {
            return Err(AnalysisError::InvalidArtifact(format!(
                "logistic_regression has {} features but {} coefficients",
                features.len(),
                coefficients.len()
            )));
        }
        if !(0.0..=1.0).contains(threshold) {
            return Err(AnalysisError::InvalidArtifact(format!(
                "threshold {} is outside [0, 1]",
                threshold
            )));
        }
        Ok(())
    }

    /// Positive-class probability for every row.
    pub fn predict_proba(&self, df: &DataFrame) -> AnalysisResult<Vec<f64>> {
        let ModelStage::LogisticRegression {
            features,
            coefficients,
            intercept,
            ..
        } = self;

        let mut logits = vec![*intercept; df.height()];
        for (name, coef) in features.iter().zip(coefficients) {
            let values = float_values(df, name)?;
            for (logit, value) in logits.iter_mut().zip(values) {
                let x = value.ok_or_else(|| {
                    AnalysisError::InvalidArtifact(format!(
                        "feature '{}' contains missing values",
                        name
                    ))
                })?;
                *logit += coef * x;
            }
        }
        Ok(logits.into_iter().map(sigmoid).collect())
    }

    pub fn predict(&self, df: &DataFrame) -> AnalysisResult<Vec<i64>> {
        let ModelStage::LogisticRegression {
            threshold, classes, ..
        } = self;
        Ok(self
            .predict_proba(df)?
            .into_iter()
            .map(|p| if p >= *threshold { classes[1] } else { classes[0] })
            .collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Transform stage followed by a model stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierPipeline {
    #[serde(default)]
    pub transform: FeatureTransform,
    pub model: ModelStage,
}

impl ClassifierPipeline {
    pub fn from_json_file(path: &Path) -> AnalysisResult<Self> {
        let pipeline: ClassifierPipeline = read_json(path)?;
        for step in &pipeline.transform.steps {
            step.validate()?;
        }
        pipeline.model.validate()?;
        Ok(pipeline)
    }
}

impl Predictor for ClassifierPipeline {
    fn predict(&self, features: &DataFrame) -> AnalysisResult<Vec<i64>> {
        let transformed = self.transform.apply(features)?;
        self.model.predict(&transformed)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AnalysisResult<T> {
    let text =
        std::fs::read_to_string(path).map_err(|e| AnalysisError::missing_artifact(path, e))?;
    serde_json::from_str(&text).map_err(|e| AnalysisError::missing_artifact(path, e))
}

/// Directory layout of a versioned set of model artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactLayout {
    pub root: PathBuf,
    pub version: String,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.version)
    }

    pub fn cleaning_pipeline(&self) -> PathBuf {
        self.dir().join(CLEANING_PIPELINE_FILE)
    }

    pub fn model_pipeline(&self) -> PathBuf {
        self.dir().join(MODEL_PIPELINE_FILE)
    }

    pub fn x_train(&self) -> PathBuf {
        self.dir().join("X_train.csv")
    }

    pub fn x_test(&self) -> PathBuf {
        self.dir().join("X_test.csv")
    }

    pub fn y_train(&self) -> PathBuf {
        self.dir().join("y_train.csv")
    }

    pub fn y_test(&self) -> PathBuf {
        self.dir().join("y_test.csv")
    }
}

/// Features and labels of one split
#[derive(Debug, Clone)]
pub struct LabelledSplit {
    pub features: DataFrame,
    pub labels: Vec<i64>,
}

/// Everything needed to evaluate a trained classifier
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub cleaning: FeatureTransform,
    pub model: ClassifierPipeline,
    pub train: LabelledSplit,
    pub test: LabelledSplit,
}

/// Load every artifact of one version. The split files already carry
/// engineered features, so only the model pipeline is applied to them.
pub fn load_artifacts(
    layout: &ArtifactLayout,
    infer_schema_length: usize,
) -> AnalysisResult<ModelArtifacts> {
    let cleaning = FeatureTransform::from_json_file(&layout.cleaning_pipeline())?;
    let model = ClassifierPipeline::from_json_file(&layout.model_pipeline())?;

    let train = LabelledSplit {
        features: load_dataset(&layout.x_train(), infer_schema_length)?,
        labels: load_labels(&layout.y_train(), infer_schema_length)?,
    };
    let test = LabelledSplit {
        features: load_dataset(&layout.x_test(), infer_schema_length)?,
        labels: load_labels(&layout.y_test(), infer_schema_length)?,
    };

    log::debug!(
        "Loaded artifacts {} (train {} rows, test {} rows)",
        layout.dir().display(),
        train.features.height(),
        test.features.height()
    );

    Ok(ModelArtifacts {
        cleaning,
        model,
        train,
        test,
    })
}
