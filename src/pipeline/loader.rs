//! Dataset loader for CSV and Parquet files
//!
//! Patient data is read through a [`PatientDataSource`] and memoised by a
//! [`PatientRepository`], so the backing file is read at most once per
//! repository regardless of how many analyses run against it.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use polars::prelude::*;

use super::error::{AnalysisError, AnalysisResult};
use super::schema::{DatasetSchema, FeatureKind};

/// Default number of rows used for CSV schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Load a dataset from a file (CSV or Parquet based on extension).
///
/// Any failure, including a missing file, is reported as
/// [`AnalysisError::MissingArtifact`] naming the path.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> AnalysisResult<DataFrame> {
    if !path.exists() {
        return Err(AnalysisError::missing_artifact(path, "file does not exist"));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => {
            // 0 means full table scan
            let infer = if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            };
            LazyCsvReader::new(path)
                .with_infer_schema_length(infer)
                .finish()
                .map_err(|e| AnalysisError::missing_artifact(path, e))?
        }
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| AnalysisError::missing_artifact(path, e))?,
        _ => {
            return Err(AnalysisError::missing_artifact(
                path,
                format!(
                    "unsupported file format '{}'; supported formats: csv, parquet",
                    extension
                ),
            ))
        }
    };

    let df = lf
        .collect()
        .map_err(|e| AnalysisError::missing_artifact(path, e))?;
    log::debug!(
        "Loaded {} ({} rows, {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Drop the named columns when present. Absent columns are ignored.
pub fn drop_columns_if_present<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> DataFrame {
    let mut out = df.clone();
    for name in columns {
        let name = name.as_ref();
        if out.get_column_index(name).is_some() {
            if let Ok(dropped) = out.drop(name) {
                out = dropped;
            }
        }
    }
    out
}

/// Turn a raw patient frame into the analysis frame described by `schema`.
///
/// Excluded identifier columns are dropped if present, the target and every
/// declared feature must exist, continuous features are cast to Float64 and
/// categorical/binary features and the target to Int64. The input frame is
/// not modified.
pub fn prepare_patient_frame(df: &DataFrame, schema: &DatasetSchema) -> AnalysisResult<DataFrame> {
    let mut out = drop_columns_if_present(df, &schema.excluded);

    if out.get_column_index(&schema.target).is_none() {
        return Err(AnalysisError::MissingColumn(schema.target.clone()));
    }
    let target = out.column(&schema.target)?.cast(&DataType::Int64)?;
    out.with_column(target)?;

    for feature in &schema.features {
        if out.get_column_index(&feature.name).is_none() {
            return Err(AnalysisError::MissingColumn(feature.name.clone()));
        }
        let dtype = match feature.kind {
            FeatureKind::Continuous => DataType::Float64,
            FeatureKind::Categorical | FeatureKind::Binary => DataType::Int64,
        };
        let cast = out.column(&feature.name)?.cast(&dtype)?;
        out.with_column(cast)?;
    }

    Ok(out)
}

/// Shape and size of a loaded dataset
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub memory_mb: f64,
}

pub fn dataset_overview(df: &DataFrame) -> DatasetOverview {
    let (rows, columns) = df.shape();
    DatasetOverview {
        rows,
        columns,
        memory_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
    }
}

/// Anything that can produce the raw patient frame.
pub trait PatientDataSource: Send + Sync {
    fn load(&self) -> AnalysisResult<DataFrame>;
}

/// Reads the patient dataset from a CSV or Parquet file
#[derive(Debug, Clone)]
pub struct FilePatientSource {
    pub path: PathBuf,
    pub infer_schema_length: usize,
}

impl FilePatientSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl PatientDataSource for FilePatientSource {
    fn load(&self) -> AnalysisResult<DataFrame> {
        load_dataset(&self.path, self.infer_schema_length)
    }
}

/// Read-through cache over a [`PatientDataSource`].
///
/// The first successful read is kept for the lifetime of the repository and
/// never invalidated. Concurrent first access is serialised by the lock, so
/// the source is read once. Failed reads are not cached.
pub struct PatientRepository<S> {
    source: S,
    schema: DatasetSchema,
    raw: Mutex<Option<DataFrame>>,
}

impl<S: PatientDataSource> PatientRepository<S> {
    pub fn new(source: S, schema: DatasetSchema) -> Self {
        Self {
            source,
            schema,
            raw: Mutex::new(None),
        }
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    /// The raw frame exactly as read from the source.
    pub fn raw(&self) -> AnalysisResult<DataFrame> {
        let mut guard = self.raw.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(df) = guard.as_ref() {
            return Ok(df.clone());
        }
        let df = self.source.load()?;
        *guard = Some(df.clone());
        Ok(df)
    }

    /// The analysis frame: identifiers dropped, features cast per schema.
    pub fn patients(&self) -> AnalysisResult<DataFrame> {
        let raw = self.raw()?;
        prepare_patient_frame(&raw, &self.schema)
    }

    pub fn is_cached(&self) -> bool {
        self.raw
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Load a label vector: the first column of the file, as integers.
pub fn load_labels(path: &Path, infer_schema_length: usize) -> AnalysisResult<Vec<i64>> {
    let df = load_dataset(path, infer_schema_length)?;
    let column = df
        .get_columns()
        .first()
        .ok_or_else(|| AnalysisError::missing_artifact(path, "label file has no columns"))?
        .cast(&DataType::Int64)
        .map_err(|e| AnalysisError::missing_artifact(path, e))?;

    let labels = column
        .i64()
        .map_err(|e| AnalysisError::missing_artifact(path, e))?
        .iter()
        .collect::<Option<Vec<i64>>>()
        .ok_or_else(|| AnalysisError::missing_artifact(path, "label file contains null values"))?;

    Ok(labels)
}
