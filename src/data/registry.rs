//! Dataset registry
//!
//! Resolves a dataset name to tabular data. The local registry looks for
//! `<root>/<name>.csv` and then `<root>/<name>.json`.

use crate::data::dataset::{Dataset, Value};
use crate::error::{HyperdriveError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Anything that can turn a dataset name into a [`Dataset`]
pub trait DatasetSource {
    fn load(&self, name: &str) -> Result<Dataset>;
}

/// File-system backed registry rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    const EXTENSIONS: [&'static str; 2] = ["csv", "json"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// First existing file for `name`, in extension priority order
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        Self::EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file())
    }
}

impl DatasetSource for LocalRegistry {
    fn load(&self, name: &str) -> Result<Dataset> {
        let path = self.resolve(name).ok_or_else(|| {
            HyperdriveError::DatasetError(format!(
                "dataset '{}' not found under '{}'",
                name,
                self.root.display()
            ))
        })?;

        let start = Instant::now();
        let df = read_frame(&path)?;
        let dataset = dataframe_to_dataset(&df)?;
        info!(
            dataset = name,
            path = %path.display(),
            rows = dataset.n_rows(),
            columns = dataset.n_columns(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded"
        );
        Ok(dataset)
    }
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let df = match ext {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        "json" => {
            let file = std::fs::File::open(path).map_err(|e| {
                HyperdriveError::DatasetError(format!("cannot open '{}': {}", path.display(), e))
            })?;
            JsonReader::new(file).finish()?
        }
        _ => {
            return Err(HyperdriveError::DatasetError(format!(
                "unsupported file format: {}",
                ext
            )))
        }
    };
    Ok(df)
}

/// Convert a polars frame into scalar records.
///
/// Strings and booleans become text, every other dtype is cast to `f64`,
/// nulls become [`Value::Missing`].
pub fn dataframe_to_dataset(df: &DataFrame) -> Result<Dataset> {
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let name = column.name().to_string();
        let series = column.as_materialized_series();
        let values: Vec<Value> = match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .map(|v| Value::from(v.map(str::to_string)))
                .collect(),
            DataType::Boolean => series
                .bool()?
                .into_iter()
                .map(|v| Value::from(v.map(|b| b.to_string())))
                .collect(),
            _ => {
                let cast = series.cast(&DataType::Float64)?;
                cast.f64()?.into_iter().map(Value::from).collect()
            }
        };
        debug!(column = %name, dtype = %series.dtype(), "Converted column");
        columns.push((name, values));
    }

    Dataset::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("hyperdrive_registry_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_dataframe_conversion() {
        let df = df!(
            "Age" => &[41i64, 49, 37],
            "BusinessTravel" => &["Travel_Rarely", "Travel_Frequently", "Travel_Rarely"],
            "OverTime" => &[true, false, true],
            "Attrition" => &["Yes", "No", "Yes"]
        )
        .unwrap();

        let ds = dataframe_to_dataset(&df).unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.columns(), &["Age", "BusinessTravel", "OverTime", "Attrition"]);
        assert_eq!(ds.value(0, "Age"), Some(&Value::Number(41.0)));
        assert_eq!(ds.value(1, "BusinessTravel"), Some(&Value::from("Travel_Frequently")));
        assert_eq!(ds.value(2, "OverTime"), Some(&Value::from("true")));
    }

    #[test]
    fn test_nulls_become_missing() {
        let df = df!(
            "score" => &[Some(1.5), None, Some(2.0)]
        )
        .unwrap();
        let ds = dataframe_to_dataset(&df).unwrap();
        assert_eq!(ds.value(1, "score"), Some(&Value::Missing));
    }

    #[test]
    fn test_load_csv_by_name() {
        let root = temp_root();
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("attrition_train.csv"),
            "Age,Department,Attrition\n41,Sales,Yes\n49,Research,No\n",
        )
        .unwrap();

        let registry = LocalRegistry::new(&root);
        let ds = registry.load("attrition_train").unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.value(0, "Department"), Some(&Value::from("Sales")));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_unknown_dataset() {
        let registry = LocalRegistry::new(temp_root());
        let err = registry.load("does_not_exist").unwrap_err();
        assert!(matches!(err, HyperdriveError::DatasetError(_)));
    }
}
