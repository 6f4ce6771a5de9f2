//! Storage Backend for Run Tracking
//!
//! Persists runs as one pretty-printed JSON document per run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::tracker::Run;
use crate::error::{HyperdriveError, Result};

/// Storage backend trait
pub trait StorageBackend {
    /// Save a run, returning where it was written
    fn save_run(&self, run: &Run) -> Result<PathBuf>;

    /// Load a run by id
    fn load_run(&self, run_id: &str) -> Result<Run>;

    /// Ids of every stored run, sorted
    fn list_runs(&self) -> Result<Vec<String>>;

    /// Delete a run; missing runs are not an error
    fn delete_run(&self, run_id: &str) -> Result<()>;
}

/// Local file system storage backend
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn run_file(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", run_id))
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> HyperdriveError {
    HyperdriveError::TrackingError(format!("Failed to {} '{}': {}", action, path.display(), err))
}

impl StorageBackend for LocalStorage {
    fn save_run(&self, run: &Run) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).map_err(|e| io_error("create directory", &self.base_dir, e))?;

        let path = self.run_file(&run.run_id);
        let json = serde_json::to_string_pretty(run)?;
        fs::write(&path, json).map_err(|e| io_error("write", &path, e))?;

        debug!(run_id = %run.run_id, path = %path.display(), "Run saved");
        Ok(path)
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        let path = self.run_file(run_id);
        let contents = fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn list_runs(&self) -> Result<Vec<String>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = fs::read_dir(&self.base_dir)
            .map_err(|e| io_error("list", &self.base_dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn delete_run(&self, run_id: &str) -> Result<()> {
        let path = self.run_file(run_id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| io_error("delete", &path, e))?;
        }
        Ok(())
    }
}
