//! Model artifact serialization
//!
//! The artifact is a bincode envelope around the bincode-encoded model.
//! Nothing time-dependent is stored, so identical models produce
//! byte-identical files.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{HyperdriveError, Result};
use crate::training::TrainedModel;

/// Relative file name of the model inside the artifact directory
pub const ARTIFACT_FILE_NAME: &str = "hyperdrive_model.bin";

/// Descriptive header stored next to the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub model_type: String,
    pub n_features: usize,
    pub n_trees: usize,
    pub crate_version: String,
}

impl ArtifactMetadata {
    fn describe(model: &TrainedModel) -> Self {
        Self {
            model_type: "xgboost_classifier".to_string(),
            n_features: model.n_features(),
            n_trees: model.n_trees(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Envelope written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Magic bytes for format detection
    pub magic: [u8; 4],
    pub format_version: u32,
    pub metadata: ArtifactMetadata,
    /// bincode-encoded [`TrainedModel`]
    pub model_data: Vec<u8>,
    /// FNV-1a hash of `model_data`
    pub checksum: u64,
}

impl ModelArtifact {
    const MAGIC: [u8; 4] = [b'H', b'Y', b'P', b'M'];
    const VERSION: u32 = 1;

    pub fn new(model: &TrainedModel) -> Result<Self> {
        let model_data = bincode::serialize(model)?;
        let checksum = Self::compute_checksum(&model_data);
        Ok(Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata: ArtifactMetadata::describe(model),
            model_data,
            checksum,
        })
    }

    /// FNV-1a
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.model_data) == self.checksum
    }

    /// Check the header and decode the model
    pub fn into_model(self) -> Result<TrainedModel> {
        if self.magic != Self::MAGIC {
            return Err(HyperdriveError::PersistenceError(
                "not a model artifact (bad magic bytes)".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(HyperdriveError::PersistenceError(format!(
                "unsupported artifact version {} (expected {})",
                self.format_version,
                Self::VERSION
            )));
        }
        if !self.verify_checksum() {
            return Err(HyperdriveError::PersistenceError(
                "artifact checksum mismatch".to_string(),
            ));
        }
        Ok(bincode::deserialize(&self.model_data)?)
    }
}

/// Create the artifact directory and its parents if needed
pub fn ensure_artifact_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        HyperdriveError::PersistenceError(format!("cannot create artifact directory '{}': {}", dir.display(), e))
    })
}

/// Serialize `model` to `path`, returning the number of bytes written.
///
/// The parent directory must already exist.
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<u64> {
    let bytes = bincode::serialize(&ModelArtifact::new(model)?)?;

    let persist_err =
        |e: std::io::Error| HyperdriveError::PersistenceError(format!("cannot write '{}': {}", path.display(), e));
    let file = File::create(path).map_err(persist_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(persist_err)?;
    writer.flush().map_err(persist_err)?;

    info!(path = %path.display(), bytes = bytes.len(), "Model artifact written");
    Ok(bytes.len() as u64)
}

/// Read and verify an artifact written by [`save_model`]
pub fn load_model(path: &Path) -> Result<TrainedModel> {
    let bytes = fs::read(path).map_err(|e| {
        HyperdriveError::PersistenceError(format!("cannot read '{}': {}", path.display(), e))
    })?;
    let artifact: ModelArtifact = bincode::deserialize(&bytes)?;
    debug!(metadata = ?artifact.metadata, "Artifact header read");
    artifact.into_model()
}
