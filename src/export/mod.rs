//! Model export
//!
//! Writes the fitted model to a single versioned, checksummed file and
//! reads it back.

mod artifact;

pub use artifact::{ensure_artifact_dir, load_model, save_model, ArtifactMetadata, ModelArtifact, ARTIFACT_FILE_NAME};
