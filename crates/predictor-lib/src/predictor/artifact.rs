//! Model artifact loading
//!
//! Reads a model file from disk, validates its size and (optionally) its
//! SHA256 checksum, and builds the matching `DelayModel` variant based on
//! the file extension.

use super::{DelayModel, LogisticDelayModel, OnnxDelayModel};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Maximum accepted artifact size (64MB)
pub const MAX_ARTIFACT_BYTES: usize = 64 * 1024 * 1024;

/// Supported artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Onnx,
    LogisticJson,
}

impl ArtifactFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFormat::Onnx => "onnx",
            ArtifactFormat::LogisticJson => "logistic-json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("onnx") => Ok(ArtifactFormat::Onnx),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ArtifactFormat::LogisticJson),
            _ => Err(anyhow::anyhow!(
                "Unsupported model artifact {:?}: expected .onnx or .json",
                path
            )),
        }
    }
}

/// Metadata about a loaded artifact
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub checksum: String,
    pub size_bytes: usize,
}

/// A model built from an artifact, plus where it came from
pub struct LoadedArtifact {
    pub model: Box<dyn DelayModel>,
    pub info: ArtifactInfo,
}

/// Load a model artifact from disk.
///
/// ONNX models take their version from the file stem; JSON models carry
/// their own version field.
pub fn load_model_artifact(path: &Path, expected_checksum: Option<&str>) -> Result<LoadedArtifact> {
    let format = ArtifactFormat::from_path(path)?;

    if !path.exists() {
        return Err(anyhow::anyhow!("Model file not found: {:?}", path));
    }

    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat model file {:?}", path))?
        .len();
    if size > MAX_ARTIFACT_BYTES as u64 {
        return Err(anyhow::anyhow!(
            "Model size {} exceeds maximum {}",
            size,
            MAX_ARTIFACT_BYTES
        ));
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read model file {:?}", path))?;

    let checksum = compute_checksum(&bytes);
    if let Some(expected) = expected_checksum {
        if !checksum.eq_ignore_ascii_case(expected.trim()) {
            return Err(anyhow::anyhow!(
                "Checksum mismatch: expected {}, got {}",
                expected,
                checksum
            ));
        }
        info!(checksum = %checksum, "Model checksum validated");
    }

    let model: Box<dyn DelayModel> = match format {
        ArtifactFormat::Onnx => {
            let version = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("onnx")
                .to_string();
            Box::new(OnnxDelayModel::from_bytes(&bytes, version)?)
        }
        ArtifactFormat::LogisticJson => Box::new(LogisticDelayModel::from_json_bytes(&bytes)?),
    };

    info!(
        path = %path.display(),
        version = %model.version(),
        size = bytes.len(),
        "Model artifact loaded"
    );

    Ok(LoadedArtifact {
        model,
        info: ArtifactInfo {
            path: path.to_path_buf(),
            format,
            checksum,
            size_bytes: bytes.len(),
        },
    })
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
