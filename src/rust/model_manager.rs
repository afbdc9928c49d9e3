use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// File name of the rating model inside its model directory.
pub const MODEL_FILE: &str = "model.onnx";

/// Default model name, matching the random-forest artifact shipped with the tool.
pub const DEFAULT_MODEL: &str = "rf";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch for {}: expected {expected}, got {actual}", .path.display())]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Locates model artifacts on disk and checks their integrity.
///
/// Artifacts live at `<models_dir>/<name>/model.onnx`. Nothing here parses the
/// model; that is left to the loader.
#[derive(Debug, Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("PERFRATING_HOME") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("perfrating").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("perfrating").join("models");
        }

        env::temp_dir().join("perfrating").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self { models_dir })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(name).join(MODEL_FILE)
    }

    pub fn is_model_present(&self, name: &str) -> bool {
        let model_path = self.get_model_path(name);
        log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        model_path.is_file()
    }

    /// Checks the named model against a pinned SHA-256 digest.
    pub fn verify_model(&self, name: &str, expected_hash: &str) -> Result<bool, ModelError> {
        let model_path = self.get_model_path(name);
        if !model_path.is_file() {
            return Err(ModelError::NotFound(model_path.display().to_string()));
        }
        verify_file(&model_path, expected_hash)
    }

    /// Copies an artifact produced elsewhere into the models directory.
    pub fn install_model(&self, name: &str, source: &Path) -> Result<PathBuf, ModelError> {
        if !source.is_file() {
            return Err(ModelError::NotFound(source.display().to_string()));
        }
        let target = self.get_model_path(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = fs::copy(source, &target)?;
        log::info!("Installed model '{}' ({} bytes) at {:?}", name, bytes, target);
        Ok(target)
    }

    pub fn remove_model(&self, name: &str) -> Result<(), ModelError> {
        let model_path = self.get_model_path(name);
        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String, ModelError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn verify_file(path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
    let hash = file_sha256(path)?;
    log::debug!("Calculated hash for {:?}: {}", path, hash);
    Ok(hash.eq_ignore_ascii_case(expected_hash.trim()))
}

/// Like [`verify_file`], but reports the mismatch as an error.
pub fn ensure_hash(path: &Path, expected_hash: &str) -> Result<(), ModelError> {
    let actual = file_sha256(path)?;
    if actual.eq_ignore_ascii_case(expected_hash.trim()) {
        Ok(())
    } else {
        log::error!("Hash mismatch for {:?}: expected {}, got {}", path, expected_hash, actual);
        Err(ModelError::HashMismatch {
            path: path.to_path_buf(),
            expected: expected_hash.to_string(),
            actual,
        })
    }
}
