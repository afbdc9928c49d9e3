use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;

use super::classifier::{Classifier, ClassifierHandle};
use super::error::RatingError;
use super::onnx::OnnxClassifier;
use crate::model_manager::ensure_hash;
use crate::runtime::RuntimeConfig;

/// Turns an artifact path into a ready classifier.
pub type Opener = dyn Fn(&Path) -> Result<Arc<dyn Classifier>, RatingError> + Send + Sync;

/// Loads the rating model once and hands out shared handles to it.
///
/// The first [`load`](Self::load) reads the artifact; later calls return the
/// memoized handle until [`invalidate`](Self::invalidate) drops it. Loads and
/// invalidations take the write side of the lock, so a reload is serialized
/// against other loads while handles already handed out stay valid.
pub struct ModelLoader {
    path: PathBuf,
    expected_sha256: Option<String>,
    opener: Arc<Opener>,
    cached: RwLock<Option<ClassifierHandle>>,
    loads: AtomicU64,
}

impl ModelLoader {
    /// Loader for an ONNX artifact with the default runtime settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_runtime_config(path, RuntimeConfig::default())
    }

    pub fn with_runtime_config(path: impl Into<PathBuf>, config: RuntimeConfig) -> Self {
        Self::with_opener(path, move |path: &Path| {
            let classifier = OnnxClassifier::from_file(path, &config)?;
            Ok(Arc::new(classifier) as Arc<dyn Classifier>)
        })
    }

    /// Loader with a custom way of opening the artifact.
    pub fn with_opener<F>(path: impl Into<PathBuf>, opener: F) -> Self
    where
        F: Fn(&Path) -> Result<Arc<dyn Classifier>, RatingError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            expected_sha256: None,
            opener: Arc::new(opener),
            cached: RwLock::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// Refuse artifacts whose SHA-256 differs from `hash`.
    pub fn expect_sha256(mut self, hash: impl Into<String>) -> Self {
        self.expected_sha256 = Some(hash.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.read().is_some()
    }

    /// Number of times the artifact has been read from storage.
    pub fn generation(&self) -> u64 {
        self.loads.load(Ordering::Acquire)
    }

    /// Returns the memoized handle, reading the artifact on first use.
    pub fn load(&self) -> Result<ClassifierHandle, RatingError> {
        if let Some(handle) = self.cached.read().as_ref() {
            return Ok(handle.clone());
        }

        let mut slot = self.cached.write();
        // Another caller may have finished loading while we waited
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let handle = self.read_artifact().map_err(|e| {
            warn!("Model load failed: {}", e);
            e
        })?;
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Drops the memoized handle so the next load re-reads storage.
    pub fn invalidate(&self) {
        if self.cached.write().take().is_some() {
            info!("Invalidated cached model from {:?}", self.path);
        }
    }

    /// Invalidates and loads again.
    pub fn reload(&self) -> Result<ClassifierHandle, RatingError> {
        self.invalidate();
        self.load()
    }

    fn read_artifact(&self) -> Result<ClassifierHandle, RatingError> {
        if !self.path.is_file() {
            return Err(RatingError::artifact(&self.path, "file does not exist"));
        }
        if let Some(expected) = &self.expected_sha256 {
            ensure_hash(&self.path, expected).map_err(|e| RatingError::artifact(&self.path, e))?;
        }

        let model = (self.opener)(&self.path)?;
        let generation = self.loads.fetch_add(1, Ordering::AcqRel) + 1;
        info!(
            "Model loaded from {:?} (generation {}, {} features)",
            self.path,
            generation,
            model.expected_arity()
        );
        Ok(ClassifierHandle::new(model, self.path.clone(), generation))
    }
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("path", &self.path)
            .field("expected_sha256", &self.expected_sha256)
            .field("loaded", &self.is_loaded())
            .field("generation", &self.generation())
            .finish()
    }
}
