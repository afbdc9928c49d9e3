use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::RatingError;
use crate::schema::SCHEMA_VERSION;

/// A trained model that maps one feature row to a class index.
///
/// Implementations are read-only once constructed. The ONNX backend is
/// [`super::OnnxClassifier`]; tests plug in their own.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Number of input features the model was trained on.
    fn expected_arity(&self) -> usize;

    /// Runs the model on a single row. Faults surface as [`RatingError::Inference`].
    fn predict_class(&self, features: &[f32]) -> Result<i64, RatingError>;
}

/// Shared, immutable reference to a loaded classifier.
///
/// Cloning is cheap. A clone taken before a reload keeps the old model alive
/// until it is dropped, so an in-flight prediction never sees a half-swapped
/// model.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use perfrating::{Classifier, ClassifierHandle, RatingError};
///
/// #[derive(Debug)]
/// struct AlwaysAverage;
///
/// impl Classifier for AlwaysAverage {
///     fn expected_arity(&self) -> usize { 9 }
///     fn predict_class(&self, _: &[f32]) -> Result<i64, RatingError> { Ok(1) }
/// }
///
/// let handle = ClassifierHandle::from_classifier(AlwaysAverage);
/// assert_eq!(handle.expected_arity(), 9);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClassifierHandle {
    model: Arc<dyn Classifier>,
    source: PathBuf,
    generation: u64,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ClassifierHandle>();
    }
};

impl ClassifierHandle {
    pub fn new(model: Arc<dyn Classifier>, source: impl Into<PathBuf>, generation: u64) -> Self {
        Self {
            model,
            source: source.into(),
            generation,
        }
    }

    /// Wraps an in-memory classifier that did not come from a loader.
    pub fn from_classifier(model: impl Classifier + 'static) -> Self {
        Self::new(Arc::new(model), "<memory>", 0)
    }

    pub fn expected_arity(&self) -> usize {
        self.model.expected_arity()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn classifier(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// Returns information about the loaded model
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            source: self.source.clone(),
            expected_arity: self.expected_arity(),
            generation: self.generation,
            schema_version: SCHEMA_VERSION,
        }
    }

    /// True when both handles point at the same loaded model.
    pub fn same_model(&self, other: &ClassifierHandle) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("source", &self.source)
            .field("generation", &self.generation)
            .field("expected_arity", &self.expected_arity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(usize);

    impl Classifier for Fixed {
        fn expected_arity(&self) -> usize {
            self.0
        }

        fn predict_class(&self, _features: &[f32]) -> Result<i64, RatingError> {
            Ok(0)
        }
    }

    #[test]
    fn test_handle_info() {
        let handle = ClassifierHandle::new(Arc::new(Fixed(9)), "/models/rf/model.onnx", 3);
        let info = handle.info();
        assert_eq!(info.expected_arity, 9);
        assert_eq!(info.generation, 3);
        assert_eq!(info.schema_version, SCHEMA_VERSION);
        assert_eq!(handle.source(), Path::new("/models/rf/model.onnx"));
    }

    #[test]
    fn test_clones_share_the_model() {
        let handle = ClassifierHandle::from_classifier(Fixed(9));
        let clone = handle.clone();
        assert!(handle.same_model(&clone));
        assert!(!handle.same_model(&ClassifierHandle::from_classifier(Fixed(9))));
    }
}
