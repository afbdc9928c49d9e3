use std::path::PathBuf;

use serde::Serialize;

mod error;
mod classifier;
mod onnx;
pub mod loader;

pub use error::RatingError;
pub use classifier::{Classifier, ClassifierHandle};
pub use onnx::OnnxClassifier;
pub use loader::ModelLoader;

/// Information about the currently loaded classifier
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    /// Where the model was read from
    pub source: PathBuf,
    /// Number of input features the model declares
    pub expected_arity: usize,
    /// Load counter of the owning loader, 0 for handles built in memory
    pub generation: u64,
    /// Feature layout version this build encodes requests with
    pub schema_version: u8,
}
