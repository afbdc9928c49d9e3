//! Employee performance rating backed by a pre-trained ONNX classifier.
//!
//! Nine form fields are assembled into a fixed-order feature vector, checked
//! against the model's input arity, classified, and mapped to a
//! [`PerformanceRating`] with static advice.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use perfrating::{Dispatcher, EmployeeProfile, ModelLoader, NamedFieldValues};
//!
//! let loader = ModelLoader::new("models/rf/model.onnx");
//! let mut dispatcher = Dispatcher::new(loader.load()?);
//!
//! let profile = EmployeeProfile {
//!     department: 2,
//!     salary_hike: 15,
//!     work_life_balance: 2,
//!     environment_satisfaction: 2,
//!     job_role: 6,
//!     years_at_company: 5,
//!     years_in_role: 3,
//!     years_since_promotion: 1,
//!     years_with_manager: 2,
//! };
//! let report = dispatcher.submit(&NamedFieldValues::from(&profile))?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`ClassifierHandle`] is `Send + Sync` and cheap to clone. A
//! [`ModelLoader`] can be shared behind an `Arc`; reloading never disturbs a
//! handle that is already in use.

pub mod categories;
pub mod classifier;
pub mod dispatch;
pub mod model_manager;
pub mod rating;
pub mod request;
mod runtime;
pub mod schema;

pub use categories::{CategoryTable, CATEGORY_VERSION};
pub use classifier::{Classifier, ClassifierHandle, ClassifierInfo, ModelLoader, OnnxClassifier, RatingError};
pub use dispatch::{predict, user_message, validate, DispatchStage, Dispatcher};
pub use model_manager::{ModelError, ModelManager};
pub use rating::{map_label, PerformanceRating, RatingReport, FOOTER};
pub use request::{build, EmployeeProfile, FeatureVector, NamedFieldValues};
pub use runtime::{create_session_builder, Optimization, RuntimeConfig};
pub use schema::{FeatureField, FEATURE_COUNT, SCHEMA_VERSION};

pub fn init_logger() {
    env_logger::init();
}
