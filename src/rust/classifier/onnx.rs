use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use log::{debug, info};
use ndarray::Array2;
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use super::classifier::Classifier;
use super::error::RatingError;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Name of the class-label output emitted by scikit-learn ONNX exports.
const LABEL_OUTPUT: &str = "label";

/// Runs a tabular classifier exported to ONNX.
///
/// The graph is expected to:
/// - Accept one float input of shape [batch_size, feature_count], where
///   feature_count is a fixed dimension
/// - Emit the predicted class as an int64 tensor of shape [batch_size],
///   either as the output named `label` or as the first output
///
/// Probability outputs, if present, are ignored.
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    label_output: usize,
    arity: usize,
}

impl OnnxClassifier {
    /// Opens and validates an ONNX artifact.
    ///
    /// Any failure (missing file, unparsable graph, unexpected signature)
    /// is reported as [`RatingError::ArtifactNotFound`].
    pub fn from_file(path: &Path, config: &RuntimeConfig) -> Result<Self, RatingError> {
        if !path.is_file() {
            return Err(RatingError::artifact(path, "file does not exist"));
        }

        let session = create_session_builder(config)
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| RatingError::artifact(path, format!("failed to open model: {}", e)))?;

        let classifier = Self::from_session(session)
            .map_err(|reason| RatingError::artifact(path, reason))?;
        info!(
            "Loaded ONNX model {:?} (input '{}', {} features)",
            path, classifier.input_name, classifier.arity
        );
        Ok(classifier)
    }

    fn from_session(session: Session) -> Result<Self, String> {
        let input = match session.inputs.as_slice() {
            [input] => input,
            inputs => {
                return Err(format!(
                    "model must have exactly 1 input (the feature row), found {}",
                    inputs.len()
                ))
            }
        };

        let arity = match &input.input_type {
            ValueType::Tensor { dimensions, .. } => match dimensions.last() {
                Some(&n) if n > 0 => n as usize,
                _ => {
                    return Err(format!(
                        "input '{}' does not declare a fixed feature count (shape {:?})",
                        input.name, dimensions
                    ))
                }
            },
            other => return Err(format!("input '{}' is not a tensor: {:?}", input.name, other)),
        };

        if session.outputs.is_empty() {
            return Err("model must have at least 1 output for the class label".to_string());
        }
        let label_output = session
            .outputs
            .iter()
            .position(|output| output.name == LABEL_OUTPUT)
            .unwrap_or(0);

        Ok(Self {
            input_name: input.name.clone(),
            label_output,
            arity,
            session,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn expected_arity(&self) -> usize {
        self.arity
    }

    fn predict_class(&self, features: &[f32]) -> Result<i64, RatingError> {
        let row = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| RatingError::Inference(format!("Failed to create input array: {}", e)))?;
        let row_dyn = row.into_dyn();
        let row_view = row_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&row_view)
                .map_err(|e| RatingError::Inference(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| RatingError::Inference(format!("Failed to run model: {}", e)))?;
        let labels = outputs[self.label_output]
            .try_extract_tensor::<i64>()
            .map_err(|e| RatingError::Inference(format!("Failed to extract class label: {}", e)))?;

        let class = labels
            .iter()
            .next()
            .copied()
            .ok_or_else(|| RatingError::Inference("Model returned an empty label tensor".to_string()))?;
        debug!("ONNX model predicted class {}", class);
        Ok(class)
    }
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("label_output", &self.label_output)
            .field("arity", &self.arity)
            .finish()
    }
}
