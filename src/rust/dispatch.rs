//! Build → Validate → Predict → Display for one form submission.

use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::classifier::{ClassifierHandle, RatingError};
use crate::rating::{map_label, RatingReport};
use crate::request::{build, FeatureVector, NamedFieldValues};

/// Checks the vector length against the model's declared input arity.
///
/// Fails iff the lengths differ. The vector is never padded or truncated.
pub fn validate(vector: &FeatureVector, handle: &ClassifierHandle) -> Result<(), RatingError> {
    let expected = handle.expected_arity();
    if vector.len() != expected {
        return Err(RatingError::FeatureMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Runs the classifier on a validated vector and returns the raw class index.
pub fn predict(handle: &ClassifierHandle, vector: &FeatureVector) -> Result<i64, RatingError> {
    handle.classifier().predict_class(&vector.to_row())
}

/// Where a submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchStage {
    Idle,
    Building,
    Validating,
    Predicting,
    Displaying,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Handles form submissions against an injected classifier handle.
///
/// Every error is caught here and turned into a message for the user; none
/// of them end the process.
#[derive(Debug)]
pub struct Dispatcher {
    handle: ClassifierHandle,
    stage: DispatchStage,
    trace: Vec<DispatchStage>,
}

impl Dispatcher {
    pub fn new(handle: ClassifierHandle) -> Self {
        Self {
            handle,
            stage: DispatchStage::Idle,
            trace: Vec::new(),
        }
    }

    pub fn handle(&self) -> &ClassifierHandle {
        &self.handle
    }

    /// Swaps in a freshly loaded model for subsequent submissions.
    pub fn set_handle(&mut self, handle: ClassifierHandle) {
        info!(
            "Dispatcher now using model generation {} from {:?}",
            handle.generation(),
            handle.source()
        );
        self.handle = handle;
    }

    pub fn stage(&self) -> DispatchStage {
        self.stage
    }

    /// Stages visited by the most recent submission, ending with `Idle`.
    pub fn last_trace(&self) -> &[DispatchStage] {
        &self.trace
    }

    fn enter(&mut self, stage: DispatchStage) {
        debug!("dispatch stage: {} -> {}", self.stage, stage);
        self.stage = stage;
        self.trace.push(stage);
    }

    /// Runs one submission to completion.
    pub fn submit(&mut self, fields: &NamedFieldValues) -> Result<RatingReport, RatingError> {
        self.trace.clear();
        let result = self.run(fields);
        if let Err(e) = &result {
            warn!("Submission failed during {}: {}", self.stage, e);
        }
        self.enter(DispatchStage::Idle);
        result
    }

    fn run(&mut self, fields: &NamedFieldValues) -> Result<RatingReport, RatingError> {
        self.enter(DispatchStage::Building);
        let vector = build(fields)?;

        self.enter(DispatchStage::Validating);
        validate(&vector, &self.handle)?;

        self.enter(DispatchStage::Predicting);
        let class_index = predict(&self.handle, &vector)?;
        let rating = map_label(class_index)?;

        self.enter(DispatchStage::Displaying);
        info!("Predicted {} (class {}) for {}", rating, class_index, vector);
        Ok(RatingReport::new(rating))
    }

    /// Like [`submit`](Self::submit), rendering either outcome as text.
    pub fn submit_and_render(&mut self, fields: &NamedFieldValues) -> String {
        match self.submit(fields) {
            Ok(report) => report.to_string(),
            Err(e) => user_message(&e),
        }
    }
}

/// The message shown to the user for a failed submission.
pub fn user_message(err: &RatingError) -> String {
    match err {
        RatingError::ArtifactNotFound { .. } => {
            format!("The rating model could not be loaded, the form is unavailable. {}", err)
        }
        RatingError::UnknownClass(_) => {
            format!("{}. Please report this; the prediction was discarded.", err)
        }
        other => format!("Error: {}", other),
    }
}
