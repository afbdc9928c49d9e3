//! Assembly of the model's input row from named form values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::RatingError;
use crate::schema::{FeatureField, FEATURE_COUNT};

/// Raw form values keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedFieldValues {
    values: BTreeMap<FeatureField, u32>,
}

impl NamedFieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: FeatureField, value: u32) -> &mut Self {
        self.values.insert(field, value);
        self
    }

    pub fn with(mut self, field: FeatureField, value: u32) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a value by its field name, e.g. `"years_at_company"`.
    pub fn set_named(&mut self, name: &str, value: u32) -> Result<&mut Self, String> {
        let field = name.parse::<FeatureField>()?;
        Ok(self.set(field, value))
    }

    pub fn get(&self, field: FeatureField) -> Option<u32> {
        self.values.get(&field).copied()
    }

    pub fn remove(&mut self, field: FeatureField) -> Option<u32> {
        self.values.remove(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered numeric input for the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureVector(Vec<u32>);

impl FeatureVector {
    /// Wraps raw values without checking their count; see [`crate::validate`].
    pub fn from_values(values: Vec<u32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: FeatureField) -> Option<u32> {
        self.0.get(field.position()).copied()
    }

    /// The row as the float tensor data the model consumes.
    pub fn to_row(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Places each named value at its schema position.
///
/// Values pass through unchanged and no semantic checks are made. A field
/// with no value fails the build.
pub fn build(fields: &NamedFieldValues) -> Result<FeatureVector, RatingError> {
    let mut row = Vec::with_capacity(FEATURE_COUNT);
    for field in FeatureField::ALL {
        let value = fields.get(field).ok_or(RatingError::MissingField(field))?;
        row.push(value);
    }
    Ok(FeatureVector(row))
}

/// Typed form contents, as submitted or read from a JSON profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub department: u32,
    pub salary_hike: u32,
    pub work_life_balance: u32,
    pub environment_satisfaction: u32,
    pub job_role: u32,
    pub years_at_company: u32,
    pub years_in_role: u32,
    pub years_since_promotion: u32,
    pub years_with_manager: u32,
}

impl EmployeeProfile {
    /// Copy with every value clamped into its field's input range.
    pub fn clamped(&self) -> Self {
        let fields = NamedFieldValues::from(self);
        let value = |field: FeatureField| field.clamp(fields.get(field).unwrap_or(0));
        Self {
            department: value(FeatureField::Department),
            salary_hike: value(FeatureField::LastSalaryHikePercent),
            work_life_balance: value(FeatureField::WorkLifeBalance),
            environment_satisfaction: value(FeatureField::EnvironmentSatisfaction),
            job_role: value(FeatureField::JobRole),
            years_at_company: value(FeatureField::YearsAtCompany),
            years_in_role: value(FeatureField::YearsInCurrentRole),
            years_since_promotion: value(FeatureField::YearsSinceLastPromotion),
            years_with_manager: value(FeatureField::YearsWithCurrentManager),
        }
    }
}

impl From<&EmployeeProfile> for NamedFieldValues {
    fn from(profile: &EmployeeProfile) -> Self {
        NamedFieldValues::new()
            .with(FeatureField::Department, profile.department)
            .with(FeatureField::LastSalaryHikePercent, profile.salary_hike)
            .with(FeatureField::WorkLifeBalance, profile.work_life_balance)
            .with(FeatureField::EnvironmentSatisfaction, profile.environment_satisfaction)
            .with(FeatureField::JobRole, profile.job_role)
            .with(FeatureField::YearsAtCompany, profile.years_at_company)
            .with(FeatureField::YearsInCurrentRole, profile.years_in_role)
            .with(FeatureField::YearsSinceLastPromotion, profile.years_since_promotion)
            .with(FeatureField::YearsWithCurrentManager, profile.years_with_manager)
    }
}
