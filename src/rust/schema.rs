//! Feature layout shared by the request builder and the model.
//!
//! The classifier only ever sees raw numbers, so the position of every field
//! in the input row is part of the contract with the training process:
//!
//! 1. Add a field → bump [`SCHEMA_VERSION`]
//! 2. Reorder fields → bump [`SCHEMA_VERSION`]
//! 3. Remove a field → bump [`SCHEMA_VERSION`]
//!
//! [`FeatureField::ALL`] is the single source of truth for the order.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::categories::{CategoryTable, DEPARTMENTS, ENVIRONMENT_SATISFACTION, JOB_ROLES, WORK_LIFE_BALANCE};

/// Current feature layout version.
pub const SCHEMA_VERSION: u8 = 1;

/// Number of features in a request row.
pub const FEATURE_COUNT: usize = FeatureField::ALL.len();

/// A named input of the rating model. The discriminant is the column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    Department = 0,
    LastSalaryHikePercent = 1,
    WorkLifeBalance = 2,
    EnvironmentSatisfaction = 3,
    JobRole = 4,
    YearsAtCompany = 5,
    YearsInCurrentRole = 6,
    YearsSinceLastPromotion = 7,
    YearsWithCurrentManager = 8,
}

impl FeatureField {
    /// All fields in column order.
    pub const ALL: [FeatureField; 9] = [
        FeatureField::Department,
        FeatureField::LastSalaryHikePercent,
        FeatureField::WorkLifeBalance,
        FeatureField::EnvironmentSatisfaction,
        FeatureField::JobRole,
        FeatureField::YearsAtCompany,
        FeatureField::YearsInCurrentRole,
        FeatureField::YearsSinceLastPromotion,
        FeatureField::YearsWithCurrentManager,
    ];

    /// Column index of this field in the feature vector.
    pub const fn position(self) -> usize {
        self as usize
    }

    /// Stable machine name, used as the key in [`crate::NamedFieldValues`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::LastSalaryHikePercent => "salary_hike",
            Self::WorkLifeBalance => "work_life_balance",
            Self::EnvironmentSatisfaction => "environment_satisfaction",
            Self::JobRole => "job_role",
            Self::YearsAtCompany => "years_at_company",
            Self::YearsInCurrentRole => "years_in_role",
            Self::YearsSinceLastPromotion => "years_since_promotion",
            Self::YearsWithCurrentManager => "years_with_manager",
        }
    }

    /// Label shown next to the input widget.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Department => "Employee Department",
            Self::LastSalaryHikePercent => "Last Salary Hike (%)",
            Self::WorkLifeBalance => "Work-Life Balance",
            Self::EnvironmentSatisfaction => "Environment Satisfaction",
            Self::JobRole => "Employee Job Role",
            Self::YearsAtCompany => "Years at Company",
            Self::YearsInCurrentRole => "Years in Current Role",
            Self::YearsSinceLastPromotion => "Years Since Last Promotion",
            Self::YearsWithCurrentManager => "Years with Current Manager",
        }
    }

    /// Category table backing a categorical field, `None` for numeric ones.
    pub fn categories(self) -> Option<&'static CategoryTable> {
        match self {
            Self::Department => Some(&DEPARTMENTS),
            Self::WorkLifeBalance => Some(&WORK_LIFE_BALANCE),
            Self::EnvironmentSatisfaction => Some(&ENVIRONMENT_SATISFACTION),
            Self::JobRole => Some(&JOB_ROLES),
            _ => None,
        }
    }

    /// Inclusive range the input layer constrains this field to.
    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            Self::LastSalaryHikePercent => 0..=100,
            Self::YearsAtCompany
            | Self::YearsInCurrentRole
            | Self::YearsSinceLastPromotion
            | Self::YearsWithCurrentManager => 0..=40,
            categorical => {
                let max = categorical.categories().map(CategoryTable::max_code).unwrap_or(0);
                0..=max
            }
        }
    }

    /// Clamps a raw widget value into [`Self::range`].
    pub fn clamp(self, value: u32) -> u32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown feature field '{}'", s))
    }
}
