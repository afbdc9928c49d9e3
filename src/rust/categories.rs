//! Display label ↔ code tables for the categorical inputs.
//!
//! The codes are the encoding the model was trained with. The same table
//! drives both the form (code → label) and request encoding (label → code),
//! so the two directions cannot drift apart.

use serde::Serialize;

/// Version of the category encoding. Bump together with the model whenever a
/// code is added, removed or renumbered.
pub const CATEGORY_VERSION: u8 = 1;

/// One categorical input's lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTable {
    pub name: &'static str,
    pub version: u8,
    pub entries: &'static [(u32, &'static str)],
}

pub static DEPARTMENTS: CategoryTable = CategoryTable {
    name: "department",
    version: CATEGORY_VERSION,
    entries: &[
        (0, "Sales"),
        (1, "Human Resources"),
        (2, "Development"),
        (3, "Data Science"),
        (4, "Research and Development"),
        (5, "Finance"),
    ],
};

const SATISFACTION_LEVELS: &[(u32, &str)] = &[(0, "Poor"), (1, "Average"), (2, "Excellent")];

pub static WORK_LIFE_BALANCE: CategoryTable = CategoryTable {
    name: "work_life_balance",
    version: CATEGORY_VERSION,
    entries: SATISFACTION_LEVELS,
};

pub static ENVIRONMENT_SATISFACTION: CategoryTable = CategoryTable {
    name: "environment_satisfaction",
    version: CATEGORY_VERSION,
    entries: SATISFACTION_LEVELS,
};

pub static JOB_ROLES: CategoryTable = CategoryTable {
    name: "job_role",
    version: CATEGORY_VERSION,
    entries: &[
        (0, "Sales Executive"),
        (1, "Manager"),
        (2, "Developer"),
        (3, "Sales Representative"),
        (4, "Human Resources"),
        (5, "Senior Developer"),
        (6, "Data Scientist"),
        (7, "Senior Manager R&D"),
        (8, "Laboratory Technician"),
        (9, "Manufacturing Director"),
        (10, "Research Scientist"),
        (11, "Healthcare Representative"),
        (12, "Research Director"),
        (13, "Manager R&D"),
        (14, "Finance Manager"),
        (15, "Technical Architect"),
        (16, "Business Analyst"),
        (17, "Technical Lead"),
        (18, "Delivery Manager"),
    ],
};

/// Every categorical table, in form order.
pub fn all_tables() -> [&'static CategoryTable; 4] {
    [&DEPARTMENTS, &WORK_LIFE_BALANCE, &ENVIRONMENT_SATISFACTION, &JOB_ROLES]
}

impl CategoryTable {
    /// Display label for a code.
    pub fn label_of(&self, code: u32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Code for a display label, compared case-insensitively.
    pub fn code_of(&self, label: &str) -> Option<u32> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|(_, l)| l.eq_ignore_ascii_case(label))
            .map(|(code, _)| *code)
    }

    /// Accepts either a display label or a numeric code present in the table.
    pub fn resolve(&self, input: &str) -> Result<u32, String> {
        let input = input.trim();
        if let Ok(code) = input.parse::<u32>() {
            return self
                .label_of(code)
                .map(|_| code)
                .ok_or_else(|| format!("{} code {} is not in 0..={}", self.name, code, self.max_code()));
        }
        self.code_of(input).ok_or_else(|| {
            let labels: Vec<&str> = self.entries.iter().map(|(_, l)| *l).collect();
            format!("unknown {} '{}', expected one of: {}", self.name, input, labels.join(", "))
        })
    }

    pub fn max_code(&self) -> u32 {
        self.entries.iter().map(|(code, _)| *code).max().unwrap_or(0)
    }
}
