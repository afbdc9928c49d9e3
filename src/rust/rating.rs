use std::fmt;

use serde::Serialize;

use crate::classifier::RatingError;

/// Performance category predicted by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PerformanceRating {
    Poor,
    Average,
    Excellent,
}

impl PerformanceRating {
    pub const ALL: [PerformanceRating; 3] = [Self::Poor, Self::Average, Self::Excellent];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Average => "Average",
            Self::Excellent => "Excellent",
        }
    }

    pub const fn class_index(self) -> i64 {
        match self {
            Self::Poor => 0,
            Self::Average => 1,
            Self::Excellent => 2,
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a class index to its rating. The model's output space is fixed at
/// training time, so anything outside 0..=2 is an error, never a default.
pub fn map_label(class_index: i64) -> Result<PerformanceRating, RatingError> {
    match class_index {
        0 => Ok(PerformanceRating::Poor),
        1 => Ok(PerformanceRating::Average),
        2 => Ok(PerformanceRating::Excellent),
        other => Err(RatingError::UnknownClass(other)),
    }
}

/// One line of the static advice shown after every successful prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub title: &'static str,
    pub detail: &'static str,
}

pub static INSIGHTS: [Advice; 4] = [
    Advice {
        title: "Enhance Employee Satisfaction",
        detail: "Address work-life balance and environment satisfaction.",
    },
    Advice {
        title: "Fair Compensation",
        detail: "Competitive salary hikes encourage retention.",
    },
    Advice {
        title: "Career Development",
        detail: "Provide career growth opportunities and regular promotions.",
    },
    Advice {
        title: "Managerial Support",
        detail: "Encourage stronger manager-employee relationships.",
    },
];

/// Closing line shown under the form regardless of outcome.
pub const FOOTER: &str = "Actionable Recommendations: Focus on employee work environment, \
fair salary hikes, and career growth to enhance performance.";

/// A successful prediction, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingReport {
    pub rating: PerformanceRating,
    pub class_index: i64,
    pub insights: &'static [Advice],
}

impl RatingReport {
    pub fn new(rating: PerformanceRating) -> Self {
        Self {
            rating,
            class_index: rating.class_index(),
            insights: &INSIGHTS,
        }
    }
}

impl fmt::Display for RatingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predicted Performance Rating: {}", self.rating)?;
        writeln!(f)?;
        writeln!(f, "Insights & Recommendations")?;
        for advice in self.insights {
            writeln!(f, "  - {}: {}", advice.title, advice.detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_label_is_total_over_known_classes() {
        assert_eq!(map_label(0).unwrap(), PerformanceRating::Poor);
        assert_eq!(map_label(1).unwrap(), PerformanceRating::Average);
        assert_eq!(map_label(2).unwrap(), PerformanceRating::Excellent);
        for rating in PerformanceRating::ALL {
            assert_eq!(map_label(rating.class_index()).unwrap(), rating);
        }
    }

    #[test]
    fn test_map_label_rejects_everything_else() {
        for class in [-1, 3, 5, 42, i64::MIN, i64::MAX] {
            assert!(matches!(map_label(class), Err(RatingError::UnknownClass(c)) if c == class));
        }
    }

    #[test]
    fn test_report_rendering() {
        let text = RatingReport::new(PerformanceRating::Excellent).to_string();
        assert!(text.starts_with("Predicted Performance Rating: Excellent"));
        assert!(text.contains("Fair Compensation"));
        assert_eq!(text.matches("  - ").count(), 4);
    }

    #[test]
    fn test_report_json() {
        let json = serde_json::to_value(RatingReport::new(PerformanceRating::Poor)).unwrap();
        assert_eq!(json["rating"], "Poor");
        assert_eq!(json["class_index"], 0);
        assert_eq!(json["insights"].as_array().unwrap().len(), 4);
    }
}
