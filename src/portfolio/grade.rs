//! Letter grades for portfolio risk scores

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

/// Ascending score cutoffs mapped to letter grades
///
/// A score takes the grade of the first cutoff it does not exceed; scores
/// above every cutoff take `above`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeScale {
    pub cutoffs: Vec<(f64, String)>,
    pub above: String,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            cutoffs: vec![
                (20.0, "A+".to_string()),
                (40.0, "A-".to_string()),
                (60.0, "B".to_string()),
                (80.0, "C".to_string()),
            ],
            above: "D".to_string(),
        }
    }
}

impl GradeScale {
    pub fn grade(&self, score: f64) -> &str {
        self.cutoffs
            .iter()
            .find(|(upper, _)| score <= *upper)
            .map(|(_, grade)| grade.as_str())
            .unwrap_or(self.above.as_str())
    }

    /// Reject cutoffs that are not finite and strictly ascending
    pub fn validate(&self) -> ValuationResult<()> {
        if let Some((upper, _)) = self.cutoffs.iter().find(|(upper, _)| !upper.is_finite()) {
            return Err(ValuationError::out_of_range("grade cutoff", *upper, "must be finite"));
        }
        if let Some(pair) = self.cutoffs.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(ValuationError::out_of_range(
                "grade cutoff",
                pair[1].0,
                "cutoffs must be strictly ascending",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grades() {
        let scale = GradeScale::default();
        assert!(scale.validate().is_ok());
        assert_eq!(scale.grade(0.0), "A+");
        assert_eq!(scale.grade(20.0), "A+");
        assert_eq!(scale.grade(20.5), "A-");
        assert_eq!(scale.grade(40.0), "A-");
        assert_eq!(scale.grade(59.9), "B");
        assert_eq!(scale.grade(80.0), "C");
        assert_eq!(scale.grade(80.01), "D");
        assert_eq!(scale.grade(500.0), "D");
    }

    #[test]
    fn test_custom_scale_from_json() {
        let scale: GradeScale =
            serde_json::from_str(r#"{"cutoffs":[[10.0,"AAA"],[50.0,"BBB"]],"above":"CCC"}"#).unwrap();
        assert_eq!(scale.grade(5.0), "AAA");
        assert_eq!(scale.grade(30.0), "BBB");
        assert_eq!(scale.grade(51.0), "CCC");
    }

    #[test]
    fn test_unsorted_scale_detected() {
        let scale = GradeScale {
            cutoffs: vec![(50.0, "B".into()), (10.0, "A".into())],
            above: "C".into(),
        };
        assert!(matches!(
            scale.validate(),
            Err(ValuationError::OutOfRangeInput { value, .. }) if value == 10.0
        ));
    }

    #[test]
    fn test_repeated_cutoff_is_invalid() {
        let scale = GradeScale {
            cutoffs: vec![(20.0, "A".into()), (20.0, "B".into())],
            above: "C".into(),
        };
        assert!(scale.validate().is_err());
    }
}
