//! Non-fatal precondition checks
//!
//! Caller-supplied weights are used as given. When they break an expected
//! invariant the engine reports a warning alongside the result instead of
//! silently correcting the input.

use serde::{Deserialize, Serialize};

/// Allowed drift of a weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A precondition the caller is responsible for that did not hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Weights that should sum to 1 do not
    WeightSum {
        context: String,
        total: f64,
    },

    /// A risk level outside the nominal [0, 1] range
    LevelOutOfRange {
        factor: String,
        level: f64,
    },

    /// A weight below zero
    NegativeWeight {
        context: String,
        weight: f64,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::WeightSum { context, total } => {
                write!(f, "{} weights sum to {} (expected 1)", context, total)
            }
            ValidationWarning::LevelOutOfRange { factor, level } => {
                write!(f, "risk factor '{}' level {} outside [0, 1]", factor, level)
            }
            ValidationWarning::NegativeWeight { context, weight } => {
                write!(f, "{} has negative weight {}", context, weight)
            }
        }
    }
}

/// Warn when `weights` do not sum to 1 within [`WEIGHT_SUM_TOLERANCE`]
pub fn check_weight_sum(context: &str, weights: impl IntoIterator<Item = f64>) -> Option<ValidationWarning> {
    let total: f64 = weights.into_iter().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        Some(ValidationWarning::WeightSum {
            context: context.to_string(),
            total,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_sum() {
        assert_eq!(check_weight_sum("portfolio", [0.6, 0.4]), None);
        assert_eq!(check_weight_sum("portfolio", [0.1, 0.2, 0.3, 0.4]), None);

        let warning = check_weight_sum("risk profile", [0.5, 0.4]).unwrap();
        match &warning {
            ValidationWarning::WeightSum { total, .. } => assert!((total - 0.9).abs() < 1e-12),
            other => panic!("unexpected warning {:?}", other),
        }
        assert!(warning.to_string().starts_with("risk profile weights sum to 0.9"));
    }
}
