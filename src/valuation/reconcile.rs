//! Blend approach estimates into a single weighted valuation

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

use super::approach::{ApproachEstimate, ApproachInput, ApproachKind};

/// Configured weight per approach before renormalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApproachWeights {
    #[serde(default = "default_income_weight")]
    pub income: f64,

    #[serde(default = "default_cost_weight")]
    pub cost: f64,

    #[serde(default = "default_sales_weight")]
    pub sales_comparison: f64,
}

fn default_income_weight() -> f64 { 0.5 }
fn default_cost_weight() -> f64 { 0.2 }
fn default_sales_weight() -> f64 { 0.3 }

impl Default for ApproachWeights {
    fn default() -> Self {
        Self {
            income: 0.5,
            cost: 0.2,
            sales_comparison: 0.3,
        }
    }
}

impl ApproachWeights {
    pub fn weight(&self, kind: ApproachKind) -> f64 {
        match kind {
            ApproachKind::Income => self.income,
            ApproachKind::Cost => self.cost,
            ApproachKind::SalesComparison => self.sales_comparison,
        }
    }
}

/// Final blended valuation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledValuation {
    /// Approaches that contributed, in the order supplied
    pub estimates: Vec<ApproachEstimate>,
    /// Renormalized weights of the contributing approaches (sum to 1)
    pub weights: BTreeMap<ApproachKind, f64>,
    pub final_value: f64,
    /// Value per seat, hectare, etc. when the subject's unit count is known
    pub value_per_unit: Option<f64>,
}

/// Weighted average of the usable estimates
///
/// Approaches with a zero value or zero configured weight drop out and the
/// remaining weights are renormalized to sum to 1. Fails with
/// `InsufficientData` when nothing is left.
pub fn reconcile(
    estimates: &[ApproachEstimate],
    weights: &ApproachWeights,
    subject_units: Option<f64>,
) -> ValuationResult<ReconciledValuation> {
    for kind in [ApproachKind::Income, ApproachKind::Cost, ApproachKind::SalesComparison] {
        let weight = weights.weight(kind);
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValuationError::out_of_range(
                &format!("{:?} weight", kind),
                weight,
                "must be non-negative",
            ));
        }
    }
    if let Some(units) = subject_units {
        if !units.is_finite() || units < 0.0 {
            return Err(ValuationError::out_of_range("subject_units", units, "must be non-negative"));
        }
    }

    let mut seen = Vec::with_capacity(estimates.len());
    for est in estimates {
        let kind = est.kind();
        if seen.contains(&kind) {
            return Err(ValuationError::out_of_range(
                &format!("{:?} estimate", kind),
                est.value(),
                "each approach may appear only once",
            ));
        }
        seen.push(kind);
    }

    let usable: Vec<&ApproachEstimate> = estimates
        .iter()
        .filter(|est| est.value().is_finite() && est.value() > 0.0 && weights.weight(est.kind()) > 0.0)
        .collect();

    let total_weight: f64 = usable.iter().map(|est| weights.weight(est.kind())).sum();
    if usable.is_empty() || total_weight <= 0.0 {
        return Err(ValuationError::insufficient(
            "no valuation approach has usable data",
        ));
    }

    let mut normalized = BTreeMap::new();
    let mut final_value = 0.0;
    for est in &usable {
        let weight = weights.weight(est.kind()) / total_weight;
        normalized.insert(est.kind(), weight);
        final_value += est.value() * weight;
    }

    debug!("Reconciled {} approaches with weights {:?}: {:.2}", usable.len(), normalized, final_value);

    let value_per_unit = subject_units.filter(|u| *u > 0.0).map(|u| final_value / u);

    Ok(ReconciledValuation {
        estimates: usable.into_iter().cloned().collect(),
        weights: normalized,
        final_value,
        value_per_unit,
    })
}

/// Evaluate raw approach inputs and reconcile whatever produced a value
pub fn value_asset(
    inputs: &[ApproachInput],
    weights: &ApproachWeights,
    subject_units: Option<f64>,
) -> ValuationResult<ReconciledValuation> {
    let mut estimates = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input.estimate()? {
            Some(est) => estimates.push(est),
            None => debug!("{:?} approach excluded: no usable data", input.kind()),
        }
    }
    reconcile(&estimates, weights, subject_units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::Comparable;
    use approx::assert_relative_eq;

    fn income(value_noi: f64) -> ApproachEstimate {
        ApproachInput::Income {
            net_operating_income: value_noi,
            cap_rate: 0.05,
        }
        .estimate()
        .unwrap()
        .unwrap()
    }

    fn cost(rcn: f64) -> ApproachEstimate {
        ApproachInput::Cost {
            replacement_cost_new: rcn,
            depreciation_fraction: 0.0,
            land_value: 0.0,
        }
        .estimate()
        .unwrap()
        .unwrap()
    }

    fn stadium_sales() -> ApproachInput {
        ApproachInput::SalesComparison {
            comparables: vec![Comparable {
                sale_price: 500_000_000.0,
                units: 60_000.0,
            }],
            subject_units: 45_000.0,
        }
    }

    #[test]
    fn test_single_approach_is_returned_exactly() {
        let est = income(123_456.0);
        let result = reconcile(std::slice::from_ref(&est), &ApproachWeights::default(), None).unwrap();
        assert_eq!(result.final_value, est.value());
        assert_eq!(result.weights.get(&ApproachKind::Income), Some(&1.0));
        assert_eq!(result.value_per_unit, None);
    }

    #[test]
    fn test_zero_approaches_is_insufficient() {
        assert!(matches!(
            reconcile(&[], &ApproachWeights::default(), Some(10.0)),
            Err(ValuationError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_stadium_sales_only() {
        let inputs = vec![
            stadium_sales(),
            ApproachInput::Income {
                net_operating_income: 0.0,
                cap_rate: 0.08,
            },
        ];
        let result = value_asset(&inputs, &ApproachWeights::default(), Some(45_000.0)).unwrap();

        assert_eq!(result.estimates.len(), 1);
        assert_relative_eq!(result.estimates[0].price_per_unit().unwrap(), 8_333.33, epsilon = 0.01);
        assert_relative_eq!(result.final_value, 375_000_000.0, epsilon = 1e-4);
        assert_eq!(result.weights.len(), 1);
        assert_eq!(result.weights[&ApproachKind::SalesComparison], 1.0);
        assert_relative_eq!(result.value_per_unit.unwrap(), 8_333.33, epsilon = 0.01);
    }

    #[test]
    fn test_weights_renormalize_over_present_approaches() {
        // Income 0.5 and cost 0.2 become 5/7 and 2/7
        let estimates = vec![income(50_000.0), cost(700_000.0)];
        let result = reconcile(&estimates, &ApproachWeights::default(), None).unwrap();

        let income_w = result.weights[&ApproachKind::Income];
        let cost_w = result.weights[&ApproachKind::Cost];
        assert_relative_eq!(income_w, 5.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(cost_w, 2.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(income_w + cost_w, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            result.final_value,
            1_000_000.0 * 5.0 / 7.0 + 700_000.0 * 2.0 / 7.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_all_three_approaches() {
        let estimates = vec![
            income(50_000.0),
            cost(900_000.0),
            stadium_sales().estimate().unwrap().unwrap(),
        ];
        let weights = ApproachWeights {
            income: 0.6,
            cost: 0.1,
            sales_comparison: 0.3,
        };
        let result = reconcile(&estimates, &weights, None).unwrap();
        let expected = 1_000_000.0 * 0.6 + 900_000.0 * 0.1 + 375_000_000.0 * 0.3;
        assert_relative_eq!(result.final_value, expected, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_weight_approach_does_not_participate() {
        let estimates = vec![income(50_000.0), cost(700_000.0)];
        let weights = ApproachWeights {
            income: 0.0,
            ..ApproachWeights::default()
        };
        let result = reconcile(&estimates, &weights, None).unwrap();
        assert_eq!(result.final_value, 700_000.0);
        assert!(!result.weights.contains_key(&ApproachKind::Income));

        let nothing = ApproachWeights {
            income: 0.0,
            cost: 0.0,
            sales_comparison: 0.0,
        };
        assert!(matches!(
            reconcile(&estimates, &nothing, None),
            Err(ValuationError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_duplicate_approach_rejected() {
        let estimates = vec![income(50_000.0), income(60_000.0)];
        assert!(matches!(
            reconcile(&estimates, &ApproachWeights::default(), None),
            Err(ValuationError::OutOfRangeInput { .. })
        ));
    }

    #[test]
    fn test_weights_deserialize_with_defaults() {
        let weights: ApproachWeights = serde_json::from_str(r#"{"income":0.7}"#).unwrap();
        assert_eq!(weights.income, 0.7);
        assert_eq!(weights.cost, 0.2);
        assert_eq!(weights.sales_comparison, 0.3);
    }
}
