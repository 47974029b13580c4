//! Income, cost and sales-comparison value estimates

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

/// The three valuation methodologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproachKind {
    Income,
    Cost,
    SalesComparison,
}

/// A comparable transaction, e.g. a stadium sale and its seat count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparable {
    pub sale_price: f64,
    /// Units sold (seats, hectares, square metres, ...)
    pub units: f64,
}

impl Comparable {
    pub fn price_per_unit(&self) -> f64 {
        self.sale_price / self.units
    }
}

/// Raw inputs for one valuation approach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "approach", rename_all = "snake_case")]
pub enum ApproachInput {
    /// Capitalize NOI at a cap rate the caller has already risk-adjusted
    Income {
        net_operating_income: f64,
        cap_rate: f64,
    },

    /// Depreciated replacement cost, plus land where the caller values it separately
    Cost {
        replacement_cost_new: f64,
        /// Accrued depreciation as a fraction of replacement cost (0.0 to 1.0)
        depreciation_fraction: f64,
        #[serde(default)]
        land_value: f64,
    },

    /// Mean comparable price per unit applied to the subject's units
    SalesComparison {
        comparables: Vec<Comparable>,
        subject_units: f64,
    },
}

impl ApproachInput {
    pub fn kind(&self) -> ApproachKind {
        match self {
            ApproachInput::Income { .. } => ApproachKind::Income,
            ApproachInput::Cost { .. } => ApproachKind::Cost,
            ApproachInput::SalesComparison { .. } => ApproachKind::SalesComparison,
        }
    }

    /// Evaluate the approach
    ///
    /// Returns `Ok(None)` when the approach has no usable data (non-positive
    /// NOI, no comparables, zero value). Such approaches are excluded from
    /// reconciliation rather than counted as zero.
    pub fn estimate(&self) -> ValuationResult<Option<ApproachEstimate>> {
        let value = match self {
            ApproachInput::Income { net_operating_income, cap_rate } => {
                if !cap_rate.is_finite() || *cap_rate <= 0.0 {
                    return Err(ValuationError::InvalidRate { rate: *cap_rate });
                }
                require_finite("net_operating_income", *net_operating_income)?;
                if *net_operating_income <= 0.0 {
                    return Ok(None);
                }
                net_operating_income / cap_rate
            }
            ApproachInput::Cost { replacement_cost_new, depreciation_fraction, land_value } => {
                require_non_negative("replacement_cost_new", *replacement_cost_new)?;
                require_non_negative("land_value", *land_value)?;
                require_fraction("depreciation_fraction", *depreciation_fraction)?;
                land_value + replacement_cost_new * (1.0 - depreciation_fraction)
            }
            ApproachInput::SalesComparison { comparables, subject_units } => {
                require_non_negative("subject_units", *subject_units)?;
                if comparables.is_empty() {
                    return Ok(None);
                }
                for comp in comparables {
                    require_non_negative("sale_price", comp.sale_price)?;
                    if !comp.units.is_finite() || comp.units <= 0.0 {
                        return Err(ValuationError::out_of_range(
                            "comparable units",
                            comp.units,
                            "must be greater than zero",
                        ));
                    }
                }
                mean_price_per_unit(comparables) * subject_units
            }
        };

        if value > 0.0 {
            Ok(Some(ApproachEstimate { input: self.clone(), value }))
        } else {
            Ok(None)
        }
    }
}

/// An approach together with the value it produced
///
/// Only [`ApproachInput::estimate`] builds one, so `value` always follows
/// from `input`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachEstimate {
    input: ApproachInput,
    value: f64,
}

impl ApproachEstimate {
    pub fn input(&self) -> &ApproachInput {
        &self.input
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> ApproachKind {
        self.input.kind()
    }

    /// Comparable price per unit, for sales-comparison estimates
    pub fn price_per_unit(&self) -> Option<f64> {
        match &self.input {
            ApproachInput::SalesComparison { comparables, .. } if !comparables.is_empty() => {
                Some(mean_price_per_unit(comparables))
            }
            _ => None,
        }
    }
}

fn mean_price_per_unit(comparables: &[Comparable]) -> f64 {
    let total: f64 = comparables.iter().map(Comparable::price_per_unit).sum();
    total / comparables.len() as f64
}

fn require_finite(field: &str, value: f64) -> ValuationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValuationError::out_of_range(field, value, "must be finite"))
    }
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> ValuationResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValuationError::out_of_range(field, value, "must be non-negative"))
    }
}

fn require_fraction(field: &str, value: f64) -> ValuationResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValuationError::out_of_range(field, value, "must be between 0 and 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_income_approach() {
        let input = ApproachInput::Income {
            net_operating_income: 650_000.0,
            cap_rate: 0.065,
        };
        let est = input.estimate().unwrap().unwrap();
        assert_eq!(est.kind(), ApproachKind::Income);
        assert_relative_eq!(est.value(), 10_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_income_approach_rejects_zero_cap_rate() {
        let input = ApproachInput::Income {
            net_operating_income: 650_000.0,
            cap_rate: 0.0,
        };
        assert_eq!(input.estimate(), Err(ValuationError::InvalidRate { rate: 0.0 }));
    }

    #[test]
    fn test_negative_noi_is_excluded() {
        let input = ApproachInput::Income {
            net_operating_income: -5_000.0,
            cap_rate: 0.07,
        };
        assert_eq!(input.estimate(), Ok(None));
    }

    #[test]
    fn test_cost_approach() {
        let input = ApproachInput::Cost {
            replacement_cost_new: 2_000_000.0,
            depreciation_fraction: 0.25,
            land_value: 0.0,
        };
        let est = input.estimate().unwrap().unwrap();
        assert_relative_eq!(est.value(), 1_500_000.0, epsilon = 1e-9);

        let with_land = ApproachInput::Cost {
            replacement_cost_new: 2_000_000.0,
            depreciation_fraction: 0.25,
            land_value: 400_000.0,
        };
        assert_relative_eq!(with_land.estimate().unwrap().unwrap().value(), 1_900_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cost_approach_domain_checks() {
        let over_depreciated = ApproachInput::Cost {
            replacement_cost_new: 100.0,
            depreciation_fraction: 1.2,
            land_value: 0.0,
        };
        assert!(matches!(
            over_depreciated.estimate(),
            Err(ValuationError::OutOfRangeInput { .. })
        ));

        let fully_depreciated = ApproachInput::Cost {
            replacement_cost_new: 100.0,
            depreciation_fraction: 1.0,
            land_value: 0.0,
        };
        assert_eq!(fully_depreciated.estimate(), Ok(None));
    }

    #[test]
    fn test_sales_comparison_price_per_seat() {
        let input = ApproachInput::SalesComparison {
            comparables: vec![Comparable {
                sale_price: 500_000_000.0,
                units: 60_000.0,
            }],
            subject_units: 45_000.0,
        };
        let est = input.estimate().unwrap().unwrap();
        assert_relative_eq!(est.price_per_unit().unwrap(), 8_333.333_333, epsilon = 1e-5);
        assert_relative_eq!(est.value(), 375_000_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sales_comparison_averages_comparables() {
        let input = ApproachInput::SalesComparison {
            comparables: vec![
                Comparable { sale_price: 1_000_000.0, units: 100.0 },
                Comparable { sale_price: 1_500_000.0, units: 100.0 },
            ],
            subject_units: 50.0,
        };
        let est = input.estimate().unwrap().unwrap();
        assert_relative_eq!(est.price_per_unit().unwrap(), 12_500.0, epsilon = 1e-9);
        assert_relative_eq!(est.value(), 625_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sales_comparison_without_comparables_is_excluded() {
        let input = ApproachInput::SalesComparison {
            comparables: vec![],
            subject_units: 45_000.0,
        };
        assert_eq!(input.estimate(), Ok(None));

        let negative_area = ApproachInput::SalesComparison {
            comparables: vec![Comparable { sale_price: 10.0, units: 1.0 }],
            subject_units: -3.0,
        };
        assert!(matches!(
            negative_area.estimate(),
            Err(ValuationError::OutOfRangeInput { .. })
        ));
    }

    #[test]
    fn test_input_deserializes_from_tagged_json() {
        let input: ApproachInput = serde_json::from_str(
            r#"{"approach":"cost","replacement_cost_new":1000.0,"depreciation_fraction":0.1}"#,
        )
        .unwrap();
        assert_eq!(
            input,
            ApproachInput::Cost {
                replacement_cost_new: 1000.0,
                depreciation_fraction: 0.1,
                land_value: 0.0,
            }
        );
    }

    #[test]
    fn test_estimate_carries_its_input() {
        let input = ApproachInput::Income {
            net_operating_income: 650_000.0,
            cap_rate: 0.065,
        };
        let est = input.estimate().unwrap().unwrap();
        assert_eq!(est.input(), &input);
        assert_eq!(est.kind(), ApproachKind::Income);
        assert_relative_eq!(est.value(), 10_000_000.0, epsilon = 1e-6);

        let json = serde_json::to_value(&est).unwrap();
        assert_eq!(json["input"]["approach"], "income");
        assert_relative_eq!(json["value"].as_f64().unwrap(), 10_000_000.0, epsilon = 1e-6);
    }
}
