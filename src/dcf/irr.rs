//! Internal Rate of Return (IRR) calculation
//!
//! Newton-Raphson on the NPV function with its analytic derivative. A run
//! that fails to meet the tolerance is an error, never a best-effort rate.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

use super::{DEFAULT_IRR_GUESS, DEFAULT_IRR_MAX_ITERATIONS, DEFAULT_IRR_TOLERANCE};

/// Newton-Raphson settings for IRR solving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolver {
    /// Starting rate for the iteration
    #[serde(default = "default_guess")]
    pub initial_guess: f64,

    /// Convergence threshold on successive rate deltas
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_guess() -> f64 { DEFAULT_IRR_GUESS }
fn default_tolerance() -> f64 { DEFAULT_IRR_TOLERANCE }
fn default_max_iterations() -> usize { DEFAULT_IRR_MAX_ITERATIONS }

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_IRR_GUESS,
            tolerance: DEFAULT_IRR_TOLERANCE,
            max_iterations: DEFAULT_IRR_MAX_ITERATIONS,
        }
    }
}

impl IrrSolver {
    /// Solve for the rate at which `Σ cf_t / (1 + r)^t` is zero
    ///
    /// `cashflows[0]` is at time 0 (typically the negative outlay), later
    /// entries at periods 1, 2, ...
    pub fn solve(&self, cashflows: &[f64]) -> ValuationResult<f64> {
        if cashflows.len() < 2 {
            return Err(ValuationError::insufficient(
                "IRR needs an outlay and at least one later cash flow",
            ));
        }

        let mut rate = self.initial_guess;
        for iteration in 1..=self.max_iterations {
            let (npv, dnpv) = npv_and_derivative(cashflows, rate);

            if !dnpv.is_finite() || dnpv.abs() < 1e-20 {
                debug!("IRR derivative vanished at rate {} (iteration {})", rate, iteration);
                return Err(ValuationError::IrrNotConverged {
                    iterations: iteration,
                    last_rate: rate,
                });
            }

            let new_rate = rate - npv / dnpv;
            if !new_rate.is_finite() || new_rate <= -1.0 {
                debug!("IRR iterate left the valid domain: {}", new_rate);
                return Err(ValuationError::IrrNotConverged {
                    iterations: iteration,
                    last_rate: new_rate,
                });
            }

            if (new_rate - rate).abs() < self.tolerance {
                let polished = polish(cashflows, new_rate);
                debug!("IRR converged to {} after {} iterations", polished, iteration);
                return Ok(polished);
            }

            rate = new_rate;
        }

        Err(ValuationError::IrrNotConverged {
            iterations: self.max_iterations,
            last_rate: rate,
        })
    }
}

/// One further Newton step from a rate that met the delta tolerance
///
/// Keeps `rate` if the step is not usable.
fn polish(cashflows: &[f64], rate: f64) -> f64 {
    let (npv, dnpv) = npv_and_derivative(cashflows, rate);
    if !dnpv.is_finite() || dnpv.abs() < 1e-20 {
        return rate;
    }
    let polished = rate - npv / dnpv;
    if polished.is_finite() && polished > -1.0 {
        polished
    } else {
        rate
    }
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / (discount * (1.0 + rate));
        }
    }

    (npv, dnpv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // $1000 out, $1100 back a year later
        let irr = IrrSolver::default().solve(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_level_annuity() {
        // 5 payments of 263.797 on a 1000 loan is a 10% annuity
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![263.797_480_8; 5]);
        let irr = IrrSolver::default().solve(&cashflows).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-5);
    }

    #[test]
    fn test_npv_zero_at_solution() {
        let cashflows = [-500.0, 120.0, 150.0, 180.0, 210.0];
        let irr = IrrSolver::default().solve(&cashflows).unwrap();
        let (npv, _) = npv_and_derivative(&cashflows, irr);
        assert_abs_diff_eq!(npv, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_large_outlay_npv_is_negligible() {
        // 250M outlay, 20 years of growing income plus a 2.5bn exit
        let mut cashflows = vec![-250_000_000.0];
        cashflows.extend((0..20).map(|i| 15_000_000.0 * 1.02_f64.powi(i)));
        if let Some(last) = cashflows.last_mut() {
            *last += 15_000_000.0 * 1.02_f64.powi(19) * 1.02 / 0.045;
        }
        let irr = IrrSolver::default().solve(&cashflows).unwrap();
        let (npv, _) = npv_and_derivative(&cashflows, irr);
        assert_abs_diff_eq!(npv, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_no_sign_change_does_not_converge() {
        // All inflows: NPV never reaches zero
        let err = IrrSolver::default().solve(&[100.0, 100.0, 100.0]).unwrap_err();
        assert!(matches!(err, ValuationError::IrrNotConverged { .. }));
    }

    #[test]
    fn test_iteration_budget_is_enforced() {
        let solver = IrrSolver {
            max_iterations: 1,
            ..IrrSolver::default()
        };
        let err = solver.solve(&[-1000.0, 0.0, 0.0, 0.0, 3000.0]).unwrap_err();
        assert!(matches!(err, ValuationError::IrrNotConverged { iterations: 1, .. }));
    }

    #[test]
    fn test_too_few_cashflows() {
        assert!(matches!(
            IrrSolver::default().solve(&[-100.0]),
            Err(ValuationError::InsufficientData { .. })
        ));
    }
}
