//! Period-by-period discounted cash flow analysis

use log::debug;
use serde::{Deserialize, Serialize};

use crate::discounting::{discount_factor, present_value};
use crate::error::{ValuationError, ValuationResult};

use super::irr::IrrSolver;
use super::schedule::{CashFlowSchedule, DcfAssumptions};

/// Result of a DCF run. Monetary values are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    pub npv: f64,
    pub irr: f64,
    /// Present value of the holding-period cash flows plus the terminal PV
    pub total_property_value: f64,
    pub cash_flow_pv: f64,
    /// Undiscounted exit value at the end of the holding period
    pub terminal_value: f64,
    pub terminal_pv: f64,
    /// Years to recover the initial investment; saturates at the holding period
    pub payback_period: f64,
    pub profitability_index: f64,
    /// Present value of each period's cash flow, in period order
    pub per_period_pv: Vec<f64>,
}

/// Run a DCF with the default IRR solver (guess 10%, tolerance 1e-4, 100 iterations)
pub fn compute_dcf(
    schedule: &CashFlowSchedule,
    assumptions: &DcfAssumptions,
) -> ValuationResult<DcfResult> {
    compute_dcf_with(schedule, assumptions, &IrrSolver::default())
}

/// Run a DCF with an explicit IRR solver configuration
pub fn compute_dcf_with(
    schedule: &CashFlowSchedule,
    assumptions: &DcfAssumptions,
    solver: &IrrSolver,
) -> ValuationResult<DcfResult> {
    assumptions.validate()?;

    let per_period_pv = schedule
        .flows()
        .iter()
        .map(|f| present_value(f.net_cash_flow, assumptions.discount_rate, f.period))
        .collect::<ValuationResult<Vec<f64>>>()?;
    let cash_flow_pv: f64 = per_period_pv.iter().sum();

    let holding_period = schedule.holding_period();
    let terminal_value = terminal_value(schedule, assumptions)?;
    let terminal_pv = terminal_value * discount_factor(assumptions.discount_rate, holding_period)?;

    let total_property_value = cash_flow_pv + terminal_pv;
    let npv = total_property_value - assumptions.initial_investment;

    let irr = solver.solve(&irr_cashflows(schedule, assumptions, terminal_value))?;
    let payback_period = payback_period(schedule, assumptions.initial_investment)?;
    let profitability_index = total_property_value / assumptions.initial_investment;

    debug!(
        "DCF over {} periods: PV {:.2}, terminal PV {:.2}, NPV {:.2}, IRR {:.6}",
        holding_period, cash_flow_pv, terminal_pv, npv, irr
    );

    Ok(DcfResult {
        npv,
        irr,
        total_property_value,
        cash_flow_pv,
        terminal_value,
        terminal_pv,
        payback_period,
        profitability_index,
        per_period_pv,
    })
}

/// IRR of the investment including the exit value
pub fn irr(schedule: &CashFlowSchedule, assumptions: &DcfAssumptions) -> ValuationResult<f64> {
    assumptions.validate()?;
    let terminal_value = terminal_value(schedule, assumptions)?;
    IrrSolver::default().solve(&irr_cashflows(schedule, assumptions, terminal_value))
}

/// Gordon-growth exit value: `cf_n × (1 + g) / (cap − g)`
pub fn terminal_value(
    schedule: &CashFlowSchedule,
    assumptions: &DcfAssumptions,
) -> ValuationResult<f64> {
    let spread = assumptions.terminal_cap_rate - assumptions.terminal_growth_rate;
    if spread.is_nan() || spread <= 0.0 {
        return Err(ValuationError::InvalidTerminalSpread {
            cap_rate: assumptions.terminal_cap_rate,
            growth_rate: assumptions.terminal_growth_rate,
        });
    }
    let terminal_cash_flow = schedule.last_cash_flow() * (1.0 + assumptions.terminal_growth_rate);
    Ok(terminal_cash_flow / spread)
}

/// Time-0 outlay, then each period's cash flow, with the exit value in the final period
fn irr_cashflows(
    schedule: &CashFlowSchedule,
    assumptions: &DcfAssumptions,
    terminal_value: f64,
) -> Vec<f64> {
    let mut cashflows = Vec::with_capacity(schedule.flows().len() + 1);
    cashflows.push(-assumptions.initial_investment);
    cashflows.extend(schedule.amounts());
    if let Some(last) = cashflows.last_mut() {
        *last += terminal_value;
    }
    cashflows
}

/// Years until cumulative cash flow recovers the initial investment
///
/// Interpolates linearly within the recovery period. If the investment is
/// never recovered within the schedule, returns the holding period length:
/// an approximation, not a guarantee of recoupment. The exit value is not
/// counted. The investment must be positive.
pub fn payback_period(
    schedule: &CashFlowSchedule,
    initial_investment: f64,
) -> ValuationResult<f64> {
    if !(initial_investment.is_finite() && initial_investment > 0.0) {
        return Err(ValuationError::out_of_range(
            "initial_investment",
            initial_investment,
            "must be greater than zero",
        ));
    }
    let mut cumulative = -initial_investment;
    for flow in schedule.flows() {
        let previous = cumulative;
        cumulative += flow.net_cash_flow;
        if cumulative >= 0.0 {
            if flow.net_cash_flow <= 0.0 {
                return Ok(flow.period as f64);
            }
            // Fraction of this period still needed after the prior shortfall
            return Ok((flow.period - 1) as f64 + previous.abs() / flow.net_cash_flow);
        }
    }
    Ok(schedule.holding_period() as f64)
}
