//! Cash flow schedule and DCF assumptions

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

/// Net cash flow for one period of the holding period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// 1-based period number
    pub period: u32,
    pub net_cash_flow: f64,
}

/// Ordered net cash flows, periods contiguous from 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CashFlow>", into = "Vec<CashFlow>")]
pub struct CashFlowSchedule {
    flows: Vec<CashFlow>,
}

impl CashFlowSchedule {
    /// Build a schedule from explicit periods
    ///
    /// Periods must run 1, 2, ..., n with no gaps and at least one entry.
    pub fn new(flows: Vec<CashFlow>) -> ValuationResult<Self> {
        if flows.is_empty() {
            return Err(ValuationError::insufficient("cash flow schedule has no periods"));
        }
        for (idx, flow) in flows.iter().enumerate() {
            let expected = idx as u32 + 1;
            if flow.period != expected {
                return Err(ValuationError::out_of_range(
                    "period",
                    flow.period as f64,
                    &format!("expected period {} (periods must be contiguous from 1)", expected),
                ));
            }
            if !flow.net_cash_flow.is_finite() {
                return Err(ValuationError::out_of_range(
                    "net_cash_flow",
                    flow.net_cash_flow,
                    "must be finite",
                ));
            }
        }
        Ok(Self { flows })
    }

    /// Build a schedule from plain amounts, numbering periods from 1
    pub fn from_amounts(amounts: &[f64]) -> ValuationResult<Self> {
        let flows = amounts
            .iter()
            .enumerate()
            .map(|(idx, &amount)| CashFlow {
                period: idx as u32 + 1,
                net_cash_flow: amount,
            })
            .collect();
        Self::new(flows)
    }

    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    /// Net cash flows in period order
    pub fn amounts(&self) -> Vec<f64> {
        self.flows.iter().map(|f| f.net_cash_flow).collect()
    }

    /// Number of periods (the holding period)
    pub fn holding_period(&self) -> u32 {
        self.flows.len() as u32
    }

    /// Cash flow of the final period
    pub fn last_cash_flow(&self) -> f64 {
        self.flows.last().map(|f| f.net_cash_flow).unwrap_or(0.0)
    }

    /// Whether the holding period lies in the range callers are expected to enforce
    pub fn has_standard_holding_period(&self) -> bool {
        (super::MIN_HOLDING_PERIOD..=super::MAX_HOLDING_PERIOD).contains(&self.holding_period())
    }
}

impl TryFrom<Vec<CashFlow>> for CashFlowSchedule {
    type Error = ValuationError;

    fn try_from(flows: Vec<CashFlow>) -> Result<Self, Self::Error> {
        Self::new(flows)
    }
}

impl From<CashFlowSchedule> for Vec<CashFlow> {
    fn from(schedule: CashFlowSchedule) -> Self {
        schedule.flows
    }
}

/// Investment and discounting assumptions for a DCF run
///
/// All rates are fractions (0.08 for 8%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Purchase price or capital outlay at time 0 (must be > 0)
    pub initial_investment: f64,
    pub discount_rate: f64,
    /// Cap rate applied to the year n+1 cash flow for the exit value
    pub terminal_cap_rate: f64,
    pub terminal_growth_rate: f64,
}

impl DcfAssumptions {
    /// Check the assumptions before any discounting happens
    pub fn validate(&self) -> ValuationResult<()> {
        if !(self.initial_investment.is_finite() && self.initial_investment > 0.0) {
            return Err(ValuationError::out_of_range(
                "initial_investment",
                self.initial_investment,
                "must be greater than zero",
            ));
        }
        crate::discounting::check_rate(self.discount_rate)?;
        crate::discounting::check_rate(self.terminal_growth_rate)?;
        if !self.terminal_cap_rate.is_finite() || self.terminal_cap_rate <= self.terminal_growth_rate {
            return Err(ValuationError::InvalidTerminalSpread {
                cap_rate: self.terminal_cap_rate,
                growth_rate: self.terminal_growth_rate,
            });
        }
        Ok(())
    }
}
