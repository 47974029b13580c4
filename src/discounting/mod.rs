//! Discount factor and present value helpers shared by every calculation

use crate::error::{ValuationError, ValuationResult};

/// Reject rates that would blow up `(1 + rate)^period`
pub(crate) fn check_rate(rate: f64) -> ValuationResult<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(ValuationError::InvalidRate { rate });
    }
    Ok(())
}

/// Discount factor `1 / (1 + rate)^period`
///
/// `rate` is a fraction (0.08 for 8%), `period` is 1-based.
pub fn discount_factor(rate: f64, period: u32) -> ValuationResult<f64> {
    check_rate(rate)?;
    Ok(1.0 / (1.0 + rate).powi(period as i32))
}

/// Present value of a single cash flow received at the end of `period`
pub fn present_value(cash_flow: f64, rate: f64, period: u32) -> ValuationResult<f64> {
    Ok(cash_flow * discount_factor(rate, period)?)
}

/// Present value of a sequence of cash flows, the first received at period 1
pub fn discounted_sum(cash_flows: &[f64], rate: f64) -> ValuationResult<f64> {
    check_rate(rate)?;
    let growth = 1.0 + rate;
    let mut factor = 1.0;
    let mut total = 0.0;
    for cf in cash_flows {
        factor /= growth;
        total += cf * factor;
    }
    Ok(total)
}
