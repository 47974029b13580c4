//! Financing terms adjusted for a composite risk score

use serde::{Deserialize, Serialize};

/// Linear response of lending terms to the risk score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingSensitivity {
    /// LVR percentage points removed per unit of risk score
    #[serde(default = "default_lvr_sensitivity")]
    pub lvr: f64,

    /// Interest rate percentage points added per unit of risk score
    #[serde(default = "default_rate_sensitivity")]
    pub rate: f64,
}

fn default_lvr_sensitivity() -> f64 { 2.0 }
fn default_rate_sensitivity() -> f64 { 0.05 }

impl Default for FinancingSensitivity {
    fn default() -> Self {
        Self {
            lvr: 2.0,
            rate: 0.05,
        }
    }
}

/// Risk-adjusted lending terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingAdjustment {
    /// Maximum loan-to-valuation ratio (percent), floored at zero
    pub adjusted_lvr: f64,
    /// Interest rate (percent)
    pub adjusted_rate: f64,
}

/// Lower the LVR and raise the rate in proportion to the risk score
pub fn financing_adjustment(
    base_lvr: f64,
    base_rate: f64,
    risk_score: f64,
    sensitivity: &FinancingSensitivity,
) -> FinancingAdjustment {
    FinancingAdjustment {
        adjusted_lvr: (base_lvr - risk_score * sensitivity.lvr).max(0.0),
        adjusted_rate: base_rate + risk_score * sensitivity.rate,
    }
}
