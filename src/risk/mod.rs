//! Composite climate/ESG risk scoring and the financing terms derived from it

mod composite;
mod financing;

pub use composite::{score, ClimateExposure, RiskBand, RiskBandScale, RiskFactor, RiskProfile};
pub use financing::{financing_adjustment, FinancingAdjustment, FinancingSensitivity};
