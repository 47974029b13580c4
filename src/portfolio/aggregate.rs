//! Portfolio-level weighted metrics, concentration risk and risk grade

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};
use crate::validation::{check_weight_sum, ValidationWarning};

use super::asset::PortfolioAsset;
use super::grade::GradeScale;

/// Thresholds and coefficients for the portfolio risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRiskConfig {
    /// Weighted LTV (%) above which risk accrues
    #[serde(default = "default_ltv_threshold")]
    pub ltv_threshold: f64,
    #[serde(default = "default_ltv_coefficient")]
    pub ltv_coefficient: f64,

    /// Weighted LVR (%) above which risk accrues
    #[serde(default = "default_lvr_threshold")]
    pub lvr_threshold: f64,
    #[serde(default = "default_lvr_coefficient")]
    pub lvr_coefficient: f64,

    /// Weighted ESG score below which risk accrues
    #[serde(default = "default_esg_target")]
    pub esg_target: f64,
    #[serde(default = "default_esg_coefficient")]
    pub esg_coefficient: f64,

    /// Portfolio yield (%) above which risk accrues
    #[serde(default = "default_yield_threshold")]
    pub yield_threshold: f64,
    #[serde(default = "default_yield_coefficient")]
    pub yield_coefficient: f64,

    /// Concentration credit per distinct location
    #[serde(default = "default_location_credit")]
    pub location_credit: f64,

    /// Concentration credit per distinct property type
    #[serde(default = "default_property_type_credit")]
    pub property_type_credit: f64,

    #[serde(default)]
    pub grades: GradeScale,
}

fn default_ltv_threshold() -> f64 { 70.0 }
fn default_ltv_coefficient() -> f64 { 2.0 }
fn default_lvr_threshold() -> f64 { 80.0 }
fn default_lvr_coefficient() -> f64 { 1.5 }
fn default_esg_target() -> f64 { 70.0 }
fn default_esg_coefficient() -> f64 { 0.5 }
fn default_yield_threshold() -> f64 { 8.0 }
fn default_yield_coefficient() -> f64 { 5.0 }
fn default_location_credit() -> f64 { 20.0 }
fn default_property_type_credit() -> f64 { 15.0 }

impl Default for PortfolioRiskConfig {
    fn default() -> Self {
        Self {
            ltv_threshold: 70.0,
            ltv_coefficient: 2.0,
            lvr_threshold: 80.0,
            lvr_coefficient: 1.5,
            esg_target: 70.0,
            esg_coefficient: 0.5,
            yield_threshold: 8.0,
            yield_coefficient: 5.0,
            location_credit: 20.0,
            property_type_credit: 15.0,
            grades: GradeScale::default(),
        }
    }
}

/// Breakdown of the overall risk score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub ltv_risk: f64,
    pub lvr_risk: f64,
    pub esg_risk: f64,
    pub concentration_risk: f64,
    pub yield_risk: f64,
}

impl RiskComponents {
    pub fn total(&self) -> f64 {
        self.ltv_risk + self.lvr_risk + self.esg_risk + self.concentration_risk + self.yield_risk
    }
}

/// Portfolio roll-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_asset_value: f64,
    pub total_debt: f64,
    pub weighted_ltv: f64,
    pub weighted_lvr: f64,
    pub weighted_esg: f64,
    pub portfolio_yield: f64,
    pub concentration_risk: f64,
    pub overall_risk_score: f64,
    pub risk_grade: String,
    pub risk_components: RiskComponents,
    /// Summed weight per location
    pub location_exposure: BTreeMap<String, f64>,
    /// Summed weight per property type
    pub property_type_exposure: BTreeMap<String, f64>,
    /// Caller preconditions that did not hold (weights not summing to 1, ...)
    pub warnings: Vec<ValidationWarning>,
}

/// `max(0, (value − threshold) × coefficient)`
fn excess_risk(value: f64, threshold: f64, coefficient: f64) -> f64 {
    ((value - threshold) * coefficient).max(0.0)
}

/// Diversification penalty: `max(0, 100 − (locations × credit + types × credit))`
pub fn concentration_risk(
    location_count: usize,
    property_type_count: usize,
    config: &PortfolioRiskConfig,
) -> f64 {
    let credit = location_count as f64 * config.location_credit
        + property_type_count as f64 * config.property_type_credit;
    (100.0 - credit).max(0.0)
}

/// Roll per-asset metrics up into portfolio metrics
///
/// Weighted metrics are `Σ metric × weight` using the caller's weights as
/// given. Weights that do not sum to 1 are reported in `warnings`, not
/// renormalized.
pub fn aggregate(
    assets: &[PortfolioAsset],
    config: &PortfolioRiskConfig,
) -> ValuationResult<PortfolioMetrics> {
    if assets.is_empty() {
        return Err(ValuationError::insufficient("portfolio has no assets"));
    }
    for asset in assets {
        asset.validate()?;
    }

    let mut warnings = Vec::new();
    if let Some(w) = check_weight_sum("portfolio asset", assets.iter().map(|a| a.weight)) {
        warnings.push(w);
    }
    for asset in assets.iter().filter(|a| a.weight < 0.0) {
        warnings.push(ValidationWarning::NegativeWeight {
            context: format!("asset '{}'", asset.name),
            weight: asset.weight,
        });
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    let mut total_asset_value = 0.0;
    let mut total_debt = 0.0;
    let mut weighted_ltv = 0.0;
    let mut weighted_lvr = 0.0;
    let mut weighted_esg = 0.0;
    let mut portfolio_yield = 0.0;
    let mut location_exposure: BTreeMap<String, f64> = BTreeMap::new();
    let mut property_type_exposure: BTreeMap<String, f64> = BTreeMap::new();

    for asset in assets {
        total_asset_value += asset.asset_value;
        total_debt += asset.debt_amount;
        weighted_ltv += asset.ltv_ratio * asset.weight;
        weighted_lvr += asset.lvr_ratio * asset.weight;
        weighted_esg += asset.esg_score * asset.weight;
        portfolio_yield += asset.yield_rate * asset.weight;
        *location_exposure.entry(asset.location.clone()).or_insert(0.0) += asset.weight;
        *property_type_exposure.entry(asset.property_type.clone()).or_insert(0.0) += asset.weight;
    }

    let locations: BTreeSet<&str> = assets.iter().map(|a| a.location.as_str()).collect();
    let property_types: BTreeSet<&str> = assets.iter().map(|a| a.property_type.as_str()).collect();
    let concentration = concentration_risk(locations.len(), property_types.len(), config);

    let risk_components = RiskComponents {
        ltv_risk: excess_risk(weighted_ltv, config.ltv_threshold, config.ltv_coefficient),
        lvr_risk: excess_risk(weighted_lvr, config.lvr_threshold, config.lvr_coefficient),
        esg_risk: ((config.esg_target - weighted_esg) * config.esg_coefficient).max(0.0),
        concentration_risk: concentration,
        yield_risk: excess_risk(portfolio_yield, config.yield_threshold, config.yield_coefficient),
    };
    let overall_risk_score = risk_components.total();
    let risk_grade = config.grades.grade(overall_risk_score).to_string();

    debug!(
        "Portfolio of {} assets: LTV {:.2}, ESG {:.2}, risk {:.2} ({})",
        assets.len(),
        weighted_ltv,
        weighted_esg,
        overall_risk_score,
        risk_grade
    );

    Ok(PortfolioMetrics {
        total_asset_value,
        total_debt,
        weighted_ltv,
        weighted_lvr,
        weighted_esg,
        portfolio_yield,
        concentration_risk: concentration,
        overall_risk_score,
        risk_grade,
        risk_components,
        location_exposure,
        property_type_exposure,
        warnings,
    })
}
