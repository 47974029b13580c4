//! Portfolio asset records and CSV loading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, ValuationError, ValuationResult};

/// Per-asset metrics rolled up into portfolio metrics
///
/// Ratios, ESG score and yield are percentages (80.0 for 80%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAsset {
    /// Optional identifier carried through from the source file
    #[serde(default)]
    pub name: String,
    pub asset_value: f64,
    pub debt_amount: f64,
    /// Debt over market value (%)
    pub ltv_ratio: f64,
    /// Debt over lender's valuation (%)
    pub lvr_ratio: f64,
    /// Composite ESG score, 0 to 100
    pub esg_score: f64,
    pub yield_rate: f64,
    /// Fraction of the portfolio; weights across assets should sum to 1
    pub weight: f64,
    pub location: String,
    pub property_type: String,
}

impl PortfolioAsset {
    /// Build an asset, deriving LTV from market value and LVR from the lender's valuation
    ///
    /// The weight starts at zero; see [`value_weights`].
    pub fn from_balances(
        asset_value: f64,
        debt_amount: f64,
        lending_valuation: f64,
        esg_score: f64,
        yield_rate: f64,
        location: &str,
        property_type: &str,
    ) -> ValuationResult<Self> {
        if !asset_value.is_finite() || asset_value <= 0.0 {
            return Err(ValuationError::out_of_range("asset_value", asset_value, "must be greater than zero"));
        }
        if !lending_valuation.is_finite() || lending_valuation <= 0.0 {
            return Err(ValuationError::out_of_range(
                "lending_valuation",
                lending_valuation,
                "must be greater than zero",
            ));
        }
        let asset = Self {
            name: String::new(),
            asset_value,
            debt_amount,
            ltv_ratio: debt_amount / asset_value * 100.0,
            lvr_ratio: debt_amount / lending_valuation * 100.0,
            esg_score,
            yield_rate,
            weight: 0.0,
            location: location.to_string(),
            property_type: property_type.to_string(),
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Domain checks on values and scores. Weights are not checked here.
    pub fn validate(&self) -> ValuationResult<()> {
        for (field, value) in [
            ("asset_value", self.asset_value),
            ("debt_amount", self.debt_amount),
            ("ltv_ratio", self.ltv_ratio),
            ("lvr_ratio", self.lvr_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValuationError::out_of_range(field, value, "must be non-negative"));
            }
        }
        if !(0.0..=100.0).contains(&self.esg_score) {
            return Err(ValuationError::out_of_range("esg_score", self.esg_score, "must be between 0 and 100"));
        }
        if !self.yield_rate.is_finite() {
            return Err(ValuationError::out_of_range("yield_rate", self.yield_rate, "must be finite"));
        }
        if !self.weight.is_finite() {
            return Err(ValuationError::out_of_range("weight", self.weight, "must be finite"));
        }
        Ok(())
    }
}

/// Set each asset's weight to its share of total asset value
pub fn value_weights(assets: &mut [PortfolioAsset]) -> ValuationResult<()> {
    let total: f64 = assets.iter().map(|a| a.asset_value).sum();
    if total.is_nan() || total <= 0.0 {
        return Err(ValuationError::insufficient("portfolio has no asset value to weight by"));
    }
    for asset in assets.iter_mut() {
        asset.weight = asset.asset_value / total;
    }
    Ok(())
}

/// Load assets from a CSV file with a header row
pub fn load_assets(path: &Path) -> Result<Vec<PortfolioAsset>, LoadError> {
    let file = File::open(path)?;
    load_assets_from_reader(file)
}

/// Load assets from any CSV reader
///
/// Columns: name (optional), asset_value, debt_amount, ltv_ratio,
/// lvr_ratio, esg_score, yield_rate, weight, location, property_type.
pub fn load_assets_from_reader<R: Read>(reader: R) -> Result<Vec<PortfolioAsset>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut assets = Vec::new();
    for result in rdr.deserialize() {
        let asset: PortfolioAsset = result?;
        asset.validate()?;
        assets.push(asset);
    }

    log::debug!("Loaded {} portfolio assets", assets.len());
    Ok(assets)
}
