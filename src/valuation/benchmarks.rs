//! Reference rates and input builders for the income and cost approaches
//!
//! Benchmark rates are configuration, passed into each call, so a rate
//! table can be versioned and tested apart from the valuation logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

use super::approach::{require_non_negative, ApproachInput};

/// Reference construction and land rates for one property type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRates {
    /// Land value per hectare
    #[serde(default)]
    pub land_rate_per_hectare: f64,

    /// Replacement cost per square metre of building
    #[serde(default)]
    pub building_rate_per_sqm: f64,

    /// Replacement cost per functional unit (seat, bed, bay, ...)
    #[serde(default)]
    pub replacement_cost_per_unit: f64,

    /// Economic life used for straight-line depreciation (years)
    pub effective_life_years: f64,
}

/// Benchmark rates keyed by property type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkTable {
    rates: BTreeMap<String, BenchmarkRates>,
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert("residential".to_string(), BenchmarkRates {
            land_rate_per_hectare: 2_500_000.0,
            building_rate_per_sqm: 2_800.0,
            replacement_cost_per_unit: 0.0,
            effective_life_years: 50.0,
        });
        rates.insert("commercial".to_string(), BenchmarkRates {
            land_rate_per_hectare: 4_000_000.0,
            building_rate_per_sqm: 3_500.0,
            replacement_cost_per_unit: 0.0,
            effective_life_years: 40.0,
        });
        rates.insert("industrial".to_string(), BenchmarkRates {
            land_rate_per_hectare: 1_200_000.0,
            building_rate_per_sqm: 1_500.0,
            replacement_cost_per_unit: 0.0,
            effective_life_years: 35.0,
        });
        rates.insert("retail".to_string(), BenchmarkRates {
            land_rate_per_hectare: 3_500_000.0,
            building_rate_per_sqm: 3_000.0,
            replacement_cost_per_unit: 0.0,
            effective_life_years: 40.0,
        });
        rates.insert("agricultural".to_string(), BenchmarkRates {
            land_rate_per_hectare: 15_000.0,
            building_rate_per_sqm: 800.0,
            replacement_cost_per_unit: 0.0,
            effective_life_years: 30.0,
        });
        rates.insert("stadium".to_string(), BenchmarkRates {
            land_rate_per_hectare: 1_000_000.0,
            building_rate_per_sqm: 0.0,
            replacement_cost_per_unit: 10_000.0,
            effective_life_years: 50.0,
        });
        Self { rates }
    }
}

impl BenchmarkTable {
    pub fn new(rates: BTreeMap<String, BenchmarkRates>) -> Self {
        Self { rates }
    }

    /// Look up a property type, case-insensitively
    pub fn get(&self, property_type: &str) -> Option<&BenchmarkRates> {
        self.rates.get(&property_type.to_ascii_lowercase())
    }

    pub fn insert(&mut self, property_type: &str, rates: BenchmarkRates) {
        self.rates.insert(property_type.to_ascii_lowercase(), rates);
    }

    pub fn property_types(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

/// Operating figures from which an income approach is built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeInputs {
    /// Potential gross revenue for a stabilized year
    pub gross_revenue: f64,
    /// Vacancy and collection loss as a fraction of gross revenue
    #[serde(default)]
    pub vacancy_rate: f64,
    pub operating_expenses: f64,
    /// Market cap rate for the property type
    pub base_cap_rate: f64,
    /// Additional yield demanded for asset-specific risk (climate, tenancy, ...)
    #[serde(default)]
    pub risk_premium: f64,
}

impl IncomeInputs {
    /// NOI = gross revenue × (1 − vacancy) − operating expenses
    pub fn net_operating_income(&self) -> f64 {
        self.gross_revenue * (1.0 - self.vacancy_rate) - self.operating_expenses
    }

    pub fn effective_cap_rate(&self) -> f64 {
        self.base_cap_rate + self.risk_premium
    }

    pub fn to_approach(&self) -> ValuationResult<ApproachInput> {
        require_non_negative("gross_revenue", self.gross_revenue)?;
        require_non_negative("operating_expenses", self.operating_expenses)?;
        if !(0.0..=1.0).contains(&self.vacancy_rate) {
            return Err(ValuationError::out_of_range(
                "vacancy_rate",
                self.vacancy_rate,
                "must be between 0 and 1",
            ));
        }
        Ok(ApproachInput::Income {
            net_operating_income: self.net_operating_income(),
            cap_rate: self.effective_cap_rate(),
        })
    }
}

/// Physical description from which a cost approach is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub property_type: String,
    #[serde(default)]
    pub land_area_hectares: f64,
    #[serde(default)]
    pub building_area_sqm: f64,
    /// Functional units priced per unit (seats for a stadium)
    #[serde(default)]
    pub units: f64,
    /// Effective age of the improvements (years)
    #[serde(default)]
    pub age_years: f64,
}

impl CostInputs {
    /// Price the improvements and land from the benchmark table
    ///
    /// Depreciation is straight-line over the type's effective life, capped
    /// at full depreciation.
    pub fn to_approach(&self, table: &BenchmarkTable) -> ValuationResult<ApproachInput> {
        let rates = table.get(&self.property_type).ok_or_else(|| {
            ValuationError::insufficient(format!(
                "no benchmark rates for property type '{}'",
                self.property_type
            ))
        })?;

        require_non_negative("land_area_hectares", self.land_area_hectares)?;
        require_non_negative("building_area_sqm", self.building_area_sqm)?;
        require_non_negative("units", self.units)?;
        require_non_negative("age_years", self.age_years)?;
        if !rates.effective_life_years.is_finite() || rates.effective_life_years <= 0.0 {
            return Err(ValuationError::out_of_range(
                "effective_life_years",
                rates.effective_life_years,
                "must be greater than zero",
            ));
        }

        let replacement_cost_new = self.building_area_sqm * rates.building_rate_per_sqm
            + self.units * rates.replacement_cost_per_unit;
        let depreciation_fraction = (self.age_years / rates.effective_life_years).min(1.0);
        let land_value = self.land_area_hectares * rates.land_rate_per_hectare;

        Ok(ApproachInput::Cost {
            replacement_cost_new,
            depreciation_fraction,
            land_value,
        })
    }
}
