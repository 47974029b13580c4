//! Caller-owned engine configuration
//!
//! Bundles every tunable the engine accepts: IRR solver settings, approach
//! weights, benchmark rates, financing sensitivities, risk bands and the
//! portfolio risk thresholds. Nothing here is global; callers load a config
//! and pass the relevant part into each operation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dcf::IrrSolver;
use crate::error::{LoadError, ValuationResult};
use crate::portfolio::PortfolioRiskConfig;
use crate::risk::{FinancingSensitivity, RiskBandScale};
use crate::valuation::{ApproachWeights, BenchmarkTable};

/// Default location for a config file next to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "data/engine_config.json";

/// All engine configuration, each section defaulting independently
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub irr_solver: IrrSolver,

    #[serde(default)]
    pub approach_weights: ApproachWeights,

    #[serde(default)]
    pub benchmarks: BenchmarkTable,

    #[serde(default)]
    pub financing: FinancingSensitivity,

    #[serde(default)]
    pub risk_bands: RiskBandScale,

    #[serde(default)]
    pub portfolio: PortfolioRiskConfig,
}

impl EngineConfig {
    /// Parse a JSON document; missing sections and fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the lookup tables whose cutoffs must be strictly ascending
    pub fn validate(&self) -> ValuationResult<()> {
        self.risk_bands.validate()?;
        self.portfolio.grades.validate()
    }

    pub fn from_json_path(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from [`DEFAULT_CONFIG_PATH`] if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, LoadError> {
        match path {
            Some(p) => Self::from_json_path(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_json_path(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
