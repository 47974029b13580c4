//! Portfolio aggregation: weighted metrics, concentration and letter grade

mod asset;
mod grade;
mod aggregate;

pub use asset::{load_assets, load_assets_from_reader, value_weights, PortfolioAsset};
pub use grade::GradeScale;
pub use aggregate::{aggregate, concentration_risk, PortfolioMetrics, PortfolioRiskConfig, RiskComponents};
