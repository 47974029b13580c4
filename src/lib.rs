//! Valuation Engine - property valuation and ESG risk calculations
//!
//! This library provides:
//! - Discounting primitives and discounted cash flow analysis (NPV, IRR,
//!   terminal value, payback, profitability index)
//! - Income, cost and sales-comparison valuation with weighted reconciliation
//! - Composite climate/ESG risk scoring and risk-adjusted financing terms
//! - Portfolio aggregation with concentration risk and letter grades
//!
//! Every operation is a pure function of its inputs. Configuration is owned
//! by the caller and passed in explicitly.

pub mod error;
pub mod validation;
pub mod discounting;
pub mod dcf;
pub mod valuation;
pub mod risk;
pub mod portfolio;
pub mod config;

// Re-export commonly used types
pub use error::{LoadError, ValuationError, ValuationResult};
pub use validation::ValidationWarning;
pub use discounting::{discount_factor, present_value};
pub use dcf::{compute_dcf, CashFlowSchedule, DcfAssumptions, DcfResult, IrrSolver};
pub use valuation::{reconcile, value_asset, ApproachEstimate, ApproachInput, ApproachWeights, ReconciledValuation};
pub use risk::{financing_adjustment, score, FinancingAdjustment, RiskFactor, RiskProfile};
pub use portfolio::{aggregate, PortfolioAsset, PortfolioMetrics, PortfolioRiskConfig};
pub use config::EngineConfig;
