//! Multi-approach property valuation
//!
//! Income, cost and sales-comparison estimates are computed independently
//! and blended by configured weights, renormalized over the approaches that
//! have data.

mod approach;
mod benchmarks;
mod reconcile;

pub use approach::{ApproachEstimate, ApproachInput, ApproachKind, Comparable};
pub use benchmarks::{BenchmarkRates, BenchmarkTable, CostInputs, IncomeInputs};
pub use reconcile::{reconcile, value_asset, ApproachWeights, ReconciledValuation};
