//! Discounted cash flow engine: NPV, terminal value, IRR, payback

mod schedule;
mod irr;
mod engine;

pub use schedule::{CashFlow, CashFlowSchedule, DcfAssumptions};
pub use irr::IrrSolver;
pub use engine::{compute_dcf, compute_dcf_with, irr, payback_period, terminal_value, DcfResult};

// ============================================================================
// IRR solver defaults
// ============================================================================
// Newton-Raphson starts from 10% and stops once successive estimates move
// by less than one basis point.

/// Starting rate for the IRR iteration (10%)
pub const DEFAULT_IRR_GUESS: f64 = 0.10;

/// Convergence threshold on successive rate deltas
pub const DEFAULT_IRR_TOLERANCE: f64 = 1e-4;

/// Iteration budget before the solver reports non-convergence
pub const DEFAULT_IRR_MAX_ITERATIONS: usize = 100;

/// Shortest holding period callers are expected to submit (years)
pub const MIN_HOLDING_PERIOD: u32 = 3;

/// Longest holding period callers are expected to submit (years)
pub const MAX_HOLDING_PERIOD: u32 = 20;
