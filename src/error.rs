//! Error types for the valuation engine
//!
//! Calculation failures are reported through [`ValuationError`]. Loading
//! configuration or asset files adds I/O and parse failures, reported
//! through [`LoadError`].

use thiserror::Error;

/// Result alias used by every calculation in the crate
pub type ValuationResult<T> = Result<T, ValuationError>;

/// Errors raised by the calculation engine.
///
/// Every variant is local to the operation that detects it. The engine
/// never retries; the caller decides whether to prompt, fall back or abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Discount or growth rate gives a degenerate discount factor (rate <= -100%)
    #[error("Invalid rate {rate}: rate must be finite and greater than -100%")]
    InvalidRate {
        /// The offending rate, as a fraction
        rate: f64,
    },

    /// Terminal cap rate does not exceed the terminal growth rate
    #[error("Invalid terminal spread: cap rate {cap_rate} must exceed growth rate {growth_rate}")]
    InvalidTerminalSpread {
        cap_rate: f64,
        growth_rate: f64,
    },

    /// Newton-Raphson did not meet its tolerance within the iteration budget
    #[error("IRR did not converge after {iterations} iterations (last estimate {last_rate})")]
    IrrNotConverged {
        /// Iterations performed before giving up
        iterations: usize,
        /// Last rate produced by the solver; never a valid answer
        last_rate: f64,
    },

    /// No usable data for the requested calculation
    #[error("Insufficient data: {context}")]
    InsufficientData {
        context: String,
    },

    /// A level, fraction or quantity outside its documented domain
    #[error("Input '{field}' out of range ({value}): {reason}")]
    OutOfRangeInput {
        field: String,
        value: f64,
        reason: String,
    },
}

impl ValuationError {
    pub(crate) fn out_of_range(field: &str, value: f64, reason: &str) -> Self {
        Self::OutOfRangeInput {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient(context: impl Into<String>) -> Self {
        Self::InsufficientData {
            context: context.into(),
        }
    }
}

/// Errors raised while loading configuration or asset files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File parsed but its contents fail validation
    #[error("Invalid data: {0}")]
    Invalid(#[from] ValuationError),
}
