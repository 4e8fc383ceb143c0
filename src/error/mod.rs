use diffsol::error::DiffsolError;
use thiserror::Error;

use crate::simulator::solution::PairId;

#[derive(Error, Debug)]
pub enum PkError {
    /// An argument had the wrong shape or an out-of-range value
    #[error("Validation error: {0}")]
    Validation(String),

    /// The model parameters are incomplete or unrecognised for the delivery route
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Index {index} is out of bounds for a solution holding {len} pairs")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("No model/protocol pair is registered under {0}")]
    UnknownPair(PairId),

    /// The integrator failed or produced non-finite values
    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("ODE solver error: {0}")]
    Solver(#[from] DiffsolError),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PkError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        PkError::Validation(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        PkError::Configuration(msg.into())
    }

    /// Whether the error comes from addressing a pair that does not exist
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            PkError::IndexOutOfBounds { .. } | PkError::UnknownPair(_)
        )
    }

    /// Whether the error was raised by the numerical integration
    pub fn is_numerical(&self) -> bool {
        matches!(self, PkError::Numerical(_) | PkError::Solver(_))
    }
}
