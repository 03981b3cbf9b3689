//! Core error types.

use thiserror::Error;

/// Errors raised while constructing or running the value generator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The starting balance was NaN or infinite.
    #[error("initial portfolio value must be finite, got {0}")]
    NonFiniteInitial(f64),
    /// The delta bound cannot describe a symmetric uniform range.
    #[error("invalid delta range: max delta {0} must be finite and positive")]
    InvalidDeltaRange(f64),
    /// A generator with a zero interval would spin.
    #[error("generator interval must be non-zero")]
    ZeroInterval,
    /// A tick produced a value that is no longer a finite number.
    #[error("portfolio value became non-finite ({previous} + {delta})")]
    NonFinite {
        /// Value before the failed tick.
        previous: f64,
        /// Delta that was drawn for the failed tick.
        delta: f64,
    },
    /// A credential field was blank.
    #[error("credential field `{0}` must not be empty")]
    EmptyCredential(&'static str),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
