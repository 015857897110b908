//! Error types for shape reduction
//!
//! Reduction errors never leave the cache: they are logged and the source
//! shape is drawn instead.

use thiserror::Error;

/// Reasons a precision reduction step can fail
#[derive(Debug, Error)]
pub enum SimplifyError {
    /// The input contained NaN or infinite coordinates
    #[error("geometry contains non-finite coordinates")]
    NonFinite,

    /// The grid size was not a positive finite number
    #[error("invalid grid size {0}")]
    InvalidGrid(f64),

    /// The boolean-op clean-up could not resolve the snapped rings
    #[error("topology clean-up failed: {0}")]
    Topology(String),
}

pub type SimplifyResult<T> = Result<T, SimplifyError>;
