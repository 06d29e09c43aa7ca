//! Error Types

use thiserror::Error;

/// Result type alias for core session operations
pub type Result<T> = std::result::Result<T, MonetizeError>;

/// Core monetization errors
///
/// Capability absence is never an error; unsupported environments degrade to
/// documented fallback values instead.
#[derive(Error, Debug)]
pub enum MonetizeError {
    /// Payment pointer missing or empty
    #[error("payment pointer is required")]
    InvalidTarget,

    /// Progress notification carried an unusable amount string
    #[error("invalid progress amount: {0:?}")]
    InvalidAmount(String),
}
