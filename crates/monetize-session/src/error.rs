//! Session Error Types

use thiserror::Error;

/// Result type alias for the session facade
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session facade
///
/// Argument errors and settlement errors are kept distinct because their
/// recovery strategies differ: argument errors are caller bugs, settlement
/// construction failures may be retried with the accounting intact.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Monetize(#[from] monetize_core::MonetizeError),

    #[error(transparent)]
    Settlement(#[from] monetize_settlement::SettlementError),
}
