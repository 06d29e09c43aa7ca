//! Settlement Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, SettlementError>;

/// Settlement-related errors
#[derive(Error, Debug)]
pub enum SettlementError {
    /// Settlement attempted with no target advertised
    #[error("no active advertisement to settle against")]
    NoActiveAdvertisement,

    /// The transaction collaborator rejected construction or signing
    #[error("settlement construction failed: {0}")]
    ConstructionFailed(String),

    /// A settlement is already being constructed for this session
    #[error("settlement already in progress")]
    SettlementInProgress,

    /// Signing key unusable
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

impl SettlementError {
    /// Whether the caller may retry without losing accounting
    ///
    /// Construction failures leave the accumulated total and the
    /// advertisement intact, so a retry settles the same funds.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SettlementError::ConstructionFailed(_) | SettlementError::SettlementInProgress
        )
    }
}
