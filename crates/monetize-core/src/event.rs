//! Transition Kinds and Progress Events
//!
//! Typed forms of the notifications the payment channel pushes at the page.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MonetizeError, Result};

/// Kind of a session transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Start,
    Stop,
    Pending,
    Progress,
    Unsupported,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Start => "start",
            TransitionKind::Stop => "stop",
            TransitionKind::Pending => "pending",
            TransitionKind::Progress => "progress",
            TransitionKind::Unsupported => "unsupported",
        }
    }
}

/// Payload of a progress notification
///
/// The amount arrives as a decimal string denominated in `asset_scale`
/// fractional digits of `asset_code`, matching the shape the payment channel
/// delivers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Incremental amount paid, as delivered by the source
    pub amount: String,

    /// Decimal exponent the amount is denominated in
    pub asset_scale: u8,

    /// Currency/unit identifier
    pub asset_code: String,
}

impl ProgressEvent {
    pub fn new(amount: impl Into<String>, asset_scale: u8, asset_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            asset_scale,
            asset_code: asset_code.into(),
        }
    }

    /// Parse the delivered amount string
    ///
    /// Rejects unparsable and negative amounts; zero is a valid increment.
    pub fn amount_decimal(&self) -> Result<Decimal> {
        let value = Decimal::from_str(&self.amount)
            .map_err(|_| MonetizeError::InvalidAmount(self.amount.clone()))?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(MonetizeError::InvalidAmount(self.amount.clone()));
        }

        Ok(value)
    }
}
