//! Settlement Transaction Model
//!
//! Data carried across the transaction-collaborator boundary: the
//! caller-supplied funding source and signing key going in, the signed
//! settlement artifact coming out.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};

/// Unique settlement identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementId(String);

impl SettlementId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of a signed settlement transaction (hex-encoded double SHA-256)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied source of funds: a spendable output of a prior transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSource {
    /// Transaction the funds come from
    pub txid: String,

    /// Output index within that transaction
    pub vout: u32,

    /// Amount available to spend
    pub amount: Decimal,

    /// Locking script, hex-encoded
    pub script_hex: String,
}

impl FundingSource {
    pub fn new(
        txid: impl Into<String>,
        vout: u32,
        amount: Decimal,
        script_hex: impl Into<String>,
    ) -> Self {
        Self {
            txid: txid.into(),
            vout,
            amount,
            script_hex: script_hex.into(),
        }
    }
}

/// secp256k1 secret key authorizing the settlement
///
/// Never serialized; debug output is redacted.
#[derive(Clone)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| SettlementError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SettlementError::InvalidKey("expected 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// What the signer is asked to construct: funds in, advertised payee out
#[derive(Clone, Debug, Serialize)]
pub struct SettlementRequest {
    pub funding: FundingSource,

    /// Advertised payment target the settlement pays to
    pub destination: String,

    /// Drained session total
    pub amount: Decimal,

    pub asset_scale: u8,
    pub asset_code: Option<String>,
}

/// Signed settlement artifact
///
/// Constructed once per settlement and handed to the caller; the session
/// does not retain it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedSettlement {
    pub id: SettlementId,

    /// Payee the artifact is addressed to
    pub destination: String,

    /// Settled amount
    pub amount: Decimal,

    /// Serialized transaction payload with signature appended, hex-encoded
    pub raw_hex: String,

    /// Compact ECDSA signature over the payload digest, hex-encoded
    pub signature_hex: String,

    /// Stable hash of the signed transaction
    pub hash: TxHash,

    pub created_at: DateTime<Utc>,
}
