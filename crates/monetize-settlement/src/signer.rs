//! Settlement Signing
//!
//! The transaction-construction collaborator boundary, plus a direct
//! secp256k1 reference implementation.

use chrono::Utc;
use secp256k1::{Message, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::transaction::{SettlementId, SettlementRequest, SignedSettlement, SigningKey, TxHash};

/// Transaction collaborator trait (Strategy pattern)
///
/// Implement this for each settlement backend. Construction or signing may
/// fail with a collaborator-defined error; the engine never retries.
pub trait SettlementSigner: Send + Sync {
    /// Construct and sign a settlement transaction
    fn build_and_sign(
        &self,
        request: &SettlementRequest,
        key: &SigningKey,
    ) -> anyhow::Result<SignedSettlement>;

    /// Backend name
    fn name(&self) -> &str;
}

/// Reference signer: canonical JSON payload, double SHA-256 digest, compact
/// ECDSA signature
pub struct EcdsaSettlementSigner {
    secp: Secp256k1<secp256k1::All>,
}

impl Default for EcdsaSettlementSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl EcdsaSettlementSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }
}

fn sha256d(bytes: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(bytes);
    Sha256::digest(first).into()
}

impl SettlementSigner for EcdsaSettlementSigner {
    fn build_and_sign(
        &self,
        request: &SettlementRequest,
        key: &SigningKey,
    ) -> anyhow::Result<SignedSettlement> {
        let payload = serde_json::to_vec(request)?;
        let digest = sha256d(&payload);

        let message = Message::from_digest_slice(&digest)?;
        let secret = SecretKey::from_slice(key.as_bytes())?;
        let signature = self.secp.sign_ecdsa(&message, &secret);
        let signature_bytes = signature.serialize_compact();

        // the hash commits to payload and signature together
        let mut signed = payload;
        signed.extend_from_slice(&signature_bytes);
        let hash = TxHash::from_digest(&sha256d(&signed));

        Ok(SignedSettlement {
            id: SettlementId::new(),
            destination: request.destination.clone(),
            amount: request.amount,
            raw_hex: hex::encode(&signed),
            signature_hex: hex::encode(signature_bytes),
            hash,
            created_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "secp256k1-ecdsa"
    }
}
