//! # monetize-settlement
//!
//! Settlement transaction construction and signing for web-monetize.
//!
//! On session teardown the accumulated total is converted into a signed
//! transaction addressed to the advertised payment target:
//!
//! ```text
//! ┌─────────────────┐   target    ┌──────────────────┐
//! │ Advertisement   │────────────▶│                  │
//! │ Manager         │             │ SettlementEngine │──▶ SignedSettlement
//! ├─────────────────┤   total     │                  │      (hash, raw tx)
//! │ Accumulator     │────────────▶│  sign, then      │
//! └─────────────────┘             │  commit drain    │
//!        funding, key ───────────▶└────────┬─────────┘
//!                                          │
//!                                 ┌────────▼─────────┐
//!                                 │ SettlementSigner │
//!                                 │ (collaborator)   │
//!                                 └──────────────────┘
//! ```
//!
//! The [`SettlementSigner`] trait is the transaction-collaborator boundary;
//! [`EcdsaSettlementSigner`] is a direct secp256k1 reference implementation.
//! The engine only commits the accumulator drain and advertisement removal
//! after signing succeeds, so a collaborator failure never loses accounting.

mod engine;
mod error;
mod signer;
mod transaction;

pub use engine::SettlementEngine;
pub use error::{Result, SettlementError};
pub use signer::{EcdsaSettlementSigner, SettlementSigner};
pub use transaction::{
    FundingSource, SettlementId, SettlementRequest, SignedSettlement, SigningKey, TxHash,
};
