//! # monetize-session
//!
//! Page-facing facade over the web-monetize workspace: one
//! [`MonetizationSession`] per page, wiring the payment channel, the
//! advertisement slot, the accumulator, and the settlement engine together
//! behind the public API a host page consumes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use monetize_core::{MemoryAdvertisementSink, MockMonetizationSource};
//! use monetize_session::MonetizationSession;
//! use monetize_settlement::{FundingSource, SigningKey};
//!
//! let source = Arc::new(MockMonetizationSource::supported());
//! let session = MonetizationSession::new(source.clone(), Arc::new(MemoryAdvertisementSink::new()));
//!
//! session.start("$wallet.example/alice")?;
//! session.on_progress(|event| println!("paid {}", event.amount));
//!
//! // ... the channel streams payments while the visitor reads ...
//!
//! let hash = session.settle(&funding, &key)?;
//! ```
//!
//! All delivery is single-threaded and synchronous; see `monetize-core` for
//! the concurrency model.

mod content;
mod error;
mod frame;
mod session;

pub use content::MonetizedContent;
pub use error::{Result, SessionError};
pub use frame::{FrameSink, MemoryFrameSink};
pub use session::MonetizationSession;

pub use monetize_core::{
    AccumulatedTotal, ListenerId, MonetizationSource, MonetizeError, ProgressEvent, SessionState,
    SourceEvent, SourceState, TransitionKind,
};
pub use monetize_settlement::{
    FundingSource, SettlementError, SettlementSigner, SignedSettlement, SigningKey, TxHash,
};
