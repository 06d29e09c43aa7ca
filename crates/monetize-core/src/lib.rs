//! # monetize-core
//!
//! Session state, payment accumulation, and advertisement management for a
//! single browser-page monetization session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     MonetizationSource                        │
//! │        (environment-pushed transitions, injected)             │
//! └───────┬──────────────────┬──────────────────┬────────────────┘
//!         │ state            │ progress         │ start/stop/pending
//! ┌───────▼───────┐  ┌───────▼───────┐  ┌───────▼───────────────┐
//! │ SessionState  │  │  Accumulator  │  │   ListenerRegistry    │
//! │ (projection)  │  │ (epoch latch) │  │ (ordered fan-out)     │
//! └───────────────┘  └───────────────┘  └───────────────────────┘
//!
//! ┌──────────────────────────────────────────────────────────────┐
//! │ AdvertisementManager ── AdvertisementSink (host document)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `MonetizationSource` and `AdvertisementSink` traits abstract the
//! browser's payment channel and the host document's declaration slot, so
//! scripted in-memory implementations substitute for both in tests.
//!
//! All delivery is single-threaded and synchronous: each transition callback
//! runs to completion before the next is dispatched, so the accumulator's
//! scale/code latch is well-defined and no mutation of the total races.

pub mod accumulator;
pub mod advertisement;
pub mod error;
pub mod event;
pub mod listener;
pub mod source;
pub mod state;

pub use accumulator::{AccumulatedTotal, Accumulator};
pub use advertisement::{AdvertisementManager, AdvertisementSink, MemoryAdvertisementSink};
pub use error::{MonetizeError, Result};
pub use event::{ProgressEvent, TransitionKind};
pub use listener::{ListenerId, ListenerRegistry, ProgressCallback, TransitionCallback};
pub use source::{MockMonetizationSource, MonetizationSource, SourceEvent, SourceListener, SourceState};
pub use state::SessionState;
