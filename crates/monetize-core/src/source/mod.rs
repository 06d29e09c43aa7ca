//! Payment Notification Source
//!
//! Abstraction over the environment-provided payment channel. The browser
//! owns the real channel; tests drive the scripted [`MockMonetizationSource`].

mod mock;

pub use mock::MockMonetizationSource;

use serde::{Deserialize, Serialize};

use crate::event::{ProgressEvent, TransitionKind};

/// Session state as reported by the payment channel itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Pending,
    Started,
    Stopped,
}

/// A transition delivered by the payment channel
#[derive(Clone, Debug)]
pub enum SourceEvent {
    Pending,
    Start,
    Stop,
    Progress(ProgressEvent),
}

impl SourceEvent {
    pub fn kind(&self) -> TransitionKind {
        match self {
            SourceEvent::Pending => TransitionKind::Pending,
            SourceEvent::Start => TransitionKind::Start,
            SourceEvent::Stop => TransitionKind::Stop,
            SourceEvent::Progress(_) => TransitionKind::Progress,
        }
    }
}

/// Callback the source invokes on each transition it delivers
pub type SourceListener = Box<dyn FnMut(&SourceEvent) + Send>;

/// Payment-notification source trait (Strategy pattern)
///
/// Implement this over whatever surface the host environment exposes. The
/// source delivers transitions synchronously, one at a time, in the order
/// they occur; each listener runs to completion before the next dispatch.
pub trait MonetizationSource: Send + Sync {
    /// Whether the environment exposes the payment-notification capability
    ///
    /// Pure query, no side effects.
    fn is_supported(&self) -> bool;

    /// State currently reported by the channel; `None` when unsupported
    fn state(&self) -> Option<SourceState>;

    /// Register a listener for one transition kind
    ///
    /// Listeners for the same kind are invoked in registration order. The
    /// source only ever delivers start/stop/pending/progress; a listener
    /// registered for [`TransitionKind::Unsupported`] is never invoked.
    fn add_listener(&self, kind: TransitionKind, listener: SourceListener);
}
