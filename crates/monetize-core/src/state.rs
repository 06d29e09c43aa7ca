//! Session State Projection
//!
//! The session owns no transition table; state is a read-through projection
//! over what the payment channel reports, with capability absence mapped to
//! a first-class `Unsupported` state.

use serde::{Deserialize, Serialize};

use crate::source::{MonetizationSource, SourceState};

/// Lifecycle state of the page's monetization session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// The environment has no payment channel; terminal
    Unsupported,
    Pending,
    Started,
    Stopped,
}

impl SessionState {
    /// Project the current state of a source
    pub fn of(source: &dyn MonetizationSource) -> Self {
        if !source.is_supported() {
            return Self::Unsupported;
        }
        source.state().map_or(Self::Unsupported, Self::from)
    }

    /// Human-readable state string surfaced to host pages
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unsupported => "Not enabled in this browser",
            SessionState::Pending => "pending",
            SessionState::Started => "started",
            SessionState::Stopped => "stopped",
        }
    }
}

impl From<SourceState> for SessionState {
    fn from(state: SourceState) -> Self {
        match state {
            SourceState::Pending => Self::Pending,
            SourceState::Started => Self::Started,
            SourceState::Stopped => Self::Stopped,
        }
    }
}
