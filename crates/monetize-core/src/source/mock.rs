//! Mock Monetization Source
//!
//! For testing and demo purposes. A scripted in-memory stand-in for the
//! browser's payment channel: tests call [`MockMonetizationSource::emit`] to
//! push transitions at the session.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{MonetizationSource, SourceEvent, SourceListener, SourceState};
use crate::event::TransitionKind;

/// Scripted payment channel
pub struct MockMonetizationSource {
    supported: bool,
    state: Mutex<Option<SourceState>>,
    listeners: Mutex<HashMap<TransitionKind, Vec<SourceListener>>>,
}

impl MockMonetizationSource {
    /// A channel that exists and reports `pending`, like a fresh page load
    pub fn supported() -> Self {
        Self {
            supported: true,
            state: Mutex::new(Some(SourceState::Pending)),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// An environment without the capability
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            state: Mutex::new(None),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Deliver one transition: update the reported state, then invoke the
    /// listeners registered for that kind, in registration order
    pub fn emit(&self, event: &SourceEvent) {
        {
            let mut state = self.state.lock().unwrap();
            match event {
                SourceEvent::Pending => *state = Some(SourceState::Pending),
                SourceEvent::Start => *state = Some(SourceState::Started),
                SourceEvent::Stop => *state = Some(SourceState::Stopped),
                SourceEvent::Progress(_) => {}
            }
        }

        let mut listeners = self.listeners.lock().unwrap();
        if let Some(list) = listeners.get_mut(&event.kind()) {
            for listener in list.iter_mut() {
                listener(event);
            }
        }
    }
}

impl MonetizationSource for MockMonetizationSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn state(&self) -> Option<SourceState> {
        *self.state.lock().unwrap()
    }

    fn add_listener(&self, kind: TransitionKind, listener: SourceListener) {
        let mut listeners = self.listeners.lock().unwrap();
        listeners.entry(kind).or_default().push(listener);
    }
}
