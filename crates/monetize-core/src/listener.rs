//! Listener Registry
//!
//! Fans session transitions out to host-page callbacks without exposing the
//! accumulator's or advertisement manager's internals. Delivery is
//! synchronous and in registration order; multiple registrations for the
//! same kind are all preserved and all invoked.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::{ProgressEvent, TransitionKind};

/// Host callback for start/stop/pending/unsupported transitions
pub type TransitionCallback = Box<dyn FnMut() + Send>;

/// Host callback receiving each progress notification
pub type ProgressCallback = Box<dyn FnMut(&ProgressEvent) + Send>;

/// Handle for removing a registration on long-lived pages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-kind ordered callback lists
pub struct ListenerRegistry {
    supported: bool,
    next_id: AtomicU64,
    transitions: Mutex<HashMap<TransitionKind, Vec<(ListenerId, TransitionCallback)>>>,
    progress: Mutex<Vec<(ListenerId, ProgressCallback)>>,
}

impl ListenerRegistry {
    /// `supported` gates registration: on an unsupported environment every
    /// registration silently no-ops, except [`TransitionKind::Unsupported`],
    /// whose callback fires immediately since that condition will never
    /// transition.
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            next_id: AtomicU64::new(1),
            transitions: Mutex::new(HashMap::new()),
            progress: Mutex::new(Vec::new()),
        }
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a callback for one transition kind
    ///
    /// Returns `None` when the registration was a no-op (or an eager fire).
    pub fn on(&self, kind: TransitionKind, callback: TransitionCallback) -> Option<ListenerId> {
        if !self.supported {
            if kind == TransitionKind::Unsupported {
                let mut callback = callback;
                callback();
            }
            return None;
        }

        let id = self.allocate_id();
        let mut transitions = self.transitions.lock().unwrap();
        transitions.entry(kind).or_default().push((id, callback));
        Some(id)
    }

    /// Register a callback receiving each progress notification
    pub fn on_progress(&self, callback: ProgressCallback) -> Option<ListenerId> {
        if !self.supported {
            return None;
        }

        let id = self.allocate_id();
        self.progress.lock().unwrap().push((id, callback));
        Some(id)
    }

    /// Drop a registration; returns whether one was removed
    pub fn remove(&self, id: ListenerId) -> bool {
        {
            let mut progress = self.progress.lock().unwrap();
            let before = progress.len();
            progress.retain(|(listener_id, _)| *listener_id != id);
            if progress.len() < before {
                return true;
            }
        }

        let mut transitions = self.transitions.lock().unwrap();
        for list in transitions.values_mut() {
            let before = list.len();
            list.retain(|(listener_id, _)| *listener_id != id);
            if list.len() < before {
                return true;
            }
        }
        false
    }

    /// Invoke every callback registered for `kind`, in registration order
    pub fn emit(&self, kind: TransitionKind) {
        let mut transitions = self.transitions.lock().unwrap();
        if let Some(list) = transitions.get_mut(&kind) {
            for (_, callback) in list.iter_mut() {
                callback();
            }
        }
    }

    /// Deliver a progress notification: typed progress callbacks first, then
    /// any plain callbacks registered under [`TransitionKind::Progress`]
    pub fn emit_progress(&self, event: &ProgressEvent) {
        {
            let mut progress = self.progress.lock().unwrap();
            for (_, callback) in progress.iter_mut() {
                callback(event);
            }
        }
        self.emit(TransitionKind::Progress);
    }
}
