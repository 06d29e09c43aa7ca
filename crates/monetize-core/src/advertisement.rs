//! Advertisement Management
//!
//! The page carries at most one payment-target declaration at a time. The
//! [`AdvertisementManager`] exclusively owns that declaration; every mutating
//! call checks existence first, because the host environment treats the
//! declaration as a singleton and duplicates are meaningless.

use std::sync::{Arc, Mutex};

use crate::error::{MonetizeError, Result};

/// Host-environment slot holding the single payment-target declaration
///
/// Injected so a fake in-memory sink substitutes for the host document in
/// tests.
pub trait AdvertisementSink: Send + Sync {
    /// Whether a declaration currently exists
    fn exists(&self) -> bool;

    /// Insert the declaration with the given content
    fn create(&self, content: &str);

    /// Content of the declaration, if one exists
    fn content(&self) -> Option<String>;

    /// Update the declaration's content in place
    fn set_content(&self, content: &str);

    /// Remove the declaration
    fn remove(&self);
}

/// In-memory advertisement sink (for development/testing)
pub struct MemoryAdvertisementSink {
    slot: Mutex<Option<String>>,
}

impl Default for MemoryAdvertisementSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdvertisementSink {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl AdvertisementSink for MemoryAdvertisementSink {
    fn exists(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    fn create(&self, content: &str) {
        *self.slot.lock().unwrap() = Some(content.to_string());
    }

    fn content(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    fn set_content(&self, content: &str) {
        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            *slot = Some(content.to_string());
        }
    }

    fn remove(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

/// Exclusive owner of the page's payment-target declaration
pub struct AdvertisementManager {
    sink: Arc<dyn AdvertisementSink>,
    target: Mutex<Option<String>>,
}

impl AdvertisementManager {
    pub fn new(sink: Arc<dyn AdvertisementSink>) -> Self {
        Self {
            sink,
            target: Mutex::new(None),
        }
    }

    /// Create the declaration exactly once and record the session target
    ///
    /// Idempotent create: when a declaration already exists the call is a
    /// no-op and the existing target stays active.
    pub fn publish(&self, target: &str) -> Result<()> {
        if target.trim().is_empty() {
            return Err(MonetizeError::InvalidTarget);
        }

        if self.sink.exists() {
            tracing::debug!(pointer = %target, "advertisement already present, publish ignored");
            return Ok(());
        }

        self.sink.create(target);
        *self.target.lock().unwrap() = Some(target.to_string());
        tracing::info!(pointer = %target, "advertisement published");
        Ok(())
    }

    /// Update the declaration's content in place
    ///
    /// In-place mutation avoids re-triggering the environment's capability
    /// wiring. When no declaration exists, one is created only if
    /// `create_if_absent` is set; otherwise the call is a no-op and the
    /// recorded target is unchanged.
    pub fn replace(&self, target: &str, create_if_absent: bool) -> Result<()> {
        if target.trim().is_empty() {
            return Err(MonetizeError::InvalidTarget);
        }

        if self.sink.exists() {
            self.sink.set_content(target);
            *self.target.lock().unwrap() = Some(target.to_string());
            tracing::info!(pointer = %target, "advertisement target replaced");
            return Ok(());
        }

        if create_if_absent {
            return self.publish(target);
        }

        tracing::debug!(pointer = %target, "no advertisement to replace");
        Ok(())
    }

    /// Remove the declaration; idempotent
    ///
    /// The recorded target survives removal so the session can still report
    /// the pointer it last paid to.
    pub fn clear(&self) {
        if self.sink.exists() {
            self.sink.remove();
            tracing::info!("advertisement removed");
        }
    }

    /// Whether a declaration currently exists
    pub fn is_active(&self) -> bool {
        self.sink.exists()
    }

    /// Target last recorded by a successful publish/replace
    pub fn target(&self) -> Option<String> {
        self.target.lock().unwrap().clone()
    }

    /// Content currently held by the host slot
    pub fn advertised(&self) -> Option<String> {
        self.sink.content()
    }
}
