//! Embedded Frame Policy
//!
//! Grants or revokes the monetization allowance on frames the host page
//! embeds. Unknown frame ids are silently ignored, matching how a missing
//! element behaves in the host document.

use std::collections::HashMap;
use std::sync::Mutex;

/// Host-page surface controlling per-frame monetization allowance
pub trait FrameSink: Send + Sync {
    /// Returns `false` when the frame id is unknown to the page
    fn set_allowed(&self, frame_id: &str, allowed: bool) -> bool;
}

/// In-memory frame sink (for development/testing)
pub struct MemoryFrameSink {
    frames: Mutex<HashMap<String, bool>>,
}

impl Default for MemoryFrameSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFrameSink {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(HashMap::new()),
        }
    }

    /// Register a frame the page hosts; allowance starts revoked
    pub fn add_frame(&self, frame_id: impl Into<String>) {
        self.frames.lock().unwrap().insert(frame_id.into(), false);
    }

    pub fn is_allowed(&self, frame_id: &str) -> bool {
        self.frames.lock().unwrap().get(frame_id).copied().unwrap_or(false)
    }
}

impl FrameSink for MemoryFrameSink {
    fn set_allowed(&self, frame_id: &str, allowed: bool) -> bool {
        let mut frames = self.frames.lock().unwrap();
        match frames.get_mut(frame_id) {
            Some(slot) => {
                *slot = allowed;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowance_toggles_for_known_frames() {
        let sink = MemoryFrameSink::new();
        sink.add_frame("player");

        assert!(sink.set_allowed("player", true));
        assert!(sink.is_allowed("player"));
        assert!(sink.set_allowed("player", false));
        assert!(!sink.is_allowed("player"));
    }

    #[test]
    fn test_unknown_frame_is_ignored() {
        let sink = MemoryFrameSink::new();
        assert!(!sink.set_allowed("ghost", true));
        assert!(!sink.is_allowed("ghost"));
    }
}
