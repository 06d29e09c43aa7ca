//! Content Visibility Hook
//!
//! Shows registered exclusive content while the payment stream runs and
//! hides it when the stream stops. The host page implements
//! [`MonetizedContent`] over whatever its rendering surface is; the hook
//! never touches the DOM itself.

use std::sync::{Arc, Mutex};

/// Host-page content whose visibility follows the payment stream
pub trait MonetizedContent: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Registered content elements, toggled on start/stop transitions
pub(crate) struct VisibilityHook {
    content: Mutex<Vec<Arc<dyn MonetizedContent>>>,
}

impl VisibilityHook {
    pub fn new() -> Self {
        Self {
            content: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, content: Arc<dyn MonetizedContent>) {
        self.content.lock().unwrap().push(content);
    }

    pub fn show_all(&self) {
        let content = self.content.lock().unwrap();
        for item in content.iter() {
            item.show();
        }
        tracing::debug!(count = content.len(), "monetized content shown");
    }

    pub fn hide_all(&self) {
        let content = self.content.lock().unwrap();
        for item in content.iter() {
            item.hide();
        }
        tracing::debug!(count = content.len(), "monetized content hidden");
    }
}
