//! Type-change notifications
//!
//! Hosts that reload or redefine types tell attached wrappers through an
//! [`InvalidationSource`]. Handles hold the wrapper weakly; a handle whose
//! wrapper is gone reports `false` and is pruned by [`InvalidationHub`].

use std::sync::Weak;

use hostwrap_sdk::RuntimeType;
use parking_lot::Mutex;

use crate::wrapper::BridgeInner;

/// Something that announces type changes to registered handles
pub trait InvalidationSource: Send + Sync {
    /// Start delivering notifications to `handle`
    fn register(&self, handle: InvalidationHandle);
}

/// Weak link from a notification source to one object wrapper
#[derive(Clone)]
pub struct InvalidationHandle {
    inner: Weak<BridgeInner>,
}

impl InvalidationHandle {
    pub(crate) fn new(inner: Weak<BridgeInner>) -> Self {
        Self { inner }
    }

    /// Forget everything cached about `ty`; `false` once the wrapper is gone
    pub fn invalidate(&self, ty: &RuntimeType) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.invalidate_type(ty);
                true
            }
            None => false,
        }
    }

    /// Forget everything; `false` once the wrapper is gone
    pub fn invalidate_all(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.clear_all();
                true
            }
            None => false,
        }
    }

    /// Whether the wrapper still exists
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl std::fmt::Debug for InvalidationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Fan-out source: forwards each change to every live registered wrapper
#[derive(Default)]
pub struct InvalidationHub {
    handles: Mutex<Vec<InvalidationHandle>>,
}

impl InvalidationHub {
    /// Create a hub with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce that `ty` changed; returns how many wrappers were notified
    pub fn type_changed(&self, ty: &RuntimeType) -> usize {
        let mut handles = self.handles.lock();
        handles.retain(|handle| handle.invalidate(ty));
        tracing::debug!(type_name = ty.name(), notified = handles.len(), "type changed");
        handles.len()
    }

    /// Announce that everything may have changed
    pub fn all_changed(&self) -> usize {
        let mut handles = self.handles.lock();
        handles.retain(InvalidationHandle::invalidate_all);
        handles.len()
    }

    /// Number of registered handles, including dead ones not yet pruned
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Check if no handle is registered
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

impl InvalidationSource for InvalidationHub {
    fn register(&self, handle: InvalidationHandle) {
        self.handles.lock().push(handle);
    }
}
