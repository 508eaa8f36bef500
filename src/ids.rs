//! Identifiers for widgets, listeners, and scheduled frame callbacks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a widget instance, carried in events and contexts
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Monotonic allocator for ListenerId and FrameHandle.
/// IDs are opaque externally; holders only hand them back for removal.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_listener: u64,
    next_frame: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_frame(&mut self) -> FrameHandle {
        let id = FrameHandle(self.next_frame);
        self.next_frame = self.next_frame.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_listener(), ListenerId(0));
        assert_eq!(alloc.alloc_listener(), ListenerId(1));
        assert_eq!(alloc.alloc_frame(), FrameHandle(0));
        assert_eq!(alloc.alloc_frame(), FrameHandle(1));
    }

    #[test]
    fn widget_ids_unique() {
        assert_ne!(WidgetId::new(), WidgetId::new());
    }
}
