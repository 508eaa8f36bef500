//! Per-widget counters and the shared lifecycle registry

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::ids::WidgetId;
use crate::time::TickTime;

/// Render and tween counters for one widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WidgetMetrics {
    /// Draw calls issued
    pub frames_rendered: u64,
    /// Tweens begun
    pub tweens_started: u64,
    /// Tweens replaced before completion
    pub tweens_superseded: u64,
    /// Timestamp of the last frame-driven draw
    pub last_render_at: Option<TickTime>,
}

impl WidgetMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

struct MonitorInner {
    active: HashSet<WidgetId>,
    created_total: u64,
    destroyed_total: u64,
}

/// Registry of live widget ids. Cloning shares the counters; widgets
/// register at construction and unregister during destroy.
#[derive(Clone)]
pub struct LifecycleMonitor {
    inner: Rc<RefCell<MonitorInner>>,
}

impl LifecycleMonitor {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MonitorInner {
                active: HashSet::new(),
                created_total: 0,
                destroyed_total: 0,
            })),
        }
    }

    pub fn register(&self, id: WidgetId) {
        let mut inner = self.inner.borrow_mut();
        if inner.active.insert(id) {
            inner.created_total += 1;
        }
    }

    /// Idempotent; repeated unregistration counts once
    pub fn unregister(&self, id: WidgetId) {
        let mut inner = self.inner.borrow_mut();
        if inner.active.remove(&id) {
            inner.destroyed_total += 1;
        }
    }

    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.inner.borrow().active.contains(&id)
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    pub fn created_total(&self) -> u64 {
        self.inner.borrow().created_total
    }

    pub fn destroyed_total(&self) -> u64 {
        self.inner.borrow().destroyed_total
    }
}

impl Default for LifecycleMonitor {
    fn default() -> Self {
        Self::new()
    }
}
