//! Event system for widget notifications

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::ids::{IdAllocator, ListenerId, WidgetId};
use crate::time::TickTime;

/// The closed set of widget events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Value left its resting minimum
    Start,
    /// Per-frame value during a tween
    Update,
    /// A value change settled
    Change,
    /// The value settled at the maximum
    Complete,
    /// The widget was torn down
    Destroy,
}

impl EventKind {
    /// Get the name of this event kind
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Update => "update",
            Self::Change => "change",
            Self::Complete => "complete",
            Self::Destroy => "destroy",
        }
    }

    /// Look up a kind by name
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "update" => Some(Self::Update),
            "change" => Some(Self::Change),
            "complete" => Some(Self::Complete),
            "destroy" => Some(Self::Destroy),
            _ => None,
        }
    }

    /// Check if this kind reports a value transition
    #[inline]
    pub fn is_value_event(&self) -> bool {
        matches!(self, Self::Update | Self::Change)
    }

    /// Check if this kind marks a lifecycle boundary
    #[inline]
    pub fn is_lifecycle_event(&self) -> bool {
        matches!(self, Self::Start | Self::Complete | Self::Destroy)
    }
}

/// Widget event with associated data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetEvent {
    /// Kind of event
    pub kind: EventKind,
    /// Widget this event relates to
    pub widget: WidgetId,
    /// Value carried by the event
    pub value: f64,
    /// Frame timestamp when the event occurred, if one was in scope
    pub at: Option<TickTime>,
}

impl WidgetEvent {
    /// Create a new widget event
    pub fn new(kind: EventKind, widget: WidgetId, value: f64) -> Self {
        Self {
            kind,
            widget,
            value,
            at: None,
        }
    }

    /// Set the frame timestamp
    #[inline]
    pub fn with_timestamp(mut self, at: TickTime) -> Self {
        self.at = Some(at);
        self
    }
}

/// Listener callback signature; a returned error aborts the emission
pub type ListenerFn = dyn FnMut(&WidgetEvent) -> Result<(), WidgetError>;

/// Shared handle to a registered listener
pub type SharedListener = Rc<RefCell<ListenerFn>>;

/// Synchronous per-kind listener registry.
///
/// `emit` fires listeners immediately in registration order. Owners that
/// keep the emitter behind a shared cell should `snapshot` under their
/// borrow and `deliver` after releasing it, so listeners may re-enter.
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<EventKind, Vec<(ListenerId, SharedListener)>>,
    ids: IdAllocator,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        let id = self.ids.alloc_listener();
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    /// Remove a listener; returns whether one was removed
    pub fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        match self.listeners.get_mut(&kind) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|(entry_id, _)| *entry_id != id);
                entries.len() != before
            }
            None => false,
        }
    }

    /// Drop every registered listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Clone the current listener list for one kind.
    /// Registrations made after the snapshot do not see the emission.
    pub fn snapshot(&self, kind: EventKind) -> Vec<SharedListener> {
        self.listeners
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Invoke a snapshot in order; the first error aborts the rest
    pub fn deliver(listeners: &[SharedListener], event: &WidgetEvent) -> Result<(), WidgetError> {
        for listener in listeners {
            (listener.borrow_mut())(event).map_err(|err| WidgetError::ListenerFailed {
                event: event.kind.name().to_string(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }

    /// Snapshot and deliver in one step
    pub fn emit(&self, event: &WidgetEvent) -> Result<(), WidgetError> {
        log::trace!(
            "emit {} for widget {} (value {})",
            event.kind.name(),
            event.widget,
            event.value
        );
        Self::deliver(&self.snapshot(event.kind), event)
    }
}

/// Event recorder for tests; clones share one buffer
#[derive(Clone, Default)]
pub struct CollectingListener {
    events: Rc<RefCell<Vec<WidgetEvent>>>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a listener closure that records into this collector
    pub fn listener(&self) -> impl FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static {
        let events = Rc::clone(&self.events);
        move |event| {
            events.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    pub fn events(&self) -> Vec<WidgetEvent> {
        self.events.borrow().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn values(&self) -> Vec<f64> {
        self.events.borrow().iter().map(|e| e.value).collect()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(|e| e.kind).collect()
    }

    pub fn events_of(&self, kind: EventKind) -> Vec<WidgetEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
