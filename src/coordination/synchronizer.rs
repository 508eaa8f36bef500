//! Mirror values across widget instances

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::animation::FrameScheduler;
use crate::error::WidgetError;
use crate::ids::FrameHandle;
use crate::runtime::WidgetRuntime;
use crate::time::TickTime;
use crate::widget::ProgressWidget;

/// How a sync pass resolves the value it applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Copy the source widget's value to every other member
    MasterSlave,
    Average,
    Max,
    Min,
}

impl SyncMode {
    pub fn name(&self) -> &str {
        match self {
            SyncMode::MasterSlave => "master-slave",
            SyncMode::Average => "average",
            SyncMode::Max => "max",
            SyncMode::Min => "min",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "master-slave" => Some(SyncMode::MasterSlave),
            "average" => Some(SyncMode::Average),
            "max" => Some(SyncMode::Max),
            "min" => Some(SyncMode::Min),
            _ => None,
        }
    }

    fn aggregate(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            SyncMode::Average => Some(values.iter().sum::<f64>() / values.len() as f64),
            SyncMode::Max => values.iter().copied().reduce(f64::max),
            SyncMode::Min => values.iter().copied().reduce(f64::min),
            SyncMode::MasterSlave => None,
        }
    }
}

type TransformFn = Box<dyn FnMut(f64, &str) -> f64>;

struct PendingSync {
    handle: FrameHandle,
    // Fixed by the first frame timestamp the registration observes
    deadline: Option<TickTime>,
    source: Option<String>,
}

struct SyncInner {
    entries: Vec<(String, ProgressWidget)>,
    mode: SyncMode,
    delay: Option<TickTime>,
    transform: Option<TransformFn>,
    syncing: bool,
    pending: Option<PendingSync>,
}

/// Keeps a set of widgets showing the same (or an aggregated) value.
///
/// Members are ordered by insertion; `master-slave` mode uses the first
/// member as its source unless [`sync_from`](Self::sync_from) names one.
/// Values propagate unanimated. A sync requested while one is applying
/// is dropped, which keeps listener-driven mirroring from feeding back.
pub struct ProgressSynchronizer {
    inner: Rc<RefCell<SyncInner>>,
    scheduler: FrameScheduler,
}

impl ProgressSynchronizer {
    pub fn new(runtime: &WidgetRuntime, mode: SyncMode) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SyncInner {
                entries: Vec::new(),
                mode,
                delay: None,
                transform: None,
                syncing: false,
                pending: None,
            })),
            scheduler: runtime.scheduler().clone(),
        }
    }

    /// Debounce propagation: a sync request waits this long (measured
    /// from the first frame after the request) and is replaced by any
    /// newer request arriving in the meantime.
    pub fn set_delay_ms(&self, delay: u64) {
        self.inner.borrow_mut().delay =
            Some(TickTime::from_nanos(delay.saturating_mul(1_000_000)));
    }

    pub fn clear_delay(&self) {
        self.inner.borrow_mut().delay = None;
    }

    /// Per-target value hook applied before each member is set
    pub fn set_transform<F>(&self, transform: F)
    where
        F: FnMut(f64, &str) -> f64 + 'static,
    {
        self.inner.borrow_mut().transform = Some(Box::new(transform));
    }

    pub fn clear_transform(&self) {
        self.inner.borrow_mut().transform = None;
    }

    pub fn mode(&self) -> SyncMode {
        self.inner.borrow().mode
    }

    pub fn set_mode(&self, mode: SyncMode) {
        self.inner.borrow_mut().mode = mode;
    }

    pub fn add(&self, id: impl Into<String>, widget: &ProgressWidget) {
        let id = id.into();
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.entries.iter_mut().find(|(name, _)| *name == id) {
            entry.1 = widget.clone();
            return;
        }
        inner.entries.push((id, widget.clone()));
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|(name, _)| name != id);
        inner.entries.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.borrow().entries.iter().any(|(name, _)| name == id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Sync using the first member as source (master-slave) or the
    /// configured aggregate.
    pub fn sync(&self) -> Result<(), WidgetError> {
        self.request_sync(None)
    }

    /// Sync with an explicit source member
    pub fn sync_from(&self, id: &str) -> Result<(), WidgetError> {
        self.request_sync(Some(id.to_string()))
    }

    fn request_sync(&self, source: Option<String>) -> Result<(), WidgetError> {
        let delayed = {
            let inner = self.inner.borrow();
            if inner.syncing || inner.entries.is_empty() {
                return Ok(());
            }
            inner.delay.is_some()
        };
        if delayed {
            self.schedule_debounced(source);
            Ok(())
        } else {
            Self::apply_from(&self.inner, source.as_deref())
        }
    }

    fn schedule_debounced(&self, source: Option<String>) {
        let mut inner = self.inner.borrow_mut();
        if let Some(pending) = inner.pending.take() {
            self.scheduler.cancel(pending.handle);
        }
        let weak = Rc::downgrade(&self.inner);
        let scheduler = self.scheduler.clone();
        let handle = self
            .scheduler
            .schedule(move |now| Self::debounce_tick(&weak, &scheduler, now));
        inner.pending = Some(PendingSync {
            handle,
            deadline: None,
            source,
        });
    }

    fn debounce_tick(
        weak: &Weak<RefCell<SyncInner>>,
        scheduler: &FrameScheduler,
        now: TickTime,
    ) -> Result<(), WidgetError> {
        let Some(rc) = weak.upgrade() else {
            return Ok(());
        };
        let due = {
            let mut guard = rc.borrow_mut();
            let inner = &mut *guard;
            let delay = inner.delay.unwrap_or(TickTime::zero());
            let Some(pending) = inner.pending.as_mut() else {
                return Ok(());
            };
            let deadline = *pending.deadline.get_or_insert(now.add(delay));
            if now < deadline {
                let weak = weak.clone();
                let chained = scheduler.clone();
                pending.handle =
                    scheduler.schedule(move |next| Self::debounce_tick(&weak, &chained, next));
                None
            } else {
                inner.pending.take().map(|pending| pending.source)
            }
        };
        match due {
            None => Ok(()),
            Some(source) => Self::apply_from(&rc, source.as_deref()),
        }
    }

    fn apply_from(
        inner_rc: &Rc<RefCell<SyncInner>>,
        source: Option<&str>,
    ) -> Result<(), WidgetError> {
        let (entries, mode, mut transform) = {
            let mut inner = inner_rc.borrow_mut();
            if inner.syncing || inner.entries.is_empty() {
                return Ok(());
            }
            inner.syncing = true;
            (inner.entries.clone(), inner.mode, inner.transform.take())
        };

        log::trace!("sync pass: mode {} over {} widgets", mode.name(), entries.len());
        let result = Self::run_sync(&entries, mode, &mut transform, source);

        let mut inner = inner_rc.borrow_mut();
        inner.syncing = false;
        // Keep any transform installed by a listener mid-sync
        if inner.transform.is_none() {
            inner.transform = transform;
        }
        result
    }

    fn run_sync(
        entries: &[(String, ProgressWidget)],
        mode: SyncMode,
        transform: &mut Option<TransformFn>,
        source: Option<&str>,
    ) -> Result<(), WidgetError> {
        if mode == SyncMode::MasterSlave {
            let found = entries
                .iter()
                .find(|(id, _)| Some(id.as_str()) == source)
                .or_else(|| entries.first());
            let Some((source_id, source_widget)) = found else {
                return Ok(());
            };
            let value = source_widget.value();
            for (id, widget) in entries {
                if id == source_id {
                    continue;
                }
                let applied = match transform {
                    Some(f) => f(value, id),
                    None => value,
                };
                widget.set_value_with(applied, false)?;
            }
            return Ok(());
        }

        let values: Vec<f64> = entries.iter().map(|(_, widget)| widget.value()).collect();
        let Some(aggregate) = mode.aggregate(&values) else {
            return Ok(());
        };
        for (id, widget) in entries {
            let applied = match transform {
                Some(f) => f(aggregate, id),
                None => aggregate,
            };
            widget.set_value_with(applied, false)?;
        }
        Ok(())
    }
}
