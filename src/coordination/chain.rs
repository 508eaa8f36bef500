//! Run widgets one after another

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::WidgetError;
use crate::event::EventKind;
use crate::ids::ListenerId;
use crate::widget::ProgressWidget;

struct ChainStep {
    id: String,
    widget: ProgressWidget,
    target: f64,
}

type StepCallback = Box<dyn FnMut(usize, &str)>;
type CompleteCallback = Box<dyn FnMut()>;

struct ChainInner {
    steps: Vec<ChainStep>,
    position: Option<usize>,
    running: bool,
    // Change listener attached to the currently running step
    listener: Option<(usize, ListenerId)>,
    on_step: Option<StepCallback>,
    on_complete: Option<CompleteCallback>,
}

/// Sequences widgets: each step drives its widget to a target value and
/// the next step starts only once that value has settled.
///
/// Steps run in insertion order. A step whose widget already rests at
/// the (clamped) target completes immediately. `stop` halts without
/// reverting; `reset` halts and zeroes every chained widget. Both leave
/// the chain restartable.
pub struct ProgressChain {
    inner: Rc<RefCell<ChainInner>>,
}

impl ProgressChain {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChainInner {
                steps: Vec::new(),
                position: None,
                running: false,
                listener: None,
                on_step: None,
                on_complete: None,
            })),
        }
    }

    pub fn add(&self, id: impl Into<String>, widget: &ProgressWidget, target: f64) {
        self.inner.borrow_mut().steps.push(ChainStep {
            id: id.into(),
            widget: widget.clone(),
            target,
        });
    }

    /// Called after each step settles, with the step index and id
    pub fn on_step<F>(&self, callback: F)
    where
        F: FnMut(usize, &str) + 'static,
    {
        self.inner.borrow_mut().on_step = Some(Box::new(callback));
    }

    /// Called once after the last step settles
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.inner.borrow_mut().on_complete = Some(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().steps.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    /// Index of the step currently in flight
    pub fn position(&self) -> Option<usize> {
        self.inner.borrow().position
    }

    /// Begin at step zero. Ignored while already running; an empty
    /// chain completes immediately.
    pub fn start(&self) -> Result<(), WidgetError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.running {
                return Ok(());
            }
            inner.running = true;
            inner.position = Some(0);
        }
        log::debug!("chain started with {} steps", self.len());
        Self::run_step(&self.inner, 0)
    }

    /// Halt without reverting any widget
    pub fn stop(&self) {
        let detach = {
            let mut inner = self.inner.borrow_mut();
            inner.running = false;
            inner.position = None;
            inner
                .listener
                .take()
                .and_then(|(index, listener)| {
                    inner
                        .steps
                        .get(index)
                        .map(|step| (step.widget.clone(), listener))
                })
        };
        if let Some((widget, listener)) = detach {
            widget.off(EventKind::Change, listener);
        }
    }

    /// Halt and snap every chained widget back to zero
    pub fn reset(&self) -> Result<(), WidgetError> {
        self.stop();
        let widgets: Vec<ProgressWidget> = self
            .inner
            .borrow()
            .steps
            .iter()
            .map(|step| step.widget.clone())
            .collect();
        for widget in widgets {
            widget.set_value_with(0.0, false)?;
        }
        Ok(())
    }

    fn run_step(inner_rc: &Rc<RefCell<ChainInner>>, index: usize) -> Result<(), WidgetError> {
        let step = {
            let inner = inner_rc.borrow();
            if !inner.running {
                return Ok(());
            }
            inner
                .steps
                .get(index)
                .map(|step| (step.widget.clone(), step.target))
        };

        let Some((widget, target)) = step else {
            return Self::finish(inner_rc);
        };

        let options = widget.options();
        let clamped = target.clamp(options.min, options.max);
        if widget.value() == clamped {
            return Self::advance(inner_rc, index);
        }

        // Listen before kicking the tween so synchronous settles count
        let weak = Rc::downgrade(inner_rc);
        let listener = widget.on(EventKind::Change, move |event| {
            Self::on_step_change(&weak, index, clamped, event.value)
        });
        inner_rc.borrow_mut().listener = Some((index, listener));
        widget.set_value(target)
    }

    fn on_step_change(
        weak: &Weak<RefCell<ChainInner>>,
        index: usize,
        target: f64,
        value: f64,
    ) -> Result<(), WidgetError> {
        let Some(rc) = weak.upgrade() else {
            return Ok(());
        };
        let settled = {
            let inner = rc.borrow();
            inner.running && inner.position == Some(index) && value == target
        };
        if settled {
            Self::advance(&rc, index)?;
        }
        Ok(())
    }

    fn advance(inner_rc: &Rc<RefCell<ChainInner>>, index: usize) -> Result<(), WidgetError> {
        let detach = {
            let mut inner = inner_rc.borrow_mut();
            inner
                .listener
                .take()
                .and_then(|(step_index, listener)| {
                    inner
                        .steps
                        .get(step_index)
                        .map(|step| (step.widget.clone(), listener))
                })
        };
        if let Some((widget, listener)) = detach {
            widget.off(EventKind::Change, listener);
        }

        let (callback, id) = {
            let mut inner = inner_rc.borrow_mut();
            let id = inner.steps.get(index).map(|step| step.id.clone());
            (inner.on_step.take(), id)
        };
        if let Some(mut callback) = callback {
            if let Some(id) = &id {
                callback(index, id);
            }
            let mut inner = inner_rc.borrow_mut();
            if inner.on_step.is_none() {
                inner.on_step = Some(callback);
            }
        }

        let next = {
            let mut inner = inner_rc.borrow_mut();
            // A step callback may have stopped the chain
            if !inner.running {
                return Ok(());
            }
            let next = index + 1;
            inner.position = Some(next);
            next
        };
        Self::run_step(inner_rc, next)
    }

    fn finish(inner_rc: &Rc<RefCell<ChainInner>>) -> Result<(), WidgetError> {
        let callback = {
            let mut inner = inner_rc.borrow_mut();
            inner.running = false;
            inner.position = None;
            inner.on_complete.take()
        };
        log::debug!("chain complete");
        if let Some(mut callback) = callback {
            callback();
            let mut inner = inner_rc.borrow_mut();
            if inner.on_complete.is_none() {
                inner.on_complete = Some(callback);
            }
        }
        Ok(())
    }
}

impl Default for ProgressChain {
    fn default() -> Self {
        Self::new()
    }
}
