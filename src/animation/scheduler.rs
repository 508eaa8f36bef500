//! Frame scheduler: one-shot callbacks coalesced per rendering tick

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::WidgetError;
use crate::ids::{FrameHandle, IdAllocator};
use crate::time::TickTime;

/// One-shot callback invoked with the frame timestamp
pub type FrameCallback = Box<dyn FnOnce(TickTime) -> Result<(), WidgetError>>;

struct SchedulerInner {
    queue: Vec<(FrameHandle, FrameCallback)>,
    ids: IdAllocator,
    frame_count: u64,
}

/// Shared frame pump driven by the host once per rendering tick.
/// Cloning shares the queue.
///
/// Each pass drains the batch registered before it; callbacks scheduled
/// during a pass land on the following tick, so no registrant can starve
/// the rest of the current batch.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                queue: Vec::new(),
                ids: IdAllocator::new(),
                frame_count: 0,
            })),
        }
    }

    /// Register a callback for the next tick
    pub fn schedule<F>(&self, callback: F) -> FrameHandle
    where
        F: FnOnce(TickTime) -> Result<(), WidgetError> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let handle = inner.ids.alloc_frame();
        inner.queue.push((handle, Box::new(callback)));
        handle
    }

    /// Remove a pending registration; returns whether one was found
    pub fn cancel(&self, handle: FrameHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.queue.len();
        inner.queue.retain(|(h, _)| *h != handle);
        inner.queue.len() != before
    }

    /// Number of callbacks waiting for the next tick
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Total passes run so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    /// Drain the current batch and run it in registration order.
    /// Every callback runs even if an earlier one failed; the first
    /// error is returned after the pass.
    pub fn run_frame(&self, now: TickTime) -> Result<(), WidgetError> {
        let batch = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_count += 1;
            std::mem::take(&mut inner.queue)
        };

        if !batch.is_empty() {
            log::trace!(
                "frame pass at {:.3}ms with {} callbacks",
                now.as_millis(),
                batch.len()
            );
        }

        let mut first_error = None;
        for (_, callback) in batch {
            if let Err(err) = callback(now) {
                log::debug!("frame callback failed: {err}");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
