//! Process-wide services, bundled for explicit injection

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use instant::Instant;

use crate::animation::FrameScheduler;
use crate::easing::EasingRegistry;
use crate::error::WidgetError;
use crate::monitor::LifecycleMonitor;
use crate::render::{RendererRegistry, Surface, Target};
use crate::time::TickTime;

/// Service bundle widgets are constructed against: frame scheduler,
/// easing and renderer registries, lifecycle monitor, named mount
/// surfaces, and the wall-clock epoch.
///
/// Production hosts build one per process and drive `run_frame` from
/// their render loop; tests build one per case for hermetic clocks
/// and queues. Cloning shares every service.
#[derive(Clone)]
pub struct WidgetRuntime {
    scheduler: FrameScheduler,
    easings: EasingRegistry,
    renderers: RendererRegistry,
    monitor: LifecycleMonitor,
    surfaces: Rc<RefCell<HashMap<String, Surface>>>,
    epoch: Instant,
}

impl WidgetRuntime {
    pub fn new() -> Self {
        log::debug!("widget runtime created");
        Self {
            scheduler: FrameScheduler::new(),
            easings: EasingRegistry::new(),
            renderers: RendererRegistry::new(),
            monitor: LifecycleMonitor::new(),
            surfaces: Rc::new(RefCell::new(HashMap::new())),
            epoch: Instant::now(),
        }
    }

    /// Wall-clock timestamp measured from runtime creation
    pub fn now(&self) -> TickTime {
        TickTime::from(self.epoch.elapsed())
    }

    /// Drive one frame pass with an explicit timestamp
    pub fn run_frame(&self, now: TickTime) -> Result<(), WidgetError> {
        self.scheduler.run_frame(now)
    }

    /// Drive one frame pass with the wall clock
    pub fn run_frame_now(&self) -> Result<(), WidgetError> {
        self.run_frame(self.now())
    }

    /// Register a mount surface under a name
    pub fn register_surface(&self, name: impl Into<String>, surface: Surface) {
        self.surfaces.borrow_mut().insert(name.into(), surface);
    }

    pub fn surface(&self, name: &str) -> Option<Surface> {
        self.surfaces.borrow().get(name).cloned()
    }

    /// Resolve a construction target to a concrete surface
    pub fn resolve_target(&self, target: &Target) -> Result<Surface, WidgetError> {
        match target {
            Target::Surface(surface) => Ok(surface.clone()),
            Target::Named(name) => {
                self.surface(name)
                    .ok_or_else(|| WidgetError::SurfaceNotFound { name: name.clone() })
            }
        }
    }

    #[inline]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    #[inline]
    pub fn easings(&self) -> &EasingRegistry {
        &self.easings
    }

    #[inline]
    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    #[inline]
    pub fn monitor(&self) -> &LifecycleMonitor {
        &self.monitor
    }
}

impl Default for WidgetRuntime {
    fn default() -> Self {
        Self::new()
    }
}
