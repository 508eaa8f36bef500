//! The progress widget: value state, hook and middleware pipelines,
//! event emission, tweened rendering, and lifecycle teardown.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::animation::{AnimationController, TweenSpec, TweenStart};
use crate::config::{ConfigManager, OptionsPatch, WidgetOptions};
use crate::error::WidgetError;
use crate::event::{EventEmitter, EventKind, WidgetEvent};
use crate::ids::{FrameHandle, ListenerId, WidgetId};
use crate::monitor::WidgetMetrics;
use crate::pipeline::{MiddlewareManager, PluginContext, PluginManager, ValueChange, WidgetPlugin};
use crate::render::{LabelFormatter, RenderFrame, ShapeRenderer, Surface, Target};
use crate::runtime::WidgetRuntime;
use crate::time::TickTime;

use super::builder::WidgetBuilder;

/// Everything a widget owns. Lives behind the handle's `Rc<RefCell>`;
/// methods here run under a single borrow and never call listeners or
/// hooks that could re-enter the widget.
pub(crate) struct WidgetCore {
    id: WidgetId,
    runtime: WidgetRuntime,
    surface: Surface,
    config: ConfigManager,
    events: EventEmitter,
    plugins: PluginManager,
    middleware: MiddlewareManager,
    animator: AnimationController,
    renderer: Box<dyn ShapeRenderer>,
    formatter: LabelFormatter,
    metrics: WidgetMetrics,
    value: f64,
    frame_pending: Option<FrameHandle>,
    // Original value of an in-flight tween, for the after hook
    tween_from: Option<f64>,
    destroyed: bool,
}

impl WidgetCore {
    fn render_label(&mut self) -> Option<String> {
        let percent = self.config.percentage(Some(self.value));
        let options = self.config.options();
        if !options.show_text {
            return None;
        }
        let (format, min, max) = (options.format.clone(), options.min, options.max);
        self.formatter.configure(&format, min, max);
        Some(self.formatter.format(self.value, percent))
    }

    fn draw(&mut self, at: Option<TickTime>) -> Result<(), WidgetError> {
        let frame = RenderFrame {
            value: self.value,
            percent: self.config.percentage(Some(self.value)),
            label: self.render_label(),
        };
        self.renderer.draw(&self.surface, &frame, self.config.options())?;
        self.metrics.frames_rendered += 1;
        if at.is_some() {
            self.metrics.last_render_at = at;
        }
        Ok(())
    }

    fn stop_stepping(&mut self) {
        self.animator.stop();
        self.tween_from = None;
        if let Some(handle) = self.frame_pending.take() {
            self.runtime.scheduler().cancel(handle);
        }
    }

    fn apply_root_attrs(&self) {
        let options = self.config.options();
        match &options.theme {
            Some(theme) => self.surface.set_attr("theme", theme),
            None => self.surface.remove_attr("theme"),
        }
        match &options.class_name {
            Some(class) => self.surface.set_attr("class", class),
            None => self.surface.remove_attr("class"),
        }
    }

    fn clear_root_attrs(&self) {
        self.surface.remove_attr("theme");
        self.surface.remove_attr("class");
    }
}

impl Drop for WidgetCore {
    fn drop(&mut self) {
        // Handles dropped without destroy() still leave the monitor clean
        if !self.destroyed {
            self.runtime.monitor().unregister(self.id);
        }
    }
}

/// How a resolved set-value call gets applied once the pipeline has run
enum Apply {
    Unchanged,
    Instant { from: f64, to: f64, fire_start: bool },
    Tween { from: f64, fire_start: bool },
}

enum StepOutcome {
    Running { value: f64 },
    Finished { from: f64, value: f64 },
}

/// Shared handle to a progress widget.
///
/// Cloning is cheap and every clone drives the same instance. All state
/// sits behind a `RefCell`, so the widget is single threaded by
/// construction, and listeners called during an operation observe the
/// widget already updated for that operation.
#[derive(Clone)]
pub struct ProgressWidget {
    core: Rc<RefCell<WidgetCore>>,
}

impl std::fmt::Debug for ProgressWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressWidget").finish_non_exhaustive()
    }
}

impl ProgressWidget {
    /// Create a widget on a target surface with the given options.
    ///
    /// Mounts the shape markup and draws the initial value before
    /// returning. Fails if the target, easing, or shape cannot be
    /// resolved, or if the options are inconsistent.
    pub fn new(
        runtime: &WidgetRuntime,
        target: impl Into<Target>,
        options: WidgetOptions,
    ) -> Result<Self, WidgetError> {
        Self::construct(
            runtime,
            target.into(),
            options,
            PluginManager::new(),
            MiddlewareManager::new(),
            None,
            EventEmitter::new(),
        )
    }

    pub fn builder(runtime: &WidgetRuntime) -> WidgetBuilder {
        WidgetBuilder::new(runtime)
    }

    pub(crate) fn construct(
        runtime: &WidgetRuntime,
        target: Target,
        mut options: WidgetOptions,
        plugins: PluginManager,
        middleware: MiddlewareManager,
        renderer_override: Option<Box<dyn ShapeRenderer>>,
        events: EventEmitter,
    ) -> Result<Self, WidgetError> {
        let surface = runtime.resolve_target(&target)?;

        let mut plugins = plugins;
        plugins.run_before_init(&mut options)?;

        let config = ConfigManager::new(options);
        config.validate()?;
        let value = config.normalize(config.options().value);

        let renderer = match renderer_override {
            Some(renderer) => renderer,
            None => runtime.renderers().create(&config.options().shape)?,
        };

        // Easing is resolved per tween, but an unknown configured name
        // should fail here rather than on the first animated set
        runtime.easings().resolve(&config.options().easing)?;

        let id = WidgetId::new();
        let core = WidgetCore {
            id,
            runtime: runtime.clone(),
            surface,
            config,
            events,
            plugins,
            middleware,
            animator: AnimationController::new(),
            renderer,
            formatter: LabelFormatter::default(),
            metrics: WidgetMetrics::new(),
            value,
            frame_pending: None,
            tween_from: None,
            destroyed: false,
        };
        let widget = Self {
            core: Rc::new(RefCell::new(core)),
        };

        {
            let mut guard = widget.core.borrow_mut();
            let core = &mut *guard;
            core.config.store_value(value);
            core.apply_root_attrs();

            let ctx = PluginContext { widget: id, value };
            core.plugins.run_after_init(&ctx)?;

            core.renderer.mount(&core.surface, core.config.options())?;
            core.draw(None)?;
            core.runtime.monitor().register(id);
        }

        log::debug!("widget {id} created at value {value}");
        Ok(widget)
    }

    // ----- accessors --------------------------------------------------

    pub fn id(&self) -> WidgetId {
        self.core.borrow().id
    }

    pub fn value(&self) -> f64 {
        self.core.borrow().value
    }

    /// Current value as a percentage of the configured range
    pub fn percentage(&self) -> f64 {
        let core = self.core.borrow();
        core.config.percentage(Some(core.value))
    }

    pub fn options(&self) -> WidgetOptions {
        self.core.borrow().config.get_all()
    }

    pub fn get_option(&self, key: &str) -> Option<Value> {
        self.core.borrow().config.get(key)
    }

    pub fn metrics(&self) -> WidgetMetrics {
        self.core.borrow().metrics.clone()
    }

    pub fn surface(&self) -> Surface {
        self.core.borrow().surface.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.core.borrow().animator.is_animating()
    }

    pub fn is_paused(&self) -> bool {
        self.core.borrow().animator.is_paused()
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.borrow().destroyed
    }

    // ----- listeners and extension points -----------------------------

    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.core.borrow_mut().events.on(kind, listener)
    }

    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.core.borrow_mut().events.off(kind, id)
    }

    pub fn use_plugin(
        &self,
        name: impl Into<String>,
        plugin: Box<dyn WidgetPlugin>,
    ) -> Result<(), WidgetError> {
        let mut core = self.core.borrow_mut();
        if core.destroyed {
            return Ok(());
        }
        core.plugins.install(name, plugin, None)
    }

    pub fn use_plugin_with(
        &self,
        name: impl Into<String>,
        plugin: Box<dyn WidgetPlugin>,
        options: Value,
    ) -> Result<(), WidgetError> {
        let mut core = self.core.borrow_mut();
        if core.destroyed {
            return Ok(());
        }
        core.plugins.install(name, plugin, Some(options))
    }

    pub fn remove_plugin(&self, name: &str) -> bool {
        self.core.borrow_mut().plugins.uninstall(name)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.core.borrow().plugins.contains(name)
    }

    pub fn add_middleware<F>(&self, stage: F)
    where
        F: FnMut(f64) -> f64 + 'static,
    {
        let mut core = self.core.borrow_mut();
        if core.destroyed {
            return;
        }
        core.middleware.use_stage(stage);
    }

    // ----- value pipeline ---------------------------------------------

    /// Set the value through the full pipeline, animating if the widget
    /// is configured to.
    pub fn set_value(&self, value: f64) -> Result<(), WidgetError> {
        let animated = {
            let core = self.core.borrow();
            if core.destroyed {
                return Ok(());
            }
            core.config.options().animated
        };
        self.set_value_with(value, animated)
    }

    /// Set the value through the full pipeline with an explicit
    /// animation override.
    ///
    /// Pipeline order: clamp, plugin before hooks, middleware, clamp
    /// again, then apply. A resolved value equal to the current one is
    /// dropped without events. Leaving the minimum (or zero) emits
    /// `start` before the change lands. An animated set while a tween
    /// is in flight retargets from the tween's current position.
    pub fn set_value_with(&self, value: f64, animated: bool) -> Result<(), WidgetError> {
        let decision = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            if core.destroyed {
                return Ok(());
            }

            let from = core.value;
            let proposed = core.config.normalize(value);
            let proposed = core.plugins.run_before_value_change(core.id, from, proposed)?;
            let proposed = core.middleware.execute(proposed);
            // Hooks and middleware may leave the range
            let to = core.config.normalize(proposed);

            if to == from {
                Apply::Unchanged
            } else {
                let options = core.config.options();
                let fire_start = from == options.min || from == 0.0;
                let duration_ms = options.duration;

                if !animated || duration_ms == 0 {
                    Apply::Instant { from, to, fire_start }
                } else {
                    let easing = core.runtime.easings().resolve(&options.easing)?;
                    let spec = TweenSpec {
                        from,
                        to,
                        duration: TickTime::from_nanos(duration_ms.saturating_mul(1_000_000)),
                        easing,
                    };
                    if core.animator.is_active() {
                        core.metrics.tweens_superseded += 1;
                    }
                    core.tween_from = Some(from);
                    core.metrics.tweens_started += 1;
                    match core.animator.start(spec) {
                        TweenStart::Instant => Apply::Instant { from, to, fire_start },
                        TweenStart::Animating => Apply::Tween { from, fire_start },
                    }
                }
            }
        };

        match decision {
            Apply::Unchanged => Ok(()),
            Apply::Instant { from, to, fire_start } => {
                if fire_start {
                    self.emit(EventKind::Start, from, None)?;
                }
                {
                    let mut guard = self.core.borrow_mut();
                    let core = &mut *guard;
                    // A start listener may have destroyed the widget
                    if core.destroyed {
                        return Ok(());
                    }
                    if core.animator.is_active() {
                        core.metrics.tweens_superseded += 1;
                    }
                    core.stop_stepping();
                    core.value = to;
                    core.config.store_value(to);
                    core.draw(None)?;
                }
                self.emit(EventKind::Change, to, None)?;
                {
                    let mut core = self.core.borrow_mut();
                    if !core.destroyed {
                        let ctx = ValueChange {
                            widget: core.id,
                            from,
                            to,
                        };
                        core.plugins.run_after_value_change(&ctx)?;
                    }
                }
                let at_max = {
                    let core = self.core.borrow();
                    !core.destroyed && core.value == core.config.options().max
                };
                if at_max {
                    self.emit(EventKind::Complete, to, None)?;
                }
                Ok(())
            }
            Apply::Tween { from, fire_start } => {
                if fire_start {
                    self.emit(EventKind::Start, from, None)?;
                }
                self.ensure_frame_scheduled();
                Ok(())
            }
        }
    }

    pub fn increment(&self, delta: f64) -> Result<(), WidgetError> {
        let next = {
            let core = self.core.borrow();
            if core.destroyed {
                return Ok(());
            }
            core.value + delta
        };
        self.set_value(next)
    }

    pub fn decrement(&self, delta: f64) -> Result<(), WidgetError> {
        self.increment(-delta)
    }

    /// Snap back to the configured minimum without animation
    pub fn reset(&self) -> Result<(), WidgetError> {
        let min = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            if core.destroyed {
                return Ok(());
            }
            core.stop_stepping();
            core.config.options().min
        };
        self.set_value_with(min, false)
    }

    // ----- animation control ------------------------------------------

    /// Freeze an in-flight tween in place
    pub fn pause(&self) {
        let mut core = self.core.borrow_mut();
        if core.destroyed {
            return;
        }
        core.animator.pause();
    }

    /// Continue a paused tween from where it stopped
    pub fn resume(&self) {
        let should_schedule = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            core.animator.resume();
            core.animator.is_animating()
        };
        if should_schedule {
            self.ensure_frame_scheduled();
        }
    }

    // ----- configuration ----------------------------------------------

    /// Merge an options patch into the live configuration.
    ///
    /// Rejects patches that break the range invariant or name unknown
    /// easings or shapes, leaving the previous configuration in place.
    /// The markup is remounted and redrawn; the value (patched or
    /// current) is then re-applied through the pipeline without
    /// animation, so range changes clamp and emit like any other set.
    pub fn update_options(&self, patch: &OptionsPatch) -> Result<(), WidgetError> {
        let apply_value = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            if core.destroyed {
                return Ok(());
            }

            let previous = core.config.get_all();
            core.config.merge(patch);

            let merged = core.config.options();
            if merged.min >= merged.max {
                let reason = format!(
                    "min {} must be less than max {}",
                    merged.min, merged.max
                );
                core.config.restore(previous);
                return Err(WidgetError::InvalidConfig { reason });
            }
            if let Some(easing) = &patch.easing {
                if let Err(err) = core.runtime.easings().resolve(easing) {
                    core.config.restore(previous);
                    return Err(err);
                }
            }

            let mut next_renderer = None;
            if let Some(shape) = &patch.shape {
                if *shape != previous.shape {
                    match core.runtime.renderers().create(shape) {
                        Ok(renderer) => next_renderer = Some(renderer),
                        Err(err) => {
                            core.config.restore(previous);
                            return Err(err);
                        }
                    }
                }
            }

            if let Some(renderer) = next_renderer {
                core.renderer.unmount(&core.surface);
                core.renderer = renderer;
            }
            // Full re-render: the mount skeleton depends on options too
            core.apply_root_attrs();
            core.renderer.mount(&core.surface, core.config.options())?;
            core.draw(None)?;

            patch.value.unwrap_or(core.value)
        };
        self.set_value_with(apply_value, false)
    }

    // ----- teardown ---------------------------------------------------

    /// Tear the widget down: before hooks, then stop animation, emit
    /// `destroy`, unmount, release listeners and extensions, and run
    /// the after hooks. Idempotent; a failing before hook leaves the
    /// widget alive.
    pub fn destroy(&self) -> Result<(), WidgetError> {
        {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            if core.destroyed {
                return Ok(());
            }
            let ctx = PluginContext {
                widget: core.id,
                value: core.value,
            };
            core.plugins.run_before_destroy(&ctx)?;
        }

        let (listeners, plugins, id, value) = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            // A before hook may have re-entered destroy
            if core.destroyed {
                return Ok(());
            }
            core.stop_stepping();
            let listeners = core.events.snapshot(EventKind::Destroy);
            core.events.clear();
            core.renderer.unmount(&core.surface);
            core.clear_root_attrs();
            let plugins = core.plugins.take_all();
            core.middleware.clear();
            core.runtime.monitor().unregister(core.id);
            core.destroyed = true;
            (listeners, plugins, core.id, core.value)
        };

        log::debug!("widget {id} destroyed");

        let event = WidgetEvent::new(EventKind::Destroy, id, value);
        EventEmitter::deliver(&listeners, &event)?;

        let ctx = PluginContext { widget: id, value };
        for (_, mut plugin) in plugins {
            plugin.after_destroy(&ctx)?;
        }
        Ok(())
    }

    // ----- frame stepping ---------------------------------------------

    fn emit(&self, kind: EventKind, value: f64, at: Option<TickTime>) -> Result<(), WidgetError> {
        let (listeners, id) = {
            let core = self.core.borrow();
            (core.events.snapshot(kind), core.id)
        };
        if listeners.is_empty() {
            return Ok(());
        }
        let mut event = WidgetEvent::new(kind, id, value);
        if let Some(at) = at {
            event = event.with_timestamp(at);
        }
        EventEmitter::deliver(&listeners, &event)
    }

    fn ensure_frame_scheduled(&self) {
        let mut guard = self.core.borrow_mut();
        let core = &mut *guard;
        if core.destroyed || core.frame_pending.is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.core);
        let handle = core
            .runtime
            .scheduler()
            .schedule(move |now| Self::step_frame(&weak, now));
        core.frame_pending = Some(handle);
    }

    /// One animation frame. Runs as a scheduler callback holding only a
    /// weak reference, so dropped widgets stop silently.
    fn step_frame(weak: &Weak<RefCell<WidgetCore>>, now: TickTime) -> Result<(), WidgetError> {
        let Some(rc) = weak.upgrade() else {
            return Ok(());
        };
        let widget = ProgressWidget { core: rc };

        let outcome = {
            let mut guard = widget.core.borrow_mut();
            let core = &mut *guard;
            core.frame_pending = None;
            if core.destroyed {
                return Ok(());
            }
            match core.animator.advance(now) {
                // Paused or stopped; resume will reschedule
                None => return Ok(()),
                Some(frame) => {
                    core.value = frame.value;
                    core.config.store_value(frame.value);
                    core.draw(Some(now))?;
                    if frame.finished {
                        let from = core.tween_from.take().unwrap_or(frame.value);
                        StepOutcome::Finished {
                            from,
                            value: frame.value,
                        }
                    } else {
                        StepOutcome::Running { value: frame.value }
                    }
                }
            }
        };

        match outcome {
            StepOutcome::Running { value } => {
                widget.emit(EventKind::Update, value, Some(now))?;
                widget.ensure_frame_scheduled();
                Ok(())
            }
            StepOutcome::Finished { from, value } => {
                // Final frame lands exactly on the target
                widget.emit(EventKind::Update, value, Some(now))?;
                widget.emit(EventKind::Change, value, Some(now))?;
                {
                    let mut core = widget.core.borrow_mut();
                    if !core.destroyed {
                        let ctx = ValueChange {
                            widget: core.id,
                            from,
                            to: value,
                        };
                        core.plugins.run_after_value_change(&ctx)?;
                    }
                }
                let at_max = {
                    let core = widget.core.borrow();
                    !core.destroyed && core.value == core.config.options().max
                };
                if at_max {
                    widget.emit(EventKind::Complete, value, Some(now))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CollectingListener;
    use crate::render::RecordingShape;

    fn test_widget(options: WidgetOptions) -> (WidgetRuntime, ProgressWidget) {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(&runtime, Surface::detached(), options).unwrap();
        (runtime, widget)
    }

    #[test]
    fn test_construction_draws_initial_state() {
        let runtime = WidgetRuntime::new();
        let shape = RecordingShape::new();
        let widget = ProgressWidget::builder(&runtime)
            .value(25.0)
            .renderer(Box::new(shape.clone()))
            .build()
            .unwrap();

        assert_eq!(widget.value(), 25.0);
        assert_eq!(widget.percentage(), 25.0);
        assert_eq!(shape.draw_count(), 1);
        assert!(runtime.monitor().is_registered(widget.id()));
    }

    #[test]
    fn test_out_of_range_initial_value_clamps() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            value: 250.0,
            ..WidgetOptions::default()
        });
        assert_eq!(widget.value(), 100.0);
    }

    #[test]
    fn test_invalid_range_rejected_at_construction() {
        let runtime = WidgetRuntime::new();
        let err = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                min: 10.0,
                max: 10.0,
                ..WidgetOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidConfig { .. }));
    }

    #[test]
    fn test_unanimated_set_emits_change_synchronously() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        let log = CollectingListener::new();
        widget.on(EventKind::Change, log.listener());

        widget.set_value(40.0).unwrap();
        assert_eq!(widget.value(), 40.0);
        assert_eq!(log.values(), vec![40.0]);
    }

    #[test]
    fn test_idempotent_set_is_silent() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            value: 40.0,
            ..WidgetOptions::default()
        });
        let log = CollectingListener::new();
        widget.on(EventKind::Change, log.listener());

        widget.set_value(40.0).unwrap();
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_start_fires_when_leaving_minimum() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        let log = CollectingListener::new();
        widget.on(EventKind::Start, log.listener());

        widget.set_value(10.0).unwrap();
        widget.set_value(20.0).unwrap();
        // Only the first set left the minimum
        assert_eq!(log.event_count(), 1);
        assert_eq!(log.values(), vec![0.0]);
    }

    #[test]
    fn test_complete_fires_at_maximum() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        let log = CollectingListener::new();
        widget.on(EventKind::Complete, log.listener());

        widget.set_value(50.0).unwrap();
        widget.set_value(100.0).unwrap();
        assert_eq!(log.values(), vec![100.0]);
    }

    #[test]
    fn test_animated_set_steps_through_frames() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                duration: 100,
                easing: "linear".to_string(),
                ..WidgetOptions::default()
            },
        )
        .unwrap();
        let updates = CollectingListener::new();
        let changes = CollectingListener::new();
        widget.on(EventKind::Update, updates.listener());
        widget.on(EventKind::Change, changes.listener());

        widget.set_value(50.0).unwrap();
        assert!(widget.is_animating());
        assert_eq!(widget.value(), 0.0);

        runtime.run_frame(TickTime::zero()).unwrap();
        runtime.run_frame(TickTime::from_millis(50.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 25.0);
        assert!(changes.events().is_empty());

        runtime.run_frame(TickTime::from_millis(100.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 50.0);
        assert!(!widget.is_animating());
        assert_eq!(changes.values(), vec![50.0]);
        // Final update lands exactly on the target
        assert_eq!(updates.values().last(), Some(&50.0));
    }

    #[test]
    fn test_supersession_retargets_from_current_position() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                duration: 100,
                easing: "linear".to_string(),
                ..WidgetOptions::default()
            },
        )
        .unwrap();

        widget.set_value(50.0).unwrap();
        runtime.run_frame(TickTime::zero()).unwrap();
        runtime.run_frame(TickTime::from_millis(50.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 25.0);

        // Retarget mid-flight; the new tween starts at 25
        widget.set_value(0.0).unwrap();
        runtime.run_frame(TickTime::from_millis(60.0).unwrap()).unwrap();
        runtime.run_frame(TickTime::from_millis(110.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 12.5);

        let metrics = widget.metrics();
        assert_eq!(metrics.tweens_started, 2);
        assert_eq!(metrics.tweens_superseded, 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                duration: 100,
                easing: "linear".to_string(),
                ..WidgetOptions::default()
            },
        )
        .unwrap();

        widget.set_value(100.0).unwrap();
        runtime.run_frame(TickTime::zero()).unwrap();
        runtime.run_frame(TickTime::from_millis(25.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 25.0);

        widget.pause();
        assert!(widget.is_paused());
        runtime.run_frame(TickTime::from_millis(500.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 25.0);

        // Paused time is not counted against the tween
        widget.resume();
        runtime.run_frame(TickTime::from_millis(600.0).unwrap()).unwrap();
        runtime.run_frame(TickTime::from_millis(650.0).unwrap()).unwrap();
        assert_eq!(widget.value(), 75.0);
    }

    #[test]
    fn test_plugin_hook_can_override_value() {
        struct Doubler;
        impl WidgetPlugin for Doubler {
            fn before_value_change(
                &mut self,
                change: &ValueChange,
            ) -> Result<Option<f64>, WidgetError> {
                Ok(Some(change.to * 2.0))
            }
        }

        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        widget.use_plugin("doubler", Box::new(Doubler)).unwrap();

        widget.set_value(20.0).unwrap();
        assert_eq!(widget.value(), 40.0);
    }

    #[test]
    fn test_middleware_runs_after_hooks() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        widget.add_middleware(|v| v + 5.0);
        widget.add_middleware(|v| v * 2.0);

        widget.set_value(10.0).unwrap();
        assert_eq!(widget.value(), 30.0);
    }

    #[test]
    fn test_middleware_result_is_clamped() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        widget.add_middleware(|v| v * 100.0);

        widget.set_value(50.0).unwrap();
        assert_eq!(widget.value(), 100.0);
    }

    #[test]
    fn test_update_options_narrows_range_and_clamps() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            value: 80.0,
            ..WidgetOptions::default()
        });
        let log = CollectingListener::new();
        widget.on(EventKind::Change, log.listener());

        let patch = OptionsPatch {
            max: Some(50.0),
            ..OptionsPatch::default()
        };
        widget.update_options(&patch).unwrap();
        assert_eq!(widget.value(), 50.0);
        assert_eq!(log.values(), vec![50.0]);
    }

    #[test]
    fn test_update_options_rejects_bad_range() {
        let (_runtime, widget) = test_widget(WidgetOptions::default());
        let patch = OptionsPatch {
            min: Some(200.0),
            ..OptionsPatch::default()
        };
        let err = widget.update_options(&patch).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidConfig { .. }));
        // Previous configuration still in place
        assert_eq!(widget.options().min, 0.0);
    }

    #[test]
    fn test_destroy_order_and_idempotence() {
        let (runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            ..WidgetOptions::default()
        });
        let destroys = CollectingListener::new();
        widget.on(EventKind::Destroy, destroys.listener());

        widget.set_value(30.0).unwrap();
        widget.destroy().unwrap();
        assert!(widget.is_destroyed());
        assert_eq!(destroys.values(), vec![30.0]);
        assert!(!runtime.monitor().is_registered(widget.id()));

        // Second destroy and post-destroy operations are silent
        widget.destroy().unwrap();
        widget.set_value(60.0).unwrap();
        assert_eq!(widget.value(), 30.0);
        assert_eq!(destroys.event_count(), 1);
    }

    #[test]
    fn test_destroy_cancels_pending_frames() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                duration: 100,
                ..WidgetOptions::default()
            },
        )
        .unwrap();

        widget.set_value(50.0).unwrap();
        assert_eq!(runtime.scheduler().pending(), 1);
        widget.destroy().unwrap();
        assert_eq!(runtime.scheduler().pending(), 0);
    }

    #[test]
    fn test_listener_destroying_widget_mid_tween() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                duration: 100,
                easing: "linear".to_string(),
                ..WidgetOptions::default()
            },
        )
        .unwrap();
        {
            let handle = widget.clone();
            widget.on(EventKind::Update, move |_| handle.destroy());
        }

        widget.set_value(50.0).unwrap();
        runtime.run_frame(TickTime::zero()).unwrap();
        runtime.run_frame(TickTime::from_millis(50.0).unwrap()).unwrap();
        assert!(widget.is_destroyed());
        assert_eq!(runtime.scheduler().pending(), 0);
    }

    #[test]
    fn test_dropped_widget_frames_are_inert() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                duration: 100,
                ..WidgetOptions::default()
            },
        )
        .unwrap();
        widget.set_value(50.0).unwrap();
        assert_eq!(runtime.scheduler().pending(), 1);

        drop(widget);
        // The queued callback upgrades to nothing and returns cleanly
        runtime.run_frame(TickTime::from_millis(16.0).unwrap()).unwrap();
        assert_eq!(runtime.scheduler().pending(), 0);
    }

    #[test]
    fn test_reset_stops_animation_and_returns_to_min() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::new(
            &runtime,
            Surface::detached(),
            WidgetOptions {
                min: 10.0,
                duration: 100,
                easing: "linear".to_string(),
                ..WidgetOptions::default()
            },
        )
        .unwrap();

        widget.set_value(90.0).unwrap();
        runtime.run_frame(TickTime::zero()).unwrap();
        runtime.run_frame(TickTime::from_millis(50.0).unwrap()).unwrap();
        assert!(widget.value() > 10.0);

        widget.reset().unwrap();
        assert_eq!(widget.value(), 10.0);
        assert!(!widget.is_animating());
    }

    #[test]
    fn test_increment_and_decrement() {
        let (_runtime, widget) = test_widget(WidgetOptions {
            animated: false,
            value: 50.0,
            ..WidgetOptions::default()
        });
        widget.increment(30.0).unwrap();
        assert_eq!(widget.value(), 80.0);
        widget.decrement(100.0).unwrap();
        assert_eq!(widget.value(), 0.0);
    }
}
