//! Fluent widget construction

use serde_json::Value;

use crate::config::{OptionsPatch, WidgetOptions};
use crate::error::WidgetError;
use crate::event::{EventEmitter, EventKind, WidgetEvent};
use crate::pipeline::{MiddlewareManager, PluginManager, WidgetPlugin};
use crate::render::{ShapeRenderer, Surface, Target};
use crate::runtime::WidgetRuntime;

use super::base::ProgressWidget;

/// Builds a [`ProgressWidget`] step by step. Every field is optional;
/// an unconfigured builder yields a detached linear widget with the
/// default options.
///
/// Plugins install in the order given, listeners attach before the
/// widget's first draw, and nothing touches the runtime until
/// [`build`](Self::build).
pub struct WidgetBuilder {
    runtime: WidgetRuntime,
    target: Target,
    patch: OptionsPatch,
    plugins: Vec<(String, Box<dyn WidgetPlugin>, Option<Value>)>,
    middleware: MiddlewareManager,
    events: EventEmitter,
    renderer: Option<Box<dyn ShapeRenderer>>,
}

impl WidgetBuilder {
    pub(crate) fn new(runtime: &WidgetRuntime) -> Self {
        Self {
            runtime: runtime.clone(),
            target: Target::Surface(Surface::detached()),
            patch: OptionsPatch::default(),
            plugins: Vec::new(),
            middleware: MiddlewareManager::new(),
            events: EventEmitter::new(),
            renderer: None,
        }
    }

    pub fn target(mut self, target: impl Into<Target>) -> Self {
        self.target = target.into();
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.patch.value = Some(value);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.patch.min = Some(min);
        self.patch.max = Some(max);
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.patch.animated = Some(animated);
        self
    }

    pub fn duration_ms(mut self, duration: u64) -> Self {
        self.patch.duration = Some(duration);
        self
    }

    pub fn easing(mut self, easing: impl Into<String>) -> Self {
        self.patch.easing = Some(easing.into());
        self
    }

    pub fn show_text(mut self, show: bool) -> Self {
        self.patch.show_text = Some(show);
        self
    }

    pub fn format(mut self, template: impl Into<String>) -> Self {
        self.patch.format = Some(template.into());
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.patch.theme = Some(theme.into());
        self
    }

    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.patch.class_name = Some(class.into());
        self
    }

    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.patch.shape = Some(shape.into());
        self
    }

    /// Set a free-form option carried outside the typed fields
    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.patch.extra.insert(key.into(), value);
        self
    }

    pub fn plugin(mut self, name: impl Into<String>, plugin: Box<dyn WidgetPlugin>) -> Self {
        self.plugins.push((name.into(), plugin, None));
        self
    }

    pub fn plugin_with(
        mut self,
        name: impl Into<String>,
        plugin: Box<dyn WidgetPlugin>,
        options: Value,
    ) -> Self {
        self.plugins.push((name.into(), plugin, Some(options)));
        self
    }

    pub fn middleware<F>(mut self, stage: F) -> Self
    where
        F: FnMut(f64) -> f64 + 'static,
    {
        self.middleware.use_stage(stage);
        self
    }

    /// Bypass the shape registry with a concrete renderer
    pub fn renderer(mut self, renderer: Box<dyn ShapeRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn on_start<F>(self, listener: F) -> Self
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.listen(EventKind::Start, listener)
    }

    pub fn on_update<F>(self, listener: F) -> Self
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.listen(EventKind::Update, listener)
    }

    pub fn on_change<F>(self, listener: F) -> Self
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.listen(EventKind::Change, listener)
    }

    pub fn on_complete<F>(self, listener: F) -> Self
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.listen(EventKind::Complete, listener)
    }

    pub fn on_destroy<F>(self, listener: F) -> Self
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.listen(EventKind::Destroy, listener)
    }

    fn listen<F>(mut self, kind: EventKind, listener: F) -> Self
    where
        F: FnMut(&WidgetEvent) -> Result<(), WidgetError> + 'static,
    {
        self.events.on(kind, listener);
        self
    }

    pub fn build(self) -> Result<ProgressWidget, WidgetError> {
        let options = WidgetOptions::resolve(self.patch);
        let mut plugins = PluginManager::new();
        for (name, plugin, plugin_options) in self.plugins {
            plugins.install(name, plugin, plugin_options)?;
        }
        ProgressWidget::construct(
            &self.runtime,
            self.target,
            options,
            plugins,
            self.middleware,
            self.renderer,
            self.events,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CollectingListener;

    #[test]
    fn test_builder_defaults() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::builder(&runtime).build().unwrap();
        let options = widget.options();
        assert_eq!(options.min, 0.0);
        assert_eq!(options.max, 100.0);
        assert_eq!(widget.value(), 0.0);
    }

    #[test]
    fn test_builder_applies_configuration() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::builder(&runtime)
            .range(0.0, 200.0)
            .value(20.0)
            .animated(false)
            .easing("ease_out")
            .show_text(true)
            .format("{value} of {max}")
            .build()
            .unwrap();

        assert_eq!(widget.value(), 20.0);
        assert_eq!(widget.percentage(), 10.0);
        let options = widget.options();
        assert_eq!(options.easing, "ease_out");
        assert!(options.show_text);
    }

    #[test]
    fn test_builder_wires_listeners_before_first_set() {
        let runtime = WidgetRuntime::new();
        let log = CollectingListener::new();
        let widget = ProgressWidget::builder(&runtime)
            .animated(false)
            .on_change(log.listener())
            .build()
            .unwrap();

        widget.set_value(33.0).unwrap();
        assert_eq!(log.values(), vec![33.0]);
    }

    #[test]
    fn test_builder_named_target_must_exist() {
        let runtime = WidgetRuntime::new();
        let err = ProgressWidget::builder(&runtime)
            .target("missing")
            .build()
            .unwrap_err();
        assert!(matches!(err, WidgetError::SurfaceNotFound { .. }));
    }

    #[test]
    fn test_builder_middleware_and_free_options() {
        let runtime = WidgetRuntime::new();
        let widget = ProgressWidget::builder(&runtime)
            .animated(false)
            .middleware(|v| v.round())
            .option("data-role", Value::from("upload"))
            .build()
            .unwrap();

        widget.set_value(49.6).unwrap();
        assert_eq!(widget.value(), 50.0);
        assert_eq!(widget.get_option("data-role"), Some(Value::from("upload")));
    }
}
