//! Plugin hooks around widget lifecycle and value changes

use serde_json::Value;

use crate::config::WidgetOptions;
use crate::error::WidgetError;
use crate::ids::WidgetId;

/// Context handed to lifecycle hooks
#[derive(Debug, Clone, Copy)]
pub struct PluginContext {
    pub widget: WidgetId,
    pub value: f64,
}

/// Context handed to value-change hooks
#[derive(Debug, Clone, Copy)]
pub struct ValueChange {
    pub widget: WidgetId,
    pub from: f64,
    pub to: f64,
}

/// The closed hook set. Every method defaults to a no-op; hook errors
/// propagate uncontained to whatever call triggered the hook.
pub trait WidgetPlugin {
    /// Receive install-time options
    fn configure(&mut self, _options: &Value) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Adjust raw options before validation. Runs in install order;
    /// mutations thread through the chain.
    fn before_init(&mut self, _options: &mut WidgetOptions) -> Result<(), WidgetError> {
        Ok(())
    }

    fn after_init(&mut self, _ctx: &PluginContext) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Optionally override a proposed value. `Some(v)` replaces the
    /// proposal seen by the remaining plugins; `None` leaves it alone.
    fn before_value_change(&mut self, _ctx: &ValueChange) -> Result<Option<f64>, WidgetError> {
        Ok(None)
    }

    fn after_value_change(&mut self, _ctx: &ValueChange) -> Result<(), WidgetError> {
        Ok(())
    }

    fn before_destroy(&mut self, _ctx: &PluginContext) -> Result<(), WidgetError> {
        Ok(())
    }

    fn after_destroy(&mut self, _ctx: &PluginContext) -> Result<(), WidgetError> {
        Ok(())
    }
}

struct PluginEntry {
    name: String,
    plugin: Box<dyn WidgetPlugin>,
}

/// Ordered plugin registry; install order is hook order
#[derive(Default)]
pub struct PluginManager {
    entries: Vec<PluginEntry>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plugin under a name. Re-installing the name replaces
    /// the plugin in place, keeping its position in hook order.
    pub fn install(
        &mut self,
        name: impl Into<String>,
        mut plugin: Box<dyn WidgetPlugin>,
        options: Option<Value>,
    ) -> Result<(), WidgetError> {
        let name = name.into();
        if let Some(options) = &options {
            plugin
                .configure(options)
                .map_err(|err| WidgetError::PluginFailed {
                    name: name.clone(),
                    hook: "configure".to_string(),
                    reason: err.to_string(),
                })?;
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            log::debug!("plugin '{name}' replaced");
            entry.plugin = plugin;
        } else {
            log::debug!("plugin '{name}' installed");
            self.entries.push(PluginEntry { name, plugin });
        }
        Ok(())
    }

    /// Remove a plugin by name; returns whether one was removed
    pub fn uninstall(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        let removed = self.entries.len() != before;
        if removed {
            log::debug!("plugin '{name}' uninstalled");
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every plugin, preserving install order
    pub fn take_all(&mut self) -> Vec<(String, Box<dyn WidgetPlugin>)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|e| (e.name, e.plugin))
            .collect()
    }

    pub fn run_before_init(&mut self, options: &mut WidgetOptions) -> Result<(), WidgetError> {
        for entry in &mut self.entries {
            entry.plugin.before_init(options)?;
        }
        Ok(())
    }

    pub fn run_after_init(&mut self, ctx: &PluginContext) -> Result<(), WidgetError> {
        for entry in &mut self.entries {
            entry.plugin.after_init(ctx)?;
        }
        Ok(())
    }

    /// Fold value overrides in install order; each `Some` return becomes
    /// the proposal the next plugin sees
    pub fn run_before_value_change(
        &mut self,
        widget: WidgetId,
        from: f64,
        proposed: f64,
    ) -> Result<f64, WidgetError> {
        let mut current = proposed;
        for entry in &mut self.entries {
            let ctx = ValueChange {
                widget,
                from,
                to: current,
            };
            if let Some(next) = entry.plugin.before_value_change(&ctx)? {
                current = next;
            }
        }
        Ok(current)
    }

    pub fn run_after_value_change(&mut self, ctx: &ValueChange) -> Result<(), WidgetError> {
        for entry in &mut self.entries {
            entry.plugin.after_value_change(ctx)?;
        }
        Ok(())
    }

    pub fn run_before_destroy(&mut self, ctx: &PluginContext) -> Result<(), WidgetError> {
        for entry in &mut self.entries {
            entry.plugin.before_destroy(ctx)?;
        }
        Ok(())
    }
}
