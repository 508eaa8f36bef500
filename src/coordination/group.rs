//! Bulk operations and aggregate queries over a set of widgets

use std::collections::HashMap;

use crate::error::WidgetError;
use crate::widget::ProgressWidget;

/// Unordered set of widgets addressed by caller-supplied ids.
///
/// Aggregates are computed fresh from the live values on every call.
/// The group never owns widget lifecycle; `destroy_all` is a
/// convenience for callers that do.
#[derive(Default)]
pub struct ProgressGroup {
    widgets: HashMap<String, ProgressWidget>,
}

impl ProgressGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>, widget: &ProgressWidget) {
        self.widgets.insert(id.into(), widget.clone());
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.widgets.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&ProgressWidget> {
        self.widgets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.widgets.keys().map(String::as_str).collect()
    }

    pub fn set_all(&self, value: f64) -> Result<(), WidgetError> {
        for widget in self.widgets.values() {
            widget.set_value(value)?;
        }
        Ok(())
    }

    pub fn increment_all(&self, delta: f64) -> Result<(), WidgetError> {
        for widget in self.widgets.values() {
            widget.increment(delta)?;
        }
        Ok(())
    }

    pub fn reset_all(&self) -> Result<(), WidgetError> {
        for widget in self.widgets.values() {
            widget.reset()?;
        }
        Ok(())
    }

    pub fn destroy_all(&self) -> Result<(), WidgetError> {
        for widget in self.widgets.values() {
            widget.destroy()?;
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.widgets.values().map(ProgressWidget::value).sum()
    }

    pub fn average(&self) -> Option<f64> {
        if self.widgets.is_empty() {
            return None;
        }
        Some(self.sum() / self.widgets.len() as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.widgets.values().map(ProgressWidget::value).reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.widgets.values().map(ProgressWidget::value).reduce(f64::min)
    }
}
