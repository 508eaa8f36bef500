//! Shape renderer capability and the registry resolving shapes by name

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::WidgetOptions;
use crate::error::WidgetError;
use crate::render::shapes::{DialShape, LinearShape};
use crate::render::surface::Surface;

/// Per-draw data handed to a renderer. Renderers own markup, never
/// value state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub value: f64,
    pub percent: f64,
    pub label: Option<String>,
}

/// Visual strategy bound by shape name at widget construction
pub trait ShapeRenderer {
    fn name(&self) -> &str;

    /// Build the owned skeleton under the mount root
    fn mount(&mut self, surface: &Surface, options: &WidgetOptions) -> Result<(), WidgetError>;

    /// Update visuals for the current frame
    fn draw(
        &mut self,
        surface: &Surface,
        frame: &RenderFrame,
        options: &WidgetOptions,
    ) -> Result<(), WidgetError>;

    /// Remove owned markup
    fn unmount(&mut self, surface: &Surface);
}

impl std::fmt::Debug for dyn ShapeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeRenderer")
            .field("name", &self.name())
            .finish()
    }
}

pub type RendererFactory = Box<dyn Fn() -> Box<dyn ShapeRenderer>>;

/// Shape name to renderer factory table. Cloning shares the table.
#[derive(Clone)]
pub struct RendererRegistry {
    factories: Rc<RefCell<HashMap<String, RendererFactory>>>,
}

impl RendererRegistry {
    /// Create a registry with the built-in shapes registered
    pub fn new() -> Self {
        let registry = Self {
            factories: Rc::new(RefCell::new(HashMap::new())),
        };
        registry.register("linear", || Box::new(LinearShape::new()));
        registry.register("dial", || Box::new(DialShape::new()));
        registry
    }

    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ShapeRenderer> + 'static,
    {
        self.factories
            .borrow_mut()
            .insert(name.into(), Box::new(factory));
    }

    /// Instantiate a renderer or fail with `RendererNotFound`
    pub fn create(&self, name: &str) -> Result<Box<dyn ShapeRenderer>, WidgetError> {
        self.factories
            .borrow()
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| WidgetError::RendererNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.borrow().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.factories.borrow().keys().cloned().collect()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shapes_registered() {
        let registry = RendererRegistry::new();
        assert!(registry.contains("linear"));
        assert!(registry.contains("dial"));
        assert!(registry.create("linear").is_ok());
    }

    #[test]
    fn test_unknown_shape() {
        let registry = RendererRegistry::new();
        let err = registry.create("hexagon").unwrap_err();
        assert!(matches!(err, WidgetError::RendererNotFound { .. }));
    }

    #[test]
    fn test_custom_shape_shared_across_clones() {
        let registry = RendererRegistry::new();
        let clone = registry.clone();
        registry.register("custom", || Box::new(LinearShape::new()));
        assert!(clone.contains("custom"));
    }
}
