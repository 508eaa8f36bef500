use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::easing::functions::{
    BezierEase, CubicEase, EaseIn, EaseInOut, EaseOut, EasingFunction, LinearEase, SpringEase,
    StepEase,
};
use crate::error::WidgetError;

/// Registry for easing functions, resolved by name at tween start.
/// Cloning shares the underlying table.
#[derive(Clone)]
pub struct EasingRegistry {
    functions: Rc<RefCell<HashMap<String, Rc<dyn EasingFunction>>>>,
}

impl EasingRegistry {
    /// Create a registry with the built-in curves registered
    pub fn new() -> Self {
        let registry = Self {
            functions: Rc::new(RefCell::new(HashMap::new())),
        };
        registry.register_builtin_functions();
        registry
    }

    fn register_builtin_functions(&self) {
        self.register(Rc::new(LinearEase));
        self.register(Rc::new(EaseIn));
        self.register(Rc::new(EaseOut));
        self.register(Rc::new(EaseInOut));
        self.register(Rc::new(CubicEase));
        self.register(Rc::new(StepEase::new()));
        self.register(Rc::new(BezierEase::new()));
        self.register(Rc::new(SpringEase::new()));
    }

    /// Register an easing function under its own name
    pub fn register(&self, function: Rc<dyn EasingFunction>) {
        self.functions
            .borrow_mut()
            .insert(function.name().to_string(), function);
    }

    /// Get an easing function by name
    pub fn get(&self, name: &str) -> Option<Rc<dyn EasingFunction>> {
        self.functions.borrow().get(name).cloned()
    }

    /// Resolve a name or fail with `EasingNotFound`
    pub fn resolve(&self, name: &str) -> Result<Rc<dyn EasingFunction>, WidgetError> {
        self.get(name).ok_or_else(|| WidgetError::EasingNotFound {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.borrow().contains_key(name)
    }

    /// List all registered function names
    pub fn names(&self) -> Vec<String> {
        self.functions.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.functions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.borrow().is_empty()
    }
}

impl Default for EasingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
