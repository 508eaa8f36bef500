//! Middleware stages applied to every proposed value

/// A single transformation stage
pub type Middleware = Box<dyn FnMut(f64) -> f64>;

/// Ordered chain of value transformations. Registration order is
/// execution order; the chain is unbounded.
#[derive(Default)]
pub struct MiddlewareManager {
    stages: Vec<Middleware>,
}

impl MiddlewareManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the chain
    pub fn use_stage<F>(&mut self, stage: F)
    where
        F: FnMut(f64) -> f64 + 'static,
    {
        self.stages.push(Box::new(stage));
    }

    /// Fold a value through every stage in order
    pub fn execute(&mut self, value: f64) -> f64 {
        self.stages
            .iter_mut()
            .fold(value, |current, stage| stage(current))
    }

    pub fn clear(&mut self) {
        self.stages.clear();
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
