//! Easing curves and the registry that resolves them by name

pub mod functions;
pub mod registry;

pub use functions::*;
pub use registry::*;
