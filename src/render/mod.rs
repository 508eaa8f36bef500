//! Rendering seam: the retained surface tree, shape renderers, and
//! label formatting

pub mod format;
pub mod renderer;
pub mod shapes;
pub mod surface;

pub use format::*;
pub use renderer::*;
pub use shapes::*;
pub use surface::*;
