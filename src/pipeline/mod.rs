//! Value pipelines: plugin hooks and middleware stages

pub mod middleware;
pub mod plugin;

pub use middleware::*;
pub use plugin::*;
