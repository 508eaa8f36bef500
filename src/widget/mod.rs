pub mod base;
pub mod builder;

pub use base::*;
pub use builder::*;
