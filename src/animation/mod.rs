//! Frame scheduling and tween stepping

pub mod controller;
pub mod scheduler;
pub mod tween;

pub use controller::*;
pub use scheduler::*;
pub use tween::*;
