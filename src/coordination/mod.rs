pub mod chain;
pub mod group;
pub mod synchronizer;

pub use chain::*;
pub use group::*;
pub use synchronizer::*;
