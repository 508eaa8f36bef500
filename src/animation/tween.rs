//! Tween session types

use std::rc::Rc;

use crate::easing::EasingFunction;
use crate::time::TickTime;

/// Parameters for one value transition
#[derive(Clone)]
pub struct TweenSpec {
    pub from: f64,
    pub to: f64,
    pub duration: TickTime,
    pub easing: Rc<dyn EasingFunction>,
}

impl std::fmt::Debug for TweenSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenSpec")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration.as_millis())
            .field("easing", &self.easing.name())
            .finish()
    }
}

/// Outcome of starting a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStart {
    /// Zero duration: the caller applies the target with no frames
    Instant,
    /// A session is live and wants frame callbacks
    Animating,
}

/// One advanced frame of an active session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenFrame {
    pub value: f64,
    /// Set on the frame that lands exactly on the target
    pub finished: bool,
}
