//! Cooperative tween stepping.
//!
//! The controller holds at most one session and is advanced by the owner
//! once per scheduler tick. Elapsed time accumulates from the timestamps
//! it is handed, so tests drive it with a synthetic clock.

use crate::animation::tween::{TweenFrame, TweenSpec, TweenStart};
use crate::time::TickTime;

struct TweenSession {
    spec: TweenSpec,
    elapsed: TickTime,
    last_tick: Option<TickTime>,
    paused: bool,
    rebase: bool,
}

/// Drives at most one active tween for a widget
#[derive(Default)]
pub struct AnimationController {
    session: Option<TweenSession>,
}

impl AnimationController {
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Begin a tween, silently superseding any active session.
    /// A session never has zero duration; that case reports `Instant`
    /// and the caller applies the target directly.
    pub fn start(&mut self, spec: TweenSpec) -> TweenStart {
        if self.session.is_some() {
            log::trace!("tween superseded before completion");
        }
        if spec.duration == TickTime::zero() {
            self.session = None;
            return TweenStart::Instant;
        }
        log::trace!(
            "tween {} -> {} over {:.0}ms ({})",
            spec.from,
            spec.to,
            spec.duration.as_millis(),
            spec.easing.name()
        );
        self.session = Some(TweenSession {
            spec,
            elapsed: TickTime::zero(),
            last_tick: None,
            paused: false,
            rebase: false,
        });
        TweenStart::Animating
    }

    /// Advance the active session to `now`.
    /// Returns the frame to apply, or None when idle or paused.
    /// The finishing frame carries the exact target value and clears
    /// the session.
    pub fn advance(&mut self, now: TickTime) -> Option<TweenFrame> {
        let session = self.session.as_mut()?;
        if session.paused {
            return None;
        }
        if session.rebase {
            // First tick after resume; the paused gap must not count
            session.last_tick = Some(now);
            session.rebase = false;
        }
        if let Some(last) = session.last_tick {
            session.elapsed += now - last;
        }
        session.last_tick = Some(now);

        let t = session.elapsed.as_seconds() / session.spec.duration.as_seconds();
        if t >= 1.0 {
            let frame = TweenFrame {
                value: session.spec.to,
                finished: true,
            };
            self.session = None;
            return Some(frame);
        }

        let eased = session.spec.easing.ease(t.clamp(0.0, 1.0));
        let value = session.spec.from + (session.spec.to - session.spec.from) * eased;
        Some(TweenFrame {
            value,
            finished: false,
        })
    }

    /// Freeze elapsed accounting without clearing the session
    pub fn pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.paused = true;
        }
    }

    /// Resume a paused session from the next timestamp
    pub fn resume(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.paused {
                session.paused = false;
                session.rebase = true;
            }
        }
    }

    /// Cancel the session without completing it
    pub fn stop(&mut self) {
        self.session = None;
    }

    pub fn reset(&mut self) {
        self.stop();
    }

    /// True while a session is live and not paused
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.paused)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.paused)
    }

    /// True while a session exists, paused or not
    #[inline]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Target of the active session, if any
    #[inline]
    pub fn target(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.spec.to)
    }
}
