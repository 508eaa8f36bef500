//! Time handling for frame timestamps and tween durations.
//! Nanosecond integers keep ordering total and arithmetic exact;
//! floating seconds only appear at the API edges.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// A moment on the frame clock, or a span between two moments
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Serialize, Deserialize, Default)]
pub struct TickTime(u64);

impl TickTime {
    /// Create a tick time from nanoseconds
    #[inline]
    pub fn from_nanos(nanoseconds: u64) -> Self {
        Self(nanoseconds)
    }

    /// Create a tick time from milliseconds
    #[inline]
    pub fn from_millis(milliseconds: f64) -> Result<Self, WidgetError> {
        Self::from_seconds(milliseconds / 1000.0)
    }

    /// Create a tick time from seconds
    #[inline]
    pub fn from_seconds(seconds: f64) -> Result<Self, WidgetError> {
        if seconds < 0.0 || !seconds.is_finite() {
            return Err(WidgetError::InvalidTime { time: seconds });
        }
        let nanos = (seconds * 1_000_000_000.0) as u64;
        Ok(Self(nanos))
    }

    /// Zero time
    #[inline]
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get time in seconds
    #[inline]
    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Get time in milliseconds
    #[inline]
    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Get time in nanoseconds
    #[inline]
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Add a duration to this time
    #[inline]
    pub fn add(&self, duration: TickTime) -> Self {
        Self(self.0.saturating_add(duration.0))
    }

    /// Subtract a duration from this time
    #[inline]
    pub fn sub(&self, duration: TickTime) -> Self {
        Self(self.0.saturating_sub(duration.0))
    }

    /// Get the difference between two times
    #[inline]
    pub fn duration_since(&self, earlier: TickTime) -> Result<TickTime, WidgetError> {
        if self.0 < earlier.0 {
            return Err(WidgetError::InvalidTime {
                time: (self.0 as f64 - earlier.0 as f64) / 1_000_000_000.0,
            });
        }
        Ok(TickTime(self.0 - earlier.0))
    }

    /// Clamp time to a range
    #[inline]
    pub fn clamp(&self, min: TickTime, max: TickTime) -> Self {
        if self.0 < min.0 {
            min
        } else if self.0 > max.0 {
            max
        } else {
            *self
        }
    }
}

impl std::ops::Add for TickTime {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::ops::AddAssign for TickTime {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::ops::Sub for TickTime {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl std::ops::SubAssign for TickTime {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

// Easier conversions
impl From<u64> for TickTime {
    fn from(nanos: u64) -> Self {
        Self::from_nanos(nanos)
    }
}

impl From<TickTime> for u64 {
    fn from(time: TickTime) -> u64 {
        time.0
    }
}

impl From<f64> for TickTime {
    fn from(seconds: f64) -> Self {
        Self::from_seconds(seconds.max(0.0)).unwrap_or(Self::zero())
    }
}

impl From<TickTime> for f64 {
    fn from(time: TickTime) -> f64 {
        time.as_seconds()
    }
}

impl From<Duration> for TickTime {
    fn from(duration: Duration) -> Self {
        TickTime::from_nanos(duration.as_nanos() as u64)
    }
}

impl From<TickTime> for Duration {
    fn from(time: TickTime) -> Duration {
        Duration::from_nanos(time.0)
    }
}
