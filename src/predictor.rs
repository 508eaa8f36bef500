//! Completion-time estimation from sampled progress.
//!
//! Feed `(timestamp, value)` pairs as work progresses and ask for a
//! linear extrapolation to a target. The estimate blends a short-window
//! speed with the whole-window average, and carries a confidence score
//! derived from how steady the sampled speeds were.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::time::TickTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorOptions {
    /// Bounded sample window; the oldest sample is evicted on overflow
    pub capacity: usize,
    /// Below this many samples `predict` returns `None`
    pub min_samples: usize,
    /// Samples feeding the short-window speed estimate
    pub speed_window: usize,
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self {
            capacity: 50,
            min_samples: 3,
            speed_window: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Seconds until the target at the blended speed; infinite when
    /// progress has stalled or is moving away from the target
    pub estimated_remaining: f64,
    /// Blended speed in value units per second
    pub speed: f64,
    /// 0 to 1, derived from speed variance across the window
    pub confidence: f64,
}

pub struct ProgressPredictor {
    samples: VecDeque<(TickTime, f64)>,
    options: PredictorOptions,
}

impl ProgressPredictor {
    pub fn new() -> Self {
        Self::with_options(PredictorOptions::default())
    }

    pub fn with_options(mut options: PredictorOptions) -> Self {
        options.capacity = options.capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(options.capacity),
            options,
        }
    }

    pub fn record(&mut self, value: f64, at: TickTime) {
        if self.samples.len() == self.options.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((at, value));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.samples.back().map(|(_, value)| *value)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn options(&self) -> &PredictorOptions {
        &self.options
    }

    /// Estimate time to reach `target`.
    ///
    /// Returns `None` until enough samples have accumulated. A current
    /// value at or past the target yields zero remaining time with full
    /// confidence. The speed is the short-window estimate blended 0.7
    /// to 0.3 with the whole-window average.
    pub fn predict(&self, target: f64) -> Option<Prediction> {
        if self.samples.len() < self.options.min_samples {
            return None;
        }
        let (_, current) = *self.samples.back()?;
        if current >= target {
            return Some(Prediction {
                estimated_remaining: 0.0,
                speed: 0.0,
                confidence: 1.0,
            });
        }

        let samples: Vec<(TickTime, f64)> = self.samples.iter().copied().collect();
        let window = self.options.speed_window.max(2).min(samples.len());
        let current_speed = endpoint_speed(&samples[samples.len() - window..]);
        let average_speed = endpoint_speed(&samples);
        let blended = 0.7 * current_speed + 0.3 * average_speed;

        let remaining = target - current;
        let estimated = if blended <= 0.0 {
            f64::INFINITY
        } else {
            remaining / blended
        };
        Some(Prediction {
            estimated_remaining: estimated,
            speed: blended,
            confidence: confidence(&pair_speeds(&samples)),
        })
    }
}

impl Default for ProgressPredictor {
    fn default() -> Self {
        Self::new()
    }
}

fn endpoint_speed(samples: &[(TickTime, f64)]) -> f64 {
    let (Some(&(t0, v0)), Some(&(t1, v1))) = (samples.first(), samples.last()) else {
        return 0.0;
    };
    let dt = match t1.duration_since(t0) {
        Ok(elapsed) => elapsed.as_seconds(),
        Err(_) => return 0.0,
    };
    if dt <= 0.0 {
        return 0.0;
    }
    (v1 - v0) / dt
}

/// Consecutive-pair speeds; zero-duration pairs are skipped
fn pair_speeds(samples: &[(TickTime, f64)]) -> Vec<f64> {
    samples
        .windows(2)
        .filter_map(|pair| {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            let dt = t1.duration_since(t0).ok()?.as_seconds();
            (dt > 0.0).then(|| (v1 - v0) / dt)
        })
        .collect()
}

fn confidence(speeds: &[f64]) -> f64 {
    if speeds.len() < 2 {
        return 0.5;
    }
    let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
    let variance = speeds.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / speeds.len() as f64;
    let stddev = variance.sqrt();
    if stddev == 0.0 {
        return 1.0;
    }
    if mean == 0.0 {
        return 0.0;
    }
    (1.0 - stddev / mean.abs()).clamp(0.0, 1.0)
}
