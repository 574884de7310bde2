//! Exponential smoothing for the overall posture score.

use crate::constants::SMOOTHING_FACTOR;

/// Blend a new value with the previous one.
///
/// `factor` is the weight given to the previous value; the first value in a
/// sequence passes through unchanged.
#[must_use]
pub fn smooth(current: f64, previous: Option<f64>, factor: f64) -> f64 {
    match previous {
        Some(prev) => prev * factor + current * (1.0 - factor),
        None => current,
    }
}

/// Exponential smoother holding the running smoothed value.
///
/// Applied to the overall score only, never to individual angles. The state
/// is reset whenever monitoring stops or a new calibration baseline is
/// committed.
#[derive(Debug)]
pub struct ScoreSmoother {
    factor: f64,
    last: Option<f64>,
}

impl Default for ScoreSmoother {
    fn default() -> Self {
        Self::new(SMOOTHING_FACTOR)
    }
}

impl ScoreSmoother {
    /// Create a smoother with the given previous-value weight
    #[must_use]
    pub fn new(factor: f64) -> Self {
        assert!((0.0..1.0).contains(&factor), "Factor must be in [0, 1)");
        Self { factor, last: None }
    }

    /// Apply smoothing to the next raw value
    pub fn apply(&mut self, current: f64) -> f64 {
        let smoothed = smooth(current, self.last, self.factor);
        self.last = Some(smoothed);
        smoothed
    }

    /// Reset smoother state
    pub fn reset(&mut self) {
        self.last = None;
    }
}
