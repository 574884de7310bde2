//! Calibration-baseline capture.
//!
//! A one-shot state machine: `Idle -> Countdown(5 s) -> Capturing(2 s window,
//! sampled every 100 ms) -> Complete`. The sampler owns only timing and the
//! sample buffer; the engine performs the actual pose queries so that
//! provider access stays single-flight.

use crate::analyzer::PostureAngles;
use crate::constants::{
    CALIBRATION_COUNTDOWN_SECS, CALIBRATION_SAMPLE_INTERVAL_MS, CALIBRATION_WINDOW_MS,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Subject-specific reference posture captured by a calibration run.
///
/// Immutable after creation and superseded only by a new run; persists across
/// monitoring sessions until recalibrated or cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    pub angles: PostureAngles,
    /// Wall-clock capture time, milliseconds since the Unix epoch
    pub captured_at_ms: u64,
    pub valid: bool,
}

impl CalibrationBaseline {
    /// Baseline from averaged samples
    #[must_use]
    pub fn from_angles(angles: PostureAngles, captured_at_ms: u64) -> Self {
        Self {
            angles,
            captured_at_ms,
            valid: true,
        }
    }

    /// Fallback baseline from the neutral angles, used when a calibration
    /// run captures no usable samples. Still a fully valid baseline:
    /// calibration never fails from the caller's perspective.
    #[must_use]
    pub fn fallback(captured_at_ms: u64) -> Self {
        Self::from_angles(PostureAngles::neutral(), captured_at_ms)
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Countdown {
        started_ms: u64,
        ticks_announced: u64,
    },
    Capturing {
        started_ms: u64,
        last_sample_ms: Option<u64>,
    },
}

/// What the sampler wants from the engine on this scheduling opportunity
#[derive(Debug)]
pub enum SamplerStep {
    /// No calibration run in progress
    Idle,
    /// Run in progress, nothing due yet
    Waiting,
    /// A countdown second elapsed; surface it to the presentation layer
    CountdownTick { seconds_left: u64 },
    /// The capture window wants one pose sample now
    SampleDue,
    /// The run finished; the baseline is ready to commit
    Complete(CalibrationBaseline),
}

/// Time-boxed multi-sample capture producing a [`CalibrationBaseline`]
#[derive(Debug, Default)]
pub struct CalibrationSampler {
    state: State,
    samples: Vec<PostureAngles>,
}

impl Default for State {
    fn default() -> Self {
        State::Idle
    }
}

impl CalibrationSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a calibration run is in progress
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Number of samples buffered so far in the current run
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Begin a calibration run. A run already in progress is restarted.
    pub fn start(&mut self, now_ms: u64) {
        info!(
            "Starting calibration: {}s countdown, {}ms capture window",
            CALIBRATION_COUNTDOWN_SECS, CALIBRATION_WINDOW_MS
        );
        self.samples.clear();
        self.state = State::Countdown {
            started_ms: now_ms,
            ticks_announced: 0,
        };
    }

    /// Abort the current run, discarding partial samples
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("Calibration cancelled, discarding {} samples", self.samples.len());
        }
        self.samples.clear();
        self.state = State::Idle;
    }

    /// Buffer one measured angle set from a capture-window query
    pub fn push_sample(&mut self, angles: PostureAngles) {
        if matches!(self.state, State::Capturing { .. }) {
            self.samples.push(angles);
        }
    }

    /// Advance the state machine to `now_ms` and report what is due
    pub fn poll(&mut self, now_ms: u64) -> SamplerStep {
        match self.state {
            State::Idle => SamplerStep::Idle,
            State::Countdown {
                started_ms,
                ticks_announced,
            } => {
                let elapsed = now_ms.saturating_sub(started_ms);
                let seconds_elapsed = elapsed / 1_000;
                if seconds_elapsed >= CALIBRATION_COUNTDOWN_SECS {
                    debug!("Countdown finished, entering capture window");
                    self.state = State::Capturing {
                        started_ms: now_ms,
                        last_sample_ms: Some(now_ms),
                    };
                    return SamplerStep::SampleDue;
                }
                if seconds_elapsed > ticks_announced {
                    self.state = State::Countdown {
                        started_ms,
                        ticks_announced: seconds_elapsed,
                    };
                    return SamplerStep::CountdownTick {
                        seconds_left: CALIBRATION_COUNTDOWN_SECS - seconds_elapsed,
                    };
                }
                SamplerStep::Waiting
            }
            State::Capturing {
                started_ms,
                last_sample_ms,
            } => {
                let elapsed = now_ms.saturating_sub(started_ms);
                if elapsed >= CALIBRATION_WINDOW_MS {
                    return SamplerStep::Complete(self.finish(now_ms));
                }
                let sample_due = match last_sample_ms {
                    Some(last) => now_ms.saturating_sub(last) >= CALIBRATION_SAMPLE_INTERVAL_MS,
                    None => true,
                };
                if sample_due {
                    self.state = State::Capturing {
                        started_ms,
                        last_sample_ms: Some(now_ms),
                    };
                    return SamplerStep::SampleDue;
                }
                SamplerStep::Waiting
            }
        }
    }

    /// Average the buffered samples into a baseline and return to idle
    fn finish(&mut self, now_ms: u64) -> CalibrationBaseline {
        let baseline = if self.samples.is_empty() {
            info!("Calibration captured no samples, using neutral baseline");
            CalibrationBaseline::fallback(now_ms)
        } else {
            let n = self.samples.len() as f64;
            let angles = PostureAngles {
                neck_angle: self.samples.iter().map(|s| s.neck_angle).sum::<f64>() / n,
                shoulder_angle: self.samples.iter().map(|s| s.shoulder_angle).sum::<f64>() / n,
                spine_angle: self.samples.iter().map(|s| s.spine_angle).sum::<f64>() / n,
                head_forward_distance: self
                    .samples
                    .iter()
                    .map(|s| s.head_forward_distance)
                    .sum::<f64>()
                    / n,
            };
            info!("Calibration complete from {} samples", self.samples.len());
            CalibrationBaseline::from_angles(angles, now_ms)
        };
        self.samples.clear();
        self.state = State::Idle;
        baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(neck: f64, shoulder: f64, spine: f64, head: f64) -> PostureAngles {
        PostureAngles {
            neck_angle: neck,
            shoulder_angle: shoulder,
            spine_angle: spine,
            head_forward_distance: head,
        }
    }

    #[test]
    fn test_idle_until_started() {
        let mut sampler = CalibrationSampler::new();
        assert!(!sampler.is_active());
        assert!(matches!(sampler.poll(0), SamplerStep::Idle));
    }

    #[test]
    fn test_countdown_ticks_once_per_second() {
        let mut sampler = CalibrationSampler::new();
        sampler.start(0);

        assert!(matches!(sampler.poll(500), SamplerStep::Waiting));
        match sampler.poll(1_050) {
            SamplerStep::CountdownTick { seconds_left } => assert_eq!(seconds_left, 4),
            step => panic!("expected countdown tick, got {step:?}"),
        }
        // Same second polls again without a duplicate tick
        assert!(matches!(sampler.poll(1_900), SamplerStep::Waiting));
        match sampler.poll(2_000) {
            SamplerStep::CountdownTick { seconds_left } => assert_eq!(seconds_left, 3),
            step => panic!("expected countdown tick, got {step:?}"),
        }
    }

    #[test]
    fn test_capture_window_samples_and_averages() {
        let mut sampler = CalibrationSampler::new();
        sampler.start(0);

        // Countdown elapses; first sample is due immediately
        assert!(matches!(sampler.poll(5_000), SamplerStep::SampleDue));
        sampler.push_sample(angles(160.0, 0.0, 170.0, 1.0));

        assert!(matches!(sampler.poll(5_050), SamplerStep::Waiting));
        assert!(matches!(sampler.poll(5_100), SamplerStep::SampleDue));
        sampler.push_sample(angles(170.0, 4.0, 180.0, 2.0));

        let baseline = match sampler.poll(7_000) {
            SamplerStep::Complete(baseline) => baseline,
            step => panic!("expected completion, got {step:?}"),
        };
        assert!(baseline.valid);
        assert_eq!(baseline.captured_at_ms, 7_000);
        assert!((baseline.angles.neck_angle - 165.0).abs() < 1e-9);
        assert!((baseline.angles.shoulder_angle - 2.0).abs() < 1e-9);
        assert!((baseline.angles.spine_angle - 175.0).abs() < 1e-9);
        assert!((baseline.angles.head_forward_distance - 1.5).abs() < 1e-9);
        assert!(!sampler.is_active());
    }

    #[test]
    fn test_zero_samples_falls_back_to_neutral() {
        let mut sampler = CalibrationSampler::new();
        sampler.start(0);
        // Drain the whole run without pushing any sample
        let mut now = 0;
        let baseline = loop {
            now += 100;
            if let SamplerStep::Complete(baseline) = sampler.poll(now) {
                break baseline;
            }
            assert!(now < 10_000, "calibration never completed");
        };
        assert!(baseline.valid);
        assert_eq!(baseline.angles, PostureAngles::neutral());
    }

    #[test]
    fn test_cancel_discards_run() {
        let mut sampler = CalibrationSampler::new();
        sampler.start(0);
        assert!(matches!(sampler.poll(5_000), SamplerStep::SampleDue));
        sampler.push_sample(angles(160.0, 0.0, 170.0, 1.0));

        sampler.cancel();
        assert!(!sampler.is_active());
        assert_eq!(sampler.sample_count(), 0);
        assert!(matches!(sampler.poll(6_000), SamplerStep::Idle));
    }

    #[test]
    fn test_samples_ignored_outside_capture() {
        let mut sampler = CalibrationSampler::new();
        sampler.push_sample(angles(160.0, 0.0, 170.0, 1.0));
        assert_eq!(sampler.sample_count(), 0);

        sampler.start(0);
        sampler.push_sample(angles(160.0, 0.0, 170.0, 1.0));
        // Still counting down; sample must not register
        assert_eq!(sampler.sample_count(), 0);
    }
}
