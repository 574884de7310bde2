//! Monitoring engine and detection scheduler.
//!
//! The engine sequences the whole pipeline on a cooperative, poll-driven
//! cadence: the host calls [`PostureEngine::step`] on every scheduling
//! opportunity and the engine decides whether this opportunity runs a
//! detection (at most one per 100 ms), drives a calibration run, or does
//! nothing. All per-session mutable state lives on the engine instance;
//! events are returned synchronously to the caller instead of being pushed
//! through callbacks.
//!
//! Because the engine owns the pose provider behind a single `&mut` borrow,
//! provider access is single-flight by construction: a calibration run
//! suspends the monitoring loop instead of racing it for the provider.

use crate::alert::{AlertEvent, AlertThrottler};
use crate::analyzer::{measure_angles, PostureAnalyzer, PostureScore};
use crate::calibration::{CalibrationBaseline, CalibrationSampler, SamplerStep};
use crate::config::Settings;
use crate::constants::{DETECTION_INTERVAL_MS, SCORE_DELTA_THRESHOLD, SCORE_UPDATE_INTERVAL_MS};
use crate::provider::PoseProvider;
use crate::storage::SessionRecord;
use log::{debug, info, warn};

/// Events surfaced to the presentation layer from one scheduling step
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Debounced score notification
    Score(PostureScore),
    /// A throttled alert fired
    Alert(AlertEvent),
    /// Calibration countdown advanced by one second
    CalibrationCountdown { seconds_left: u64 },
    /// Calibration finished and the baseline was committed
    CalibrationComplete(CalibrationBaseline),
}

/// Running aggregate for the active monitoring session
#[derive(Debug)]
struct SessionStats {
    started_at_ms: u64,
    score_sum: f64,
    samples: u32,
}

impl SessionStats {
    fn begin(now_ms: u64) -> Self {
        Self {
            started_at_ms: now_ms,
            score_sum: 0.0,
            samples: 0,
        }
    }

    fn record(&mut self, overall: u8) {
        self.score_sum += f64::from(overall);
        self.samples += 1;
    }

    fn finish(self, now_ms: u64) -> SessionRecord {
        let average = if self.samples == 0 {
            0.0
        } else {
            self.score_sum / f64::from(self.samples)
        };
        SessionRecord {
            started_at_ms: self.started_at_ms,
            ended_at_ms: now_ms,
            duration_ms: now_ms.saturating_sub(self.started_at_ms),
            average_score: average,
            samples: self.samples,
        }
    }
}

/// Posture monitoring engine owning the provider and all pipeline state.
///
/// An application owns exactly one engine per monitored subject; dropping
/// the engine releases the provider.
pub struct PostureEngine<P: PoseProvider> {
    provider: P,
    analyzer: PostureAnalyzer,
    sampler: CalibrationSampler,
    throttler: AlertThrottler,
    settings: Settings,
    monitoring: bool,
    last_detection_ms: Option<u64>,
    last_emit_ms: Option<u64>,
    last_emitted_score: Option<u8>,
    session: Option<SessionStats>,
}

impl<P: PoseProvider> PostureEngine<P> {
    #[must_use]
    pub fn new(provider: P, settings: Settings) -> Self {
        Self {
            provider,
            analyzer: PostureAnalyzer::new(),
            sampler: CalibrationSampler::new(),
            throttler: AlertThrottler::new(),
            settings,
            monitoring: false,
            last_detection_ms: None,
            last_emit_ms: None,
            last_emitted_score: None,
            session: None,
        }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&CalibrationBaseline> {
        self.analyzer.baseline()
    }

    /// Commit a baseline (e.g. one loaded from the store)
    pub fn set_baseline(&mut self, baseline: CalibrationBaseline) {
        self.analyzer.set_baseline(baseline);
    }

    pub fn clear_baseline(&mut self) {
        self.analyzer.clear_baseline();
    }

    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    #[must_use]
    pub fn is_calibrating(&self) -> bool {
        self.sampler.is_active()
    }

    /// Begin a monitoring session
    pub fn start_monitoring(&mut self, now_ms: u64) {
        if self.monitoring {
            return;
        }
        info!("Monitoring started");
        self.monitoring = true;
        self.analyzer.reset_smoothing();
        self.last_detection_ms = None;
        self.last_emit_ms = None;
        self.last_emitted_score = None;
        self.session = Some(SessionStats::begin(now_ms));
    }

    /// End the monitoring session, discarding any pending opportunity.
    ///
    /// Returns the finished session summary for persistence.
    pub fn stop_monitoring(&mut self, now_ms: u64) -> Option<SessionRecord> {
        if !self.monitoring {
            return None;
        }
        info!("Monitoring stopped");
        self.monitoring = false;
        self.analyzer.reset_smoothing();
        self.last_detection_ms = None;
        self.last_emit_ms = None;
        self.last_emitted_score = None;
        self.session.take().map(|stats| stats.finish(now_ms))
    }

    /// Begin a calibration run. While it is active the monitoring loop is
    /// suspended so the provider only ever serves one client.
    pub fn start_calibration(&mut self, now_ms: u64) {
        self.sampler.start(now_ms);
    }

    /// Abort the calibration run without committing a baseline
    pub fn cancel_calibration(&mut self) {
        self.sampler.cancel();
    }

    /// Run one scheduling opportunity.
    ///
    /// `now_ms` must be non-decreasing across calls. Returns the events the
    /// presentation layer should handle for this step; an empty vector is
    /// the common case.
    pub fn step(&mut self, now_ms: u64) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if self.sampler.is_active() {
            self.step_calibration(now_ms, &mut events);
            return events;
        }

        if !self.monitoring || !self.detection_due(now_ms) {
            return events;
        }
        self.last_detection_ms = Some(now_ms);

        let pose = match self.provider.detect_pose() {
            Ok(Some(pose)) => pose,
            // No subject in frame; try again next opportunity
            Ok(None) => return events,
            Err(e) => {
                warn!("Dropping frame after detection failure: {e}");
                return events;
            }
        };

        // Indeterminate frames produce no score and are not errors
        let Some(score) = self.analyzer.analyze(&pose, now_ms) else {
            return events;
        };

        if let Some(stats) = self.session.as_mut() {
            stats.record(score.overall);
        }

        let alert = self
            .throttler
            .observe(score.overall, self.settings.alert_threshold, now_ms);

        if self.should_emit(score.overall, now_ms) {
            self.last_emit_ms = Some(now_ms);
            self.last_emitted_score = Some(score.overall);
            events.push(EngineEvent::Score(score));
        }
        if let Some(alert) = alert {
            events.push(EngineEvent::Alert(alert));
        }
        events
    }

    fn step_calibration(&mut self, now_ms: u64, events: &mut Vec<EngineEvent>) {
        match self.sampler.poll(now_ms) {
            SamplerStep::Idle | SamplerStep::Waiting => {}
            SamplerStep::CountdownTick { seconds_left } => {
                events.push(EngineEvent::CalibrationCountdown { seconds_left });
            }
            SamplerStep::SampleDue => match self.provider.detect_pose() {
                Ok(Some(pose)) => {
                    if let Some(angles) = measure_angles(&pose) {
                        self.sampler.push_sample(angles);
                    }
                }
                Ok(None) => debug!("Calibration tick saw no subject"),
                Err(e) => warn!("Calibration sample dropped: {e}"),
            },
            SamplerStep::Complete(baseline) => {
                self.analyzer.set_baseline(baseline.clone());
                events.push(EngineEvent::CalibrationComplete(baseline));
            }
        }
    }

    /// Frame-rate gate: run at most one detection per interval
    fn detection_due(&self, now_ms: u64) -> bool {
        match self.last_detection_ms {
            Some(last) => now_ms.saturating_sub(last) >= DETECTION_INTERVAL_MS,
            None => true,
        }
    }

    /// Debounce gate for score notifications: at most one per interval,
    /// except immediately on a jump larger than the delta threshold
    fn should_emit(&self, overall: u8, now_ms: u64) -> bool {
        let Some(previous) = self.last_emitted_score else {
            return true;
        };
        if (i32::from(overall) - i32::from(previous)).abs() > SCORE_DELTA_THRESHOLD {
            return true;
        }
        match self.last_emit_ms {
            Some(last) => now_ms.saturating_sub(last) >= SCORE_UPDATE_INTERVAL_MS,
            None => true,
        }
    }
}
