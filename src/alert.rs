//! Cooldown-gated alert classification.
//!
//! The throttler is a pure time gate between `Armed` and `Cooldown`: once an
//! alert fires, nothing fires again until the cooldown interval elapses, no
//! matter how the score fluctuates. Re-arming is implicit; dismissing the
//! visual alert does not reset the timer.

use crate::constants::{
    ALERT_COOLDOWN_MS, ALERT_DISPLAY_MS, HIGH_SEVERITY_BELOW, MEDIUM_SEVERITY_BELOW,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// How urgently the user should react
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Classify severity from the overall score magnitude
    #[must_use]
    pub fn from_score(overall: u8) -> Self {
        if overall < HIGH_SEVERITY_BELOW {
            Severity::High
        } else if overall < MEDIUM_SEVERITY_BELOW {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// A fired alert, consumed once by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub severity: Severity,
    pub message: String,
    /// How long the alert should stay visible
    pub duration_ms: u64,
    /// Wall-clock fire time, milliseconds since the Unix epoch
    pub fired_at_ms: u64,
}

/// Cooldown-gated alert emitter; `last_alert` is engine-instance state,
/// never ambient module state
#[derive(Debug, Default)]
pub struct AlertThrottler {
    last_alert_ms: Option<u64>,
}

impl AlertThrottler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When the last alert fired, if any
    #[must_use]
    pub fn last_alert_ms(&self) -> Option<u64> {
        self.last_alert_ms
    }

    /// Evaluate one scored frame against the threshold.
    ///
    /// Fires iff the score is below `alert_threshold` and the cooldown
    /// interval has elapsed since the previous alert.
    pub fn observe(&mut self, overall: u8, alert_threshold: u8, now_ms: u64) -> Option<AlertEvent> {
        if overall >= alert_threshold {
            return None;
        }

        if let Some(last) = self.last_alert_ms {
            if now_ms.saturating_sub(last) < ALERT_COOLDOWN_MS {
                return None;
            }
        }

        let severity = Severity::from_score(overall);
        debug!("Alert fired: score {overall}, severity {severity:?}");
        self.last_alert_ms = Some(now_ms);
        Some(AlertEvent {
            severity,
            message: "Time to sit up straight!".to_string(),
            duration_ms: ALERT_DISPLAY_MS,
            fired_at_ms: now_ms,
        })
    }

    /// Forget throttling history (new monitoring session)
    pub fn reset(&mut self) {
        self.last_alert_ms = None;
    }
}
