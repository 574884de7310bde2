//! Fixed engine configuration shared across the analysis pipeline.

/// Number of keypoints in a full-body pose (COCO layout)
pub const NUM_KEYPOINTS: usize = 17;

/// Minimum confidence for a keypoint to count as valid
pub const MIN_KEYPOINT_CONFIDENCE: f32 = 0.2;

/// Maximum tolerated invalid landmarks among the 8 required ones.
/// One more and the frame is analyzed as indeterminate.
pub const MAX_INVALID_REQUIRED: usize = 4;

/// Neutral neck angle (ear-shoulder-hip), degrees
pub const DEFAULT_NECK_ANGLE: f64 = 165.0;

/// Neutral shoulder tilt from horizontal, degrees
pub const DEFAULT_SHOULDER_ANGLE: f64 = 0.0;

/// Neutral spine angle (shoulder-hip-knee), degrees
pub const DEFAULT_SPINE_ANGLE: f64 = 175.0;

/// Neutral head-forward offset, inches
pub const DEFAULT_HEAD_FORWARD_IN: f64 = 1.5;

/// Assumed shoulder width on screen, pixels
pub const SHOULDER_WIDTH_PIXELS: f64 = 100.0;

/// Average adult shoulder width, inches
pub const SHOULDER_WIDTH_INCHES: f64 = 16.0;

/// Deviation tolerance ranges mapped onto the 0-100 sub-score scale
pub const NECK_TOLERANCE_DEG: (f64, f64) = (0.0, 30.0);
pub const SHOULDER_TOLERANCE_DEG: (f64, f64) = (0.0, 15.0);
pub const SPINE_TOLERANCE_DEG: (f64, f64) = (0.0, 30.0);
pub const HEAD_TOLERANCE_IN: (f64, f64) = (0.0, 3.0);

/// Per-factor weights for the overall score (sum to 1.0)
pub const NECK_WEIGHT: f64 = 0.30;
pub const SHOULDER_WEIGHT: f64 = 0.20;
pub const SPINE_WEIGHT: f64 = 0.30;
pub const HEAD_WEIGHT: f64 = 0.20;

/// Weight given to the previous value when smoothing the overall score
pub const SMOOTHING_FACTOR: f64 = 0.8;

/// Minimum interval between pose provider queries (target 10 Hz)
pub const DETECTION_INTERVAL_MS: u64 = 100;

/// Minimum interval between debounced score notifications
pub const SCORE_UPDATE_INTERVAL_MS: u64 = 500;

/// Smoothed-score delta that bypasses the score-update debounce
pub const SCORE_DELTA_THRESHOLD: i32 = 5;

/// Minimum interval between fired alerts
pub const ALERT_COOLDOWN_MS: u64 = 30_000;

/// How long a fired alert should stay visible
pub const ALERT_DISPLAY_MS: u64 = 5_000;

/// Scores below this are classified as high severity
pub const HIGH_SEVERITY_BELOW: u8 = 40;

/// Scores below this (and at/above the high cutoff) are medium severity
pub const MEDIUM_SEVERITY_BELOW: u8 = 60;

/// Calibration countdown before capture begins, seconds
pub const CALIBRATION_COUNTDOWN_SECS: u64 = 5;

/// Length of the calibration capture window, milliseconds
pub const CALIBRATION_WINDOW_MS: u64 = 2_000;

/// Sampling interval inside the calibration capture window
pub const CALIBRATION_SAMPLE_INTERVAL_MS: u64 = 100;

/// Session history retention window
pub const SESSION_RETENTION_MS: u64 = 30 * 24 * 60 * 60 * 1_000;
