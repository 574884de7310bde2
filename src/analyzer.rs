//! Baseline-relative posture scoring.
//!
//! Turns a validated pose into joint angles, deviations from the reference
//! posture, and a weighted 0-100 score smoothed across frames.

use crate::calibration::CalibrationBaseline;
use crate::constants::{
    DEFAULT_HEAD_FORWARD_IN, DEFAULT_NECK_ANGLE, DEFAULT_SHOULDER_ANGLE, DEFAULT_SPINE_ANGLE,
    HEAD_TOLERANCE_IN, HEAD_WEIGHT, NECK_TOLERANCE_DEG, NECK_WEIGHT, SHOULDER_TOLERANCE_DEG,
    SHOULDER_WEIGHT, SPINE_TOLERANCE_DEG, SPINE_WEIGHT,
};
use crate::geometry::{angle_between, head_forward_distance, horizontal_deviation};
use crate::keypoints::{is_analyzable, KeypointIndex, Pose};
use crate::smoothing::ScoreSmoother;
use serde::{Deserialize, Serialize};

/// Joint angles derived from one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureAngles {
    /// Ear-shoulder-hip angle, degrees
    pub neck_angle: f64,
    /// Shoulder tilt from horizontal, degrees
    pub shoulder_angle: f64,
    /// Shoulder-hip-knee angle, degrees
    pub spine_angle: f64,
    /// Horizontal ear-to-shoulder offset, inches
    pub head_forward_distance: f64,
}

impl PostureAngles {
    /// Neutral reference used when no side of a bilateral measurement is
    /// available and when scoring without a calibration baseline
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            neck_angle: DEFAULT_NECK_ANGLE,
            shoulder_angle: DEFAULT_SHOULDER_ANGLE,
            spine_angle: DEFAULT_SPINE_ANGLE,
            head_forward_distance: DEFAULT_HEAD_FORWARD_IN,
        }
    }
}

/// Absolute per-factor deviations from the reference posture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviations {
    pub neck: f64,
    pub shoulder: f64,
    pub spine: f64,
    pub head_position: f64,
}

/// One analysis cycle's result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureScore {
    /// Smoothed overall score in [0, 100]
    pub overall: u8,
    pub angles: PostureAngles,
    pub deviations: Deviations,
    /// Wall-clock timestamp, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// Map a deviation onto the 0-100 sub-score scale.
///
/// Returns 100 at or below `min`, 0 at or above `max`, and decreases
/// linearly in between; always clamped to `[0, 100]`.
#[must_use]
pub fn normalize_score(deviation: f64, min: f64, max: f64) -> f64 {
    if deviation <= min {
        return 100.0;
    }
    if deviation >= max {
        return 0.0;
    }
    let normalized = 100.0 - ((deviation - min) / (max - min)) * 100.0;
    normalized.clamp(0.0, 100.0)
}

/// Angle at `vertex` if all three landmarks are valid
fn joint_angle(
    pose: &Pose,
    a: KeypointIndex,
    vertex: KeypointIndex,
    b: KeypointIndex,
) -> Option<f64> {
    if pose.is_valid(a) && pose.is_valid(vertex) && pose.is_valid(b) {
        Some(angle_between(
            pose.keypoint(a)?,
            pose.keypoint(vertex)?,
            pose.keypoint(b)?,
        ))
    } else {
        None
    }
}

/// Ear-to-shoulder forward offset if both landmarks are valid
fn ear_shoulder_offset(pose: &Pose, ear: KeypointIndex, shoulder: KeypointIndex) -> Option<f64> {
    if pose.is_valid(ear) && pose.is_valid(shoulder) {
        Some(head_forward_distance(
            pose.keypoint(ear)?,
            pose.keypoint(shoulder)?,
        ))
    } else {
        None
    }
}

/// Average both sides, take the one that measured, or fall back
fn combine_sides(left: Option<f64>, right: Option<f64>, fallback: f64) -> f64 {
    match (left, right) {
        (Some(l), Some(r)) => (l + r) / 2.0,
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (None, None) => fallback,
    }
}

/// Measure joint angles from a pose using the bilateral combination rule.
///
/// Each side of a bilateral metric is computed only when all of its
/// landmarks are valid; both sides average, a single side stands alone, and
/// when neither side is usable the neutral constant fills in. Shoulder tilt
/// has no bilateral variant and needs both shoulders. Returns `None` for
/// indeterminate frames (too many invalid required landmarks).
#[must_use]
pub fn measure_angles(pose: &Pose) -> Option<PostureAngles> {
    if !is_analyzable(pose) {
        return None;
    }

    let neck_angle = combine_sides(
        joint_angle(
            pose,
            KeypointIndex::LeftEar,
            KeypointIndex::LeftShoulder,
            KeypointIndex::LeftHip,
        ),
        joint_angle(
            pose,
            KeypointIndex::RightEar,
            KeypointIndex::RightShoulder,
            KeypointIndex::RightHip,
        ),
        DEFAULT_NECK_ANGLE,
    );

    let spine_angle = combine_sides(
        joint_angle(
            pose,
            KeypointIndex::LeftShoulder,
            KeypointIndex::LeftHip,
            KeypointIndex::LeftKnee,
        ),
        joint_angle(
            pose,
            KeypointIndex::RightShoulder,
            KeypointIndex::RightHip,
            KeypointIndex::RightKnee,
        ),
        DEFAULT_SPINE_ANGLE,
    );

    let head_forward = combine_sides(
        ear_shoulder_offset(pose, KeypointIndex::LeftEar, KeypointIndex::LeftShoulder),
        ear_shoulder_offset(pose, KeypointIndex::RightEar, KeypointIndex::RightShoulder),
        DEFAULT_HEAD_FORWARD_IN,
    );

    let shoulder_angle = if pose.is_valid(KeypointIndex::LeftShoulder)
        && pose.is_valid(KeypointIndex::RightShoulder)
    {
        horizontal_deviation(
            pose.keypoint(KeypointIndex::LeftShoulder)?,
            pose.keypoint(KeypointIndex::RightShoulder)?,
        )
    } else {
        DEFAULT_SHOULDER_ANGLE
    };

    Some(PostureAngles {
        neck_angle,
        shoulder_angle,
        spine_angle,
        head_forward_distance: head_forward,
    })
}

/// Absolute difference of each measured factor from the reference posture
#[must_use]
pub fn compute_deviations(angles: &PostureAngles, reference: &PostureAngles) -> Deviations {
    Deviations {
        neck: (angles.neck_angle - reference.neck_angle).abs(),
        shoulder: (angles.shoulder_angle - reference.shoulder_angle).abs(),
        spine: (angles.spine_angle - reference.spine_angle).abs(),
        head_position: (angles.head_forward_distance - reference.head_forward_distance).abs(),
    }
}

/// Weighted overall score from per-factor deviations, rounded to [0, 100]
#[must_use]
pub fn overall_score(deviations: &Deviations) -> u8 {
    let neck = normalize_score(deviations.neck, NECK_TOLERANCE_DEG.0, NECK_TOLERANCE_DEG.1);
    let shoulder = normalize_score(
        deviations.shoulder,
        SHOULDER_TOLERANCE_DEG.0,
        SHOULDER_TOLERANCE_DEG.1,
    );
    let spine = normalize_score(deviations.spine, SPINE_TOLERANCE_DEG.0, SPINE_TOLERANCE_DEG.1);
    let head = normalize_score(
        deviations.head_position,
        HEAD_TOLERANCE_IN.0,
        HEAD_TOLERANCE_IN.1,
    );

    let weighted =
        neck * NECK_WEIGHT + shoulder * SHOULDER_WEIGHT + spine * SPINE_WEIGHT + head * HEAD_WEIGHT;

    weighted.round().clamp(0.0, 100.0) as u8
}

/// Stateful posture analyzer owning the baseline and smoothing state
#[derive(Debug, Default)]
pub struct PostureAnalyzer {
    baseline: Option<CalibrationBaseline>,
    smoother: ScoreSmoother,
}

impl PostureAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a new calibration baseline; smoothing history restarts so the
    /// next score reflects the new reference immediately
    pub fn set_baseline(&mut self, baseline: CalibrationBaseline) {
        self.baseline = Some(baseline);
        self.smoother.reset();
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&CalibrationBaseline> {
        self.baseline.as_ref()
    }

    pub fn clear_baseline(&mut self) {
        self.baseline = None;
        self.smoother.reset();
    }

    /// Forget smoothing history (called when monitoring stops)
    pub fn reset_smoothing(&mut self) {
        self.smoother.reset();
    }

    /// Analyze one frame into a smoothed posture score.
    ///
    /// Returns `None` for indeterminate frames. The reference is the
    /// calibrated baseline when one is set, the neutral angles otherwise.
    pub fn analyze(&mut self, pose: &Pose, timestamp_ms: u64) -> Option<PostureScore> {
        let angles = measure_angles(pose)?;

        let reference = self
            .baseline
            .as_ref()
            .filter(|b| b.valid)
            .map_or_else(PostureAngles::neutral, |b| b.angles);

        let deviations = compute_deviations(&angles, &reference);
        let raw = overall_score(&deviations);
        let smoothed = self.smoother.apply(f64::from(raw));

        Some(PostureScore {
            overall: smoothed.round().clamp(0.0, 100.0) as u8,
            angles,
            deviations,
            timestamp_ms,
        })
    }
}
