//! Keypoint and pose data structures with confidence gating.
//!
//! A pose is one frame's set of 17 anatomical landmarks in the COCO/MoveNet
//! index layout. Individual landmarks carry an optional confidence score;
//! the validator decides which of them are usable for analysis.

use crate::constants::{MAX_INVALID_REQUIRED, MIN_KEYPOINT_CONFIDENCE, NUM_KEYPOINTS};
use serde::{Deserialize, Serialize};

/// A named 2D anatomical landmark estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keypoint {
    /// X coordinate in pixel space
    pub x: f64,
    /// Y coordinate in pixel space
    pub y: f64,
    /// Detection confidence in [0, 1], absent when the model gave none
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Landmark name (e.g. "left_shoulder")
    #[serde(default)]
    pub name: Option<String>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, confidence: f32) -> Self {
        Self {
            x,
            y,
            confidence: Some(confidence),
            name: None,
        }
    }

    /// A keypoint is valid iff its confidence is defined and meets the threshold
    #[must_use]
    pub fn is_valid(&self, min_confidence: f32) -> bool {
        self.confidence.is_some_and(|c| c >= min_confidence)
    }
}

/// One frame's full set of keypoints plus overall confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    /// Overall pose confidence reported by the model
    #[serde(default)]
    pub score: Option<f32>,
}

impl Pose {
    /// Look up a landmark by its fixed index
    #[must_use]
    pub fn keypoint(&self, index: KeypointIndex) -> Option<&Keypoint> {
        self.keypoints.get(index as usize)
    }

    /// Whether the landmark at `index` is present and valid
    #[must_use]
    pub fn is_valid(&self, index: KeypointIndex) -> bool {
        self.keypoint(index)
            .is_some_and(|kp| kp.is_valid(MIN_KEYPOINT_CONFIDENCE))
    }
}

/// COCO keypoint indices as produced by MoveNet-style detectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

/// The 8 landmarks posture analysis depends on
pub const REQUIRED_LANDMARKS: [KeypointIndex; 8] = [
    KeypointIndex::LeftEar,
    KeypointIndex::RightEar,
    KeypointIndex::LeftShoulder,
    KeypointIndex::RightShoulder,
    KeypointIndex::LeftHip,
    KeypointIndex::RightHip,
    KeypointIndex::LeftKnee,
    KeypointIndex::RightKnee,
];

/// Count invalid landmarks among the required set
#[must_use]
pub fn count_invalid_required(pose: &Pose) -> usize {
    REQUIRED_LANDMARKS
        .iter()
        .filter(|&&idx| !pose.is_valid(idx))
        .count()
}

/// Whether a frame carries enough valid landmarks to be analyzed.
///
/// Short poses and frames with more than 4 invalid required landmarks are
/// indeterminate: no score is produced for the cycle, which is not an error.
#[must_use]
pub fn is_analyzable(pose: &Pose) -> bool {
    pose.keypoints.len() >= NUM_KEYPOINTS && count_invalid_required(pose) <= MAX_INVALID_REQUIRED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_with_confidences(confidences: [f32; NUM_KEYPOINTS]) -> Pose {
        Pose {
            keypoints: confidences
                .iter()
                .map(|&c| Keypoint::new(0.0, 0.0, c))
                .collect(),
            score: Some(0.9),
        }
    }

    #[test]
    fn test_keypoint_validity_threshold() {
        let kp = Keypoint::new(10.0, 20.0, 0.2);
        assert!(kp.is_valid(0.2));
        assert!(!kp.is_valid(0.3));

        let undefined = Keypoint {
            x: 10.0,
            y: 20.0,
            confidence: None,
            name: None,
        };
        assert!(!undefined.is_valid(0.0));
    }

    #[test]
    fn test_count_invalid_ignores_optional_landmarks() {
        let mut confidences = [0.9_f32; NUM_KEYPOINTS];
        // Invalid eyes and wrists must not count against the required set
        confidences[KeypointIndex::LeftEye as usize] = 0.0;
        confidences[KeypointIndex::RightEye as usize] = 0.0;
        confidences[KeypointIndex::LeftWrist as usize] = 0.0;
        let pose = pose_with_confidences(confidences);
        assert_eq!(count_invalid_required(&pose), 0);
        assert!(is_analyzable(&pose));
    }

    #[test]
    fn test_indeterminate_above_four_invalid() {
        let mut confidences = [0.9_f32; NUM_KEYPOINTS];
        for idx in [
            KeypointIndex::LeftEar,
            KeypointIndex::RightEar,
            KeypointIndex::LeftHip,
            KeypointIndex::RightHip,
        ] {
            confidences[idx as usize] = 0.1;
        }
        let pose = pose_with_confidences(confidences);
        assert_eq!(count_invalid_required(&pose), 4);
        assert!(is_analyzable(&pose));

        let mut confidences = confidences;
        confidences[KeypointIndex::LeftKnee as usize] = 0.1;
        let pose = pose_with_confidences(confidences);
        assert_eq!(count_invalid_required(&pose), 5);
        assert!(!is_analyzable(&pose));
    }

    #[test]
    fn test_short_pose_is_indeterminate() {
        let pose = Pose {
            keypoints: vec![Keypoint::new(0.0, 0.0, 0.9); 10],
            score: None,
        };
        assert!(!is_analyzable(&pose));
    }
}
