//! Helper functions and utilities for tests

use posture_coach::keypoints::{Keypoint, KeypointIndex, Pose};

/// Build a pose with every landmark valid and two vertical landmark columns
/// (left side at x=100, right side at x=200): straight neck and spine,
/// level shoulders, ears directly above shoulders.
pub fn upright_pose() -> Pose {
    let mut keypoints = vec![Keypoint::new(150.0, 40.0, 0.9); 17];
    for (left, right, y) in [
        (KeypointIndex::LeftEar, KeypointIndex::RightEar, 100.0),
        (KeypointIndex::LeftShoulder, KeypointIndex::RightShoulder, 200.0),
        (KeypointIndex::LeftHip, KeypointIndex::RightHip, 300.0),
        (KeypointIndex::LeftKnee, KeypointIndex::RightKnee, 400.0),
    ] {
        keypoints[left as usize] = Keypoint::new(100.0, y, 0.9);
        keypoints[right as usize] = Keypoint::new(200.0, y, 0.9);
    }
    Pose {
        keypoints,
        score: Some(0.9),
    }
}

/// Upright pose with the head dropped forward: both ears shifted 45° toward
/// the camera, bending the neck to 135° and pushing the ear-shoulder offset
/// far past the head-forward tolerance. Spine and shoulders stay neutral.
pub fn slouched_pose() -> Pose {
    let mut pose = upright_pose();
    let forward = 100.0 * std::f64::consts::FRAC_1_SQRT_2;
    for (ear, base_x) in [
        (KeypointIndex::LeftEar, 100.0),
        (KeypointIndex::RightEar, 200.0),
    ] {
        pose.keypoints[ear as usize] = Keypoint::new(base_x + forward, 200.0 - forward, 0.9);
    }
    pose
}

/// Upright pose with the given landmarks degraded below the confidence
/// threshold
pub fn pose_with_invalid(indices: &[KeypointIndex]) -> Pose {
    let mut pose = upright_pose();
    for &idx in indices {
        pose.keypoints[idx as usize].confidence = Some(0.05);
    }
    pose
}
