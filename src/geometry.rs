//! Pure trigonometric functions over keypoints.
//!
//! Everything here is stateless and total: angle results are always in
//! degrees, joint angles are reflected into `[0, 180]`.

use crate::constants::{SHOULDER_WIDTH_INCHES, SHOULDER_WIDTH_PIXELS};
use crate::keypoints::Keypoint;

/// Angle in degrees at `vertex` between the rays toward `a` and `b`.
///
/// Computed as the difference of two `atan2` results and reflected
/// (`360 - angle`) whenever the raw magnitude exceeds 180°, so the result
/// is always in `[0, 180]` and symmetric under swapping `a` and `b`.
#[must_use]
pub fn angle_between(a: &Keypoint, vertex: &Keypoint, b: &Keypoint) -> f64 {
    let radians = (b.y - vertex.y).atan2(b.x - vertex.x) - (a.y - vertex.y).atan2(a.x - vertex.x);

    let mut angle = radians.to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

/// Absolute angle in degrees of the segment `left -> right` from horizontal
#[must_use]
pub fn horizontal_deviation(left: &Keypoint, right: &Keypoint) -> f64 {
    let dy = right.y - left.y;
    let dx = right.x - left.x;
    dy.atan2(dx).to_degrees().abs()
}

/// Horizontal ear-to-shoulder offset converted from pixels to inches.
///
/// The pixel-to-inch ratio assumes an average shoulder width of roughly
/// 100 px ≈ 16 in on screen; this is an approximation, not a calibrated
/// measurement.
#[must_use]
pub fn head_forward_distance(ear: &Keypoint, shoulder: &Keypoint) -> f64 {
    let pixel_distance = (ear.x - shoulder.x).abs();
    pixel_distance * (SHOULDER_WIDTH_INCHES / SHOULDER_WIDTH_PIXELS)
}

/// Euclidean distance between two keypoints, pixels
#[must_use]
pub fn distance(a: &Keypoint, b: &Keypoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}
