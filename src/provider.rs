//! Pose provider boundary.
//!
//! The engine never runs inference itself; it queries a [`PoseProvider`] for
//! at most one pose per cycle. Construction doubles as initialization, so a
//! model or stream that cannot be opened surfaces as an error before
//! monitoring starts. Resources are released on drop.

use crate::error::{Error, Result};
use crate::keypoints::Pose;
use log::info;
use std::path::Path;

/// Source of per-frame pose estimates.
///
/// Implementations must expect exactly one in-flight query at a time; the
/// engine guarantees this by owning the provider behind a single `&mut`
/// borrow.
pub trait PoseProvider {
    /// Query one pose estimate.
    ///
    /// `Ok(None)` means no subject was found in the frame; errors are
    /// transient per-frame failures, after which the loop continues.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Detection`] on transient inference failure.
    fn detect_pose(&mut self) -> Result<Option<Pose>>;
}

/// Provider that replays a recorded pose stream from a JSON file.
///
/// The file holds one entry per frame, `null` where the detector saw no
/// subject. Useful for offline analysis and deterministic tests, standing in
/// for a live camera the way a video file would.
#[derive(Debug)]
pub struct ReplayPoseProvider {
    frames: Vec<Option<Pose>>,
    cursor: usize,
}

impl ReplayPoseProvider {
    /// Load a recorded stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderInit`] when the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::ProviderInit(format!("cannot read pose stream: {e}")))?;
        let frames: Vec<Option<Pose>> = serde_json::from_str(&content)
            .map_err(|e| Error::ProviderInit(format!("cannot parse pose stream: {e}")))?;
        info!(
            "Loaded {} recorded frames from {}",
            frames.len(),
            path.as_ref().display()
        );
        Ok(Self { frames, cursor: 0 })
    }

    /// Build a provider from in-memory frames
    #[must_use]
    pub fn from_frames(frames: Vec<Option<Pose>>) -> Self {
        Self { frames, cursor: 0 }
    }

    /// Whether every recorded frame has been served
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.frames.len()
    }
}

impl PoseProvider for ReplayPoseProvider {
    fn detect_pose(&mut self) -> Result<Option<Pose>> {
        match self.frames.get(self.cursor) {
            Some(frame) => {
                self.cursor += 1;
                Ok(frame.clone())
            }
            None => Ok(None),
        }
    }
}
