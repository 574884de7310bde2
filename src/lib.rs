//! Posture analysis and alerting engine.
//!
//! This library converts a stream of per-frame skeletal keypoint estimates
//! into a stable 0-100 posture quality signal and drives a rate-limited
//! alerting mechanism. It provides:
//! - Confidence gating of individual landmarks
//! - Bilateral joint-angle geometry (neck, shoulder tilt, spine, head-forward)
//! - Calibration-baseline capture with countdown and time-boxed sampling
//! - Baseline-relative deviation scoring with exponential smoothing
//! - Cooldown-gated alert classification
//!
//! The analysis pipeline runs one cycle per scheduling opportunity:
//! 1. A [`provider::PoseProvider`] supplies one pose estimate
//! 2. Keypoint validation decides whether the frame is analyzable
//! 3. Joint angles are measured and scored against the calibrated baseline
//! 4. The smoothed score feeds the debounced notifications and the alert gate
//!
//! # Examples
//!
//! ## Scoring a recorded stream
//!
//! ```no_run
//! use posture_coach::config::Settings;
//! use posture_coach::engine::{EngineEvent, PostureEngine};
//! use posture_coach::provider::ReplayPoseProvider;
//! use posture_coach::storage::unix_millis;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ReplayPoseProvider::from_file("recordings/session.json")?;
//! let mut engine = PostureEngine::new(provider, Settings::default());
//!
//! engine.start_monitoring(unix_millis());
//! loop {
//!     for event in engine.step(unix_millis()) {
//!         match event {
//!             EngineEvent::Score(score) => println!("score: {}", score.overall),
//!             EngineEvent::Alert(alert) => println!("alert: {:?}", alert.severity),
//!             _ => {}
//!         }
//!     }
//!     if engine.provider().is_exhausted() {
//!         break;
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Calibrating a baseline
//!
//! ```no_run
//! use posture_coach::config::Settings;
//! use posture_coach::engine::{EngineEvent, PostureEngine};
//! use posture_coach::provider::ReplayPoseProvider;
//! use posture_coach::storage::unix_millis;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ReplayPoseProvider::from_file("recordings/session.json")?;
//! let mut engine = PostureEngine::new(provider, Settings::default());
//!
//! engine.start_calibration(unix_millis());
//! while engine.is_calibrating() {
//!     for event in engine.step(unix_millis()) {
//!         if let EngineEvent::CalibrationComplete(baseline) = event {
//!             println!("baseline neck angle: {}", baseline.angles.neck_angle);
//!         }
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod analyzer;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod keypoints;
pub mod provider;
pub mod smoothing;
pub mod storage;

pub use error::{Error, Result};
