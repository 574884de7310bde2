//! Integration tests for the monitoring engine: scheduling, debounce,
//! alerting and session lifecycle

mod test_helpers;

use posture_coach::analyzer::measure_angles;
use posture_coach::calibration::CalibrationBaseline;
use posture_coach::config::Settings;
use posture_coach::engine::{EngineEvent, PostureEngine};
use posture_coach::keypoints::{KeypointIndex, Pose};
use posture_coach::provider::PoseProvider;
use posture_coach::Error;
use test_helpers::{pose_with_invalid, slouched_pose, upright_pose};

/// Provider fed from a scripted queue of results; repeats the last entry
/// once the queue runs dry
struct ScriptedProvider {
    script: Vec<posture_coach::Result<Option<Pose>>>,
    cursor: usize,
    queries: usize,
}

impl ScriptedProvider {
    fn new(script: Vec<posture_coach::Result<Option<Pose>>>) -> Self {
        assert!(!script.is_empty());
        Self {
            script,
            cursor: 0,
            queries: 0,
        }
    }

    fn repeating(pose: Pose) -> Self {
        Self::new(vec![Ok(Some(pose))])
    }
}

impl PoseProvider for ScriptedProvider {
    fn detect_pose(&mut self) -> posture_coach::Result<Option<Pose>> {
        self.queries += 1;
        let entry = &self.script[self.cursor.min(self.script.len() - 1)];
        self.cursor += 1;
        match entry {
            Ok(frame) => Ok(frame.clone()),
            Err(Error::Detection(msg)) => Err(Error::Detection(msg.clone())),
            Err(_) => unreachable!("scripts only carry detection errors"),
        }
    }
}

fn settings_with_threshold(alert_threshold: u8) -> Settings {
    Settings {
        alert_threshold,
        ..Settings::default()
    }
}

fn scores(events: &[EngineEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Score(score) => Some(score.overall),
            _ => None,
        })
        .collect()
}

fn alerts(events: &[EngineEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EngineEvent::Alert(_)))
        .count()
}

#[test]
fn test_first_score_emits_immediately() {
    let mut engine = PostureEngine::new(
        ScriptedProvider::repeating(upright_pose()),
        Settings::default(),
    );
    engine.start_monitoring(0);
    let events = engine.step(0);
    assert_eq!(scores(&events), vec![70]);
}

#[test]
fn test_score_updates_are_debounced() {
    let mut engine = PostureEngine::new(
        ScriptedProvider::repeating(upright_pose()),
        Settings::default(),
    );
    engine.start_monitoring(0);

    let mut emitted_at = Vec::new();
    for t in (0..=1_000).step_by(100) {
        if !scores(&engine.step(t)).is_empty() {
            emitted_at.push(t);
        }
    }
    // Constant score: one immediate emission, then one per 500 ms
    assert_eq!(emitted_at, vec![0, 500, 1_000]);
}

#[test]
fn test_large_score_jump_bypasses_debounce() {
    let script = vec![Ok(Some(upright_pose())), Ok(Some(slouched_pose()))];
    let mut engine = PostureEngine::new(ScriptedProvider::new(script), Settings::default());
    let upright_angles = measure_angles(&upright_pose()).unwrap();
    engine.set_baseline(CalibrationBaseline::from_angles(upright_angles, 0));
    engine.start_monitoring(0);

    assert_eq!(scores(&engine.step(0)), vec![100]);
    // Slouch drops the raw score enough that smoothing still moves the
    // overall by more than 5 points inside the debounce window
    let events = engine.step(100);
    assert_eq!(scores(&events), vec![90]);
}

#[test]
fn test_alert_cooldown_through_engine() {
    // Upright with no baseline scores a constant 70; threshold 80 keeps
    // every frame below the line so only the cooldown gates alerts
    let mut engine = PostureEngine::new(
        ScriptedProvider::repeating(upright_pose()),
        settings_with_threshold(80),
    );
    engine.start_monitoring(0);

    let mut fired_at = Vec::new();
    for t in (0..=60_000).step_by(100) {
        if alerts(&engine.step(t)) > 0 {
            fired_at.push(t);
        }
    }
    assert_eq!(fired_at, vec![0, 30_000, 60_000]);
}

#[test]
fn test_alert_not_fired_at_threshold() {
    let mut engine = PostureEngine::new(
        ScriptedProvider::repeating(upright_pose()),
        settings_with_threshold(70),
    );
    engine.start_monitoring(0);
    let events = engine.step(0);
    assert_eq!(alerts(&events), 0);
}

#[test]
fn test_detection_failure_drops_frame_and_continues() {
    let script = vec![
        Err(Error::Detection("transient inference failure".into())),
        Ok(Some(upright_pose())),
    ];
    let mut engine = PostureEngine::new(ScriptedProvider::new(script), Settings::default());
    engine.start_monitoring(0);

    // Failed frame: dropped without events or an engine error
    assert!(engine.step(0).is_empty());
    // Loop continues on the next opportunity
    assert_eq!(scores(&engine.step(100)), vec![70]);
}

#[test]
fn test_indeterminate_frame_produces_no_score() {
    let too_many_invalid = pose_with_invalid(&[
        KeypointIndex::LeftEar,
        KeypointIndex::RightEar,
        KeypointIndex::LeftHip,
        KeypointIndex::RightHip,
        KeypointIndex::LeftKnee,
    ]);
    let script = vec![Ok(Some(too_many_invalid)), Ok(Some(upright_pose()))];
    let mut engine = PostureEngine::new(ScriptedProvider::new(script), Settings::default());
    engine.start_monitoring(0);

    assert!(engine.step(0).is_empty());
    assert_eq!(scores(&engine.step(100)), vec![70]);

    // The indeterminate frame must not count toward the session average
    let record = engine.stop_monitoring(200).unwrap();
    assert_eq!(record.samples, 1);
}

#[test]
fn test_best_effort_scoring_with_four_invalid() {
    let four_invalid = pose_with_invalid(&[
        KeypointIndex::LeftHip,
        KeypointIndex::RightHip,
        KeypointIndex::LeftKnee,
        KeypointIndex::RightKnee,
    ]);
    let mut engine = PostureEngine::new(
        ScriptedProvider::repeating(four_invalid),
        Settings::default(),
    );
    engine.start_monitoring(0);
    // Neck and spine fall back to the neutral constants, so the frame
    // still produces a score
    assert_eq!(scores(&engine.step(0)).len(), 1);
}

#[test]
fn test_empty_frames_produce_nothing() {
    let mut engine = PostureEngine::new(
        ScriptedProvider::new(vec![Ok(None)]),
        Settings::default(),
    );
    engine.start_monitoring(0);
    assert!(engine.step(0).is_empty());
    assert!(engine.step(100).is_empty());
}

#[test]
fn test_smoothing_resets_when_monitoring_restarts() {
    let script = vec![
        Ok(Some(upright_pose())),
        Ok(Some(slouched_pose())),
        Ok(Some(upright_pose())),
    ];
    let mut engine = PostureEngine::new(ScriptedProvider::new(script), Settings::default());
    let upright_angles = measure_angles(&upright_pose()).unwrap();
    engine.set_baseline(CalibrationBaseline::from_angles(upright_angles, 0));

    engine.start_monitoring(0);
    engine.step(0); // 100
    engine.step(100); // smoothed toward 50
    engine.stop_monitoring(200);

    // After a restart the first score passes through unsmoothed
    engine.start_monitoring(1_000);
    assert_eq!(scores(&engine.step(1_000)), vec![100]);
}

#[test]
fn test_session_average_over_scored_frames() {
    let mut engine = PostureEngine::new(
        ScriptedProvider::repeating(upright_pose()),
        Settings::default(),
    );
    engine.start_monitoring(0);
    for t in (0..500).step_by(100) {
        engine.step(t);
    }
    let record = engine.stop_monitoring(500).unwrap();
    assert_eq!(record.samples, 5);
    assert!((record.average_score - 70.0).abs() < 1e-9);
    assert_eq!(record.duration_ms, 500);
}
