//! Posture monitoring application over a recorded pose stream.

use anyhow::{bail, Result};
use clap::Parser;
use log::{info, warn};
use posture_coach::config::Config;
use posture_coach::engine::{EngineEvent, PostureEngine};
use posture_coach::provider::ReplayPoseProvider;
use posture_coach::storage::{unix_millis, PostureStore};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Recorded pose stream to analyze (JSON, one entry per frame)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Data directory for calibration, settings and session history
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Alert threshold override (0-100)
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Run a calibration pass before monitoring
    #[arg(long)]
    calibrate: bool,

    /// Clear stored calibration, settings and session history, then exit
    #[arg(long)]
    clear: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    // Load configuration if provided
    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    config.validate()?;

    let data_dir = args.data_dir.unwrap_or_else(|| config.storage.data_dir.clone());
    let store = PostureStore::open(&data_dir)?;

    if args.clear {
        store.clear_all();
        info!("Cleared stored data under {}", data_dir.display());
        return Ok(());
    }

    // Stored settings supersede the config file; CLI flags supersede both
    let mut settings = store.settings().unwrap_or(config.settings);
    if let Some(threshold) = args.threshold {
        settings.alert_threshold = threshold;
    }
    settings.validate()?;

    let Some(replay_path) = args.replay.or(config.replay.pose_stream) else {
        bail!("no pose stream given; pass --replay or set replay.pose_stream in the config");
    };

    let provider = ReplayPoseProvider::from_file(&replay_path)?;
    let mut engine = PostureEngine::new(provider, settings);

    if let Some(baseline) = store.calibration() {
        info!("Loaded calibration baseline from {}", data_dir.display());
        engine.set_baseline(baseline);
    }

    if args.calibrate {
        engine.start_calibration(unix_millis());
    } else {
        engine.start_monitoring(unix_millis());
    }

    loop {
        let now = unix_millis();
        for event in engine.step(now) {
            match event {
                EngineEvent::Score(score) => {
                    info!(
                        "Posture score {:3} (neck {:.1}°, shoulder {:.1}°, spine {:.1}°, head {:.1}in)",
                        score.overall,
                        score.angles.neck_angle,
                        score.angles.shoulder_angle,
                        score.angles.spine_angle,
                        score.angles.head_forward_distance,
                    );
                }
                EngineEvent::Alert(alert) => {
                    warn!("ALERT [{:?}] {}", alert.severity, alert.message);
                }
                EngineEvent::CalibrationCountdown { seconds_left } => {
                    info!("Calibrating in {seconds_left}...");
                }
                EngineEvent::CalibrationComplete(baseline) => {
                    if let Err(e) = store.set_calibration(&baseline) {
                        warn!("Could not persist calibration: {e}");
                    }
                    info!(
                        "Calibration complete (neck {:.1}°, spine {:.1}°)",
                        baseline.angles.neck_angle, baseline.angles.spine_angle
                    );
                    engine.start_monitoring(now);
                }
            }
        }

        if engine.provider().is_exhausted() && !engine.is_calibrating() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    if let Some(record) = engine.stop_monitoring(unix_millis()) {
        info!(
            "Session finished: {} scored frames, average {:.1}",
            record.samples, record.average_score
        );
        if let Err(e) = store.add_session(record, unix_millis()) {
            warn!("Could not persist session history: {e}");
        }
    }

    Ok(())
}
