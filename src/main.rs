//! Gesture overlay runner: drives the gesture engine from a webcam or a
//! recorded landmark session and logs what the UI would do.

use anyhow::{Context, Result};
use clap::Parser;
use gesture_gallery::config::{Config, EXAMPLE_CONFIG};
use gesture_gallery::dispatch::ActionSink;
use gesture_gallery::engine::{EngineStatus, GestureEngine};
use gesture_gallery::pose_source::{PoseSource, ReplaySource};
use log::{info, warn};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Replay a recorded landmark session instead of using the camera
    #[arg(short, long)]
    replay: Option<String>,

    /// Restart the recording when it runs out
    #[arg(long, requires = "replay")]
    loop_replay: bool,

    /// Camera index to use (overrides the configuration)
    #[cfg(feature = "camera")]
    #[arg(long)]
    cam: Option<i32>,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    run_for: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Stands in for the UI: logs navigations and banner changes
struct LogSink;

impl ActionSink for LogSink {
    fn navigate(&mut self, route: &str) {
        info!("Navigate -> {route}");
    }

    fn show_message(&mut self, message: Option<&str>) {
        match message {
            Some(message) => info!("Message: {message}"),
            None => info!("Message cleared"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Gesture Gallery overlay");

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {path}");
            match Config::from_file(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Failed to load config file: {e}. Using defaults.");
                    Config::default()
                }
            }
        }
        None => Config::default(),
    };

    if let Some(path) = &args.replay {
        let source = ReplaySource::from_file(path, args.loop_replay)
            .with_context(|| format!("Failed to load recording {path}"))?;
        return run(source, config, args.run_for).await;
    }

    run_camera(config, &args).await
}

#[cfg(feature = "camera")]
async fn run_camera(mut config: Config, args: &Args) -> Result<()> {
    if let Some(index) = args.cam {
        config.camera.index = index;
    }
    let source = gesture_gallery::camera::CameraSource::new(config.camera.clone(), config.model.clone());
    run(source, config, args.run_for).await
}

#[cfg(not(feature = "camera"))]
async fn run_camera(_config: Config, _args: &Args) -> Result<()> {
    anyhow::bail!("No pose source: pass --replay <file>, or build with the `camera` feature")
}

async fn run<S: PoseSource + 'static>(source: S, config: Config, run_for: Option<u64>) -> Result<()> {
    let bindings = config.screen.clone();
    info!(
        "{} targets bound, V-sign {}",
        bindings.targets.len(),
        bindings.v_sign.as_ref().map_or("unbound", |b| b.route.as_str())
    );

    let engine = GestureEngine::from_config(source, LogSink, bindings, &config).context("Invalid configuration")?;
    let handle = engine.spawn();
    let mut status = handle.subscribe_status();

    let deadline = async {
        match run_for {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted");
                break;
            }
            () = &mut deadline => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                info!("Engine status: {current:?}");
                if matches!(current, EngineStatus::ModelLoadFailed(_) | EngineStatus::Stopped) {
                    break;
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}
