use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use gesture_core::{
    engine_channels, load_config, spawn_engine, AppConfig, AnnotatedFrame, EngineEvent,
    LaunchOptions, SharedSettings,
};
use shared::error::StopReason;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Headless gesture control: drives the pointer from the webcam, or replays a
/// recorded landmark session.
#[derive(Parser, Debug)]
struct Args {
    /// TOML config file; defaults to ./gesture.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    camera_index: Option<u32>,
    /// Detector command line; defaults to the bundled MediaPipe script.
    #[arg(long)]
    detector: Option<String>,
    /// Replay a JSON-lines landmark recording instead of opening the camera.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Log input actions instead of injecting them.
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    mute: bool,
    /// Stop after this many seconds.
    #[arg(long)]
    duration_secs: Option<u64>,
    /// Write the last annotated frame to this PNG on exit.
    #[arg(long)]
    snapshot: Option<PathBuf>,
    #[arg(long)]
    smoothing: Option<u32>,
    #[arg(long)]
    frame_margin: Option<u32>,
    #[arg(long)]
    click_threshold: Option<u32>,
    #[arg(long)]
    hide_landmarks: bool,
}

impl Args {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(index) = self.camera_index {
            config.camera.index = index;
        }
        if let Some(command) = &self.detector {
            let mut parts = command.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                config.detector.program = program;
                config.detector.args = parts.collect();
            }
        }
        if let Some(v) = self.smoothing {
            config.gesture.smoothing = v;
        }
        if let Some(v) = self.frame_margin {
            config.gesture.frame_margin = v;
        }
        if let Some(v) = self.click_threshold {
            config.gesture.click_threshold = v;
        }
        if self.mute {
            config.gesture.sound_enabled = false;
        }
        if self.hide_landmarks {
            config.gesture.show_landmarks = false;
        }
    }

    fn launch_options(&self, config: AppConfig) -> LaunchOptions {
        let mut options = match &self.replay {
            Some(path) => LaunchOptions::replay(config, path),
            None => LaunchOptions::camera(config),
        };
        options.dry_run |= self.dry_run;
        options.mute |= self.mute;
        options
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    args.apply_to(&mut config);
    let settings = Arc::new(SharedSettings::new(config.gesture));
    let options = args.launch_options(config);

    let (outputs, receivers) = engine_channels();
    let mut engine = spawn_engine(options.opener(), settings, outputs)?;
    let deadline = args
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));

    let mut last_frame: Option<AnnotatedFrame> = None;
    let reason = loop {
        if let Some(frame) = receivers.frames.try_iter().last() {
            last_frame = Some(frame);
        }
        if deadline.is_some_and(|at| Instant::now() >= at) {
            info!("duration elapsed; stopping");
            engine.request_stop();
        }

        match receivers.events.recv_timeout(Duration::from_millis(100)) {
            Ok(EngineEvent::Log(line)) => println!("{line}"),
            Ok(EngineEvent::Stopped(reason)) => break reason,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("engine exited without a stop event");
                break StopReason::Requested;
            }
        }
    };

    let summary = engine.join();
    if let Some(frame) = receivers.frames.try_iter().last() {
        last_frame = Some(frame);
    }
    if let (Some(path), Some(frame)) = (&args.snapshot, &last_frame) {
        frame
            .image
            .save(path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), sequence = frame.sequence, "saved snapshot");
    }

    let frames = summary.map_or(0, |summary| summary.frames);
    info!(frames, "{}", reason.describe());
    match reason {
        StopReason::DeviceOpenFailed(detail) => anyhow::bail!("could not start: {detail}"),
        StopReason::FrameReadFailed(_) if args.replay.is_some() => Ok(()),
        StopReason::FrameReadFailed(detail) => anyhow::bail!("camera failed: {detail}"),
        StopReason::Requested => Ok(()),
    }
}
