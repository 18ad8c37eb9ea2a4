//! Builds the device set a frame loop runs against: live camera and OS input,
//! or a recorded session, optionally without touching the real pointer.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use device_io::{
    load_recording, replay_pair, DeviceError, DeviceResult, FrameSource, InputInjector,
    LandmarkDetector, LoggingInjector, SilentTone, ToneSink,
};
use shared::domain::ScreenSize;
use tracing::info;

use crate::{config::AppConfig, engine::DeviceSet};

/// Screen reported by the dry-run injector.
pub const DRY_RUN_SCREEN: ScreenSize = ScreenSize::new(1920, 1080);
pub const REPLAY_FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureMode {
    Camera,
    Replay { path: PathBuf, interval: Duration },
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub config: AppConfig,
    pub capture: CaptureMode,
    /// Log input actions instead of injecting them.
    pub dry_run: bool,
    pub mute: bool,
}

impl LaunchOptions {
    pub fn camera(config: AppConfig) -> Self {
        Self {
            config,
            capture: CaptureMode::Camera,
            dry_run: false,
            mute: false,
        }
    }

    pub fn replay(config: AppConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            capture: CaptureMode::Replay {
                path: path.into(),
                interval: REPLAY_FRAME_INTERVAL,
            },
            dry_run: true,
            mute: true,
        }
    }

    /// Device opener for [`crate::engine::spawn_engine`]; runs on the loop thread.
    pub fn opener(&self) -> impl FnOnce() -> Result<DeviceSet, DeviceError> + Send + 'static {
        let options = self.clone();
        move || options.open()
    }

    pub fn open(&self) -> DeviceResult<DeviceSet> {
        let (source, detector) = match &self.capture {
            CaptureMode::Camera => open_camera(&self.config)?,
            CaptureMode::Replay { path, interval } => open_replay(&self.config, path, *interval)?,
        };

        let injector: Box<dyn InputInjector> = if self.dry_run {
            info!("dry run: input actions are logged, not injected");
            Box::new(LoggingInjector::new(DRY_RUN_SCREEN))
        } else {
            open_injector()?
        };

        let tone: Box<dyn ToneSink> = if self.mute {
            Box::new(SilentTone)
        } else {
            open_tone()
        };

        Ok(DeviceSet {
            source,
            detector,
            injector,
            tone,
        })
    }
}

type Capture = (Box<dyn FrameSource>, Box<dyn LandmarkDetector>);

fn open_replay(config: &AppConfig, path: &Path, interval: Duration) -> DeviceResult<Capture> {
    let frames = load_recording(path)?;
    info!(path = %path.display(), frames = frames.len(), "replaying recorded session");
    let (source, detector) = replay_pair(frames, config.camera.frame_size());
    Ok((Box::new(source.with_interval(interval)), Box::new(detector)))
}

#[cfg(feature = "live")]
fn open_camera(config: &AppConfig) -> DeviceResult<Capture> {
    use device_io::{NokhwaCamera, SubprocessDetector};

    let camera = NokhwaCamera::open(config.camera.index, config.camera.frame_size())?;
    let detector = SubprocessDetector::spawn(&config.detector.command())?;
    Ok((Box::new(camera), Box::new(detector)))
}

#[cfg(not(feature = "live"))]
fn open_camera(_config: &AppConfig) -> DeviceResult<Capture> {
    Err(DeviceError::Camera(
        "built without camera support (enable the `live` feature)".to_string(),
    ))
}

#[cfg(feature = "live")]
fn open_injector() -> DeviceResult<Box<dyn InputInjector>> {
    Ok(Box::new(device_io::EnigoInjector::new()?))
}

#[cfg(not(feature = "live"))]
fn open_injector() -> DeviceResult<Box<dyn InputInjector>> {
    Err(DeviceError::Input(
        "built without input injection (enable the `live` feature)".to_string(),
    ))
}

#[cfg(feature = "live")]
fn open_tone() -> Box<dyn ToneSink> {
    Box::new(device_io::RodioTone)
}

#[cfg(not(feature = "live"))]
fn open_tone() -> Box<dyn ToneSink> {
    Box::new(SilentTone)
}
