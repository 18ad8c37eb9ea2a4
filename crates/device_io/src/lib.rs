//! Device seams used by the gesture loop, plus the concrete adapters behind them.
//!
//! None of the traits require `Send`: camera handles, OS input connections and
//! audio streams are not thread-safe on every platform, so the frame loop opens
//! them on its own thread and keeps them there.

use image::RgbImage;
use shared::{
    domain::{HandLandmarks, ScreenPoint, ScreenSize},
    protocol::{InputAction, MouseButton, NavKey, Tone},
};
use thiserror::Error;

#[cfg(feature = "camera")]
pub mod camera;
pub mod detector;
pub mod input;
pub mod replay;
pub mod tone;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("camera error: {0}")]
    Camera(String),
    #[error("landmark detector error: {0}")]
    Detector(String),
    #[error("input injection error: {0}")]
    Input(String),
    #[error("invalid recording at line {line}: {reason}")]
    Recording { line: usize, reason: String },
    #[error("recording exhausted after {0} frames")]
    RecordingExhausted(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Camera-like producer of RGB frames.
pub trait FrameSource {
    fn read_frame(&mut self) -> DeviceResult<RgbImage>;
    /// Stops the underlying stream. Implementations tolerate repeated calls.
    fn release(&mut self);
}

pub trait LandmarkDetector {
    /// Returns the single tracked hand, or `None` when no hand is visible.
    fn detect(&mut self, frame: &RgbImage) -> DeviceResult<Option<HandLandmarks>>;
}

/// Pointer and keyboard injection.
pub trait InputInjector {
    fn screen_size(&self) -> DeviceResult<ScreenSize>;
    fn move_to(&mut self, point: ScreenPoint) -> DeviceResult<()>;
    fn button_down(&mut self, button: MouseButton) -> DeviceResult<()>;
    fn button_up(&mut self, button: MouseButton) -> DeviceResult<()>;
    fn click(&mut self, button: MouseButton) -> DeviceResult<()>;
    fn key_press(&mut self, key: NavKey) -> DeviceResult<()>;

    fn perform(&mut self, action: &InputAction) -> DeviceResult<()> {
        match *action {
            InputAction::MoveTo(point) => self.move_to(point),
            InputAction::ButtonDown(button) => self.button_down(button),
            InputAction::ButtonUp(button) => self.button_up(button),
            InputAction::Click(button) => self.click(button),
            InputAction::KeyPress(key) => self.key_press(key),
        }
    }
}

/// Fire-and-forget audio feedback. Must never block the caller.
pub trait ToneSink {
    fn play(&self, tone: Tone);
}

#[cfg(feature = "camera")]
pub use camera::NokhwaCamera;
pub use detector::{DetectorCommand, SubprocessDetector};
#[cfg(feature = "input")]
pub use input::EnigoInjector;
pub use input::LoggingInjector;
pub use replay::{load_recording, replay_pair, ReplayDetector, ReplayFrames};
#[cfg(feature = "sound")]
pub use tone::RodioTone;
pub use tone::SilentTone;
