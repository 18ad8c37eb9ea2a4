//! Gesture recognition and the camera loop that turns hand poses into input.

pub mod channels;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod launch;
pub mod overlay;
pub mod settings;
pub mod smoothing;

pub use channels::{engine_channels, AnnotatedFrame, EngineEvent, EngineOutputs, EngineReceivers};
pub use classifier::{classify, FrameGeometry, Gesture, PageZone};
pub use config::{load_config, AppConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use engine::{spawn_engine, DeviceSet, EngineHandle, FrameLoop, LoopState, LoopSummary};
pub use launch::{CaptureMode, LaunchOptions};
pub use settings::{GestureSettings, SharedSettings};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
