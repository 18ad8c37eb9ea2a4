use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("expected {expected} hand landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Why a frame loop ended. Carried by the final loop event so the UI does not
/// have to infer the end from missing frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    Requested,
    DeviceOpenFailed(String),
    FrameReadFailed(String),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Requested)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Requested => "stopped on request".to_string(),
            Self::DeviceOpenFailed(detail) => format!("could not open devices: {detail}"),
            Self::FrameReadFailed(detail) => format!("camera stopped delivering frames: {detail}"),
        }
    }
}
