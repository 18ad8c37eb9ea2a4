use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{HandLandmarks, Landmark, ScreenPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
}

/// Keys used for page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavKey {
    LeftArrow,
    RightArrow,
}

/// OS-level input effect requested by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum InputAction {
    MoveTo(ScreenPoint),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Click(MouseButton),
    KeyPress(NavKey),
}

impl InputAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveTo(_) => "move_to",
            Self::ButtonDown(_) => "button_down",
            Self::ButtonUp(_) => "button_up",
            Self::Click(_) => "click",
            Self::KeyPress(_) => "key_press",
        }
    }
}

/// Short feedback beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl Tone {
    pub const PRESS: Tone = Tone::new(800, 50);
    pub const RIGHT_CLICK: Tone = Tone::new(1500, 100);
    pub const PAGE_TURN: Tone = Tone::new(600, 200);

    pub const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

/// Human-readable line for the console log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub message: String,
}

impl LogLine {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// One hand as reported by the external detector process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectedHand {
    #[serde(default)]
    pub handedness: String,
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

/// JSON line answered by the detector process for every frame.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub hands: Vec<DetectedHand>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One line of a landmark recording used for replays.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub hand: Option<HandLandmarks>,
}
