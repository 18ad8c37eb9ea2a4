//! Commands issued by the UI to the gesture engine runtime.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Start,
    Stop,
    SetSmoothing(u32),
    SetFrameMargin(u32),
    SetClickThreshold(u32),
    SetSoundEnabled(bool),
    SetShowLandmarks(bool),
}

impl EngineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::SetSmoothing(_) => "set_smoothing",
            Self::SetFrameMargin(_) => "set_frame_margin",
            Self::SetClickThreshold(_) => "set_click_threshold",
            Self::SetSoundEnabled(_) => "set_sound_enabled",
            Self::SetShowLandmarks(_) => "set_show_landmarks",
        }
    }
}
