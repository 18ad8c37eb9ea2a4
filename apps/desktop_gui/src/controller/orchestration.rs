//! Routes UI commands to the engine runtime.

use crate::{
    backend_bridge::{commands::EngineCommand, runtime::EngineRuntime},
    controller::events::{ConsoleState, EngineStatus},
};

pub fn dispatch_engine_command(
    runtime: &mut EngineRuntime,
    console: &mut ConsoleState,
    cmd: EngineCommand,
    status: &mut String,
) {
    tracing::debug!(command = cmd.name(), "ui->engine command");
    match cmd {
        EngineCommand::SetSmoothing(v) => runtime.settings().set_smoothing(v),
        EngineCommand::SetFrameMargin(v) => runtime.settings().set_frame_margin(v),
        EngineCommand::SetClickThreshold(v) => runtime.settings().set_click_threshold(v),
        EngineCommand::SetSoundEnabled(v) => runtime.settings().set_sound_enabled(v),
        EngineCommand::SetShowLandmarks(v) => runtime.settings().set_show_landmarks(v),
        EngineCommand::Start => match runtime.start() {
            Ok(()) => {
                console.status = EngineStatus::Running;
                status.clear();
            }
            Err(err) => {
                tracing::error!("failed to start gesture engine: {err:#}");
                *status = format!("Could not start the gesture engine: {err}");
            }
        },
        EngineCommand::Stop => {
            runtime.stop();
            for event in runtime.drain_events() {
                console.apply(event);
            }
        }
    }
}
