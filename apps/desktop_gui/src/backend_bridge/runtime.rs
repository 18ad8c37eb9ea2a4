//! Owns the running gesture engine and the channels it reports through.

use std::sync::Arc;

use gesture_core::{
    engine_channels, spawn_engine, AnnotatedFrame, EngineEvent, EngineHandle, EngineReceivers,
    LaunchOptions, LoopSummary, SharedSettings,
};
use tracing::info;

pub struct EngineRuntime {
    launch: LaunchOptions,
    settings: Arc<SharedSettings>,
    engine: Option<EngineHandle>,
    receivers: Option<EngineReceivers>,
}

impl EngineRuntime {
    pub fn new(launch: LaunchOptions) -> Self {
        let settings = Arc::new(SharedSettings::new(launch.config.gesture));
        Self {
            launch,
            settings,
            engine: None,
            receivers: None,
        }
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|engine| !engine.is_finished())
    }

    /// Starts a fresh loop. A loop that already ended on its own is joined first.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        self.reap();

        let (outputs, receivers) = engine_channels();
        let engine = spawn_engine(self.launch.opener(), Arc::clone(&self.settings), outputs)?;
        info!("gesture engine started");
        self.engine = Some(engine);
        self.receivers = Some(receivers);
        Ok(())
    }

    /// Stops the loop and waits for it to release the camera.
    pub fn stop(&mut self) -> Option<LoopSummary> {
        let summary = self.engine.as_mut()?.stop_and_join();
        self.engine = None;
        if let Some(summary) = &summary {
            info!(frames = summary.frames, "gesture engine stopped");
        }
        summary
    }

    /// Events queued since the last poll. Receivers outlive the loop so the
    /// final stop event is still delivered.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.receivers
            .as_ref()
            .map(|receivers| receivers.events.try_iter().collect())
            .unwrap_or_default()
    }

    pub fn latest_frame(&self) -> Option<AnnotatedFrame> {
        self.receivers.as_ref()?.frames.try_iter().last()
    }

    fn reap(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.join();
        }
    }
}

impl Drop for EngineRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}
