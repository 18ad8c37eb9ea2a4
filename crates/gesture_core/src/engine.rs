//! The camera loop: read → detect → classify → dispatch → publish.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use anyhow::Context;
use device_io::{DeviceError, FrameSource, InputInjector, LandmarkDetector, ToneSink};
use image::RgbImage;
use shared::{
    domain::{FrameSize, HandLandmarks, ScreenSize},
    error::StopReason,
};
use tracing::{debug, error, info, warn};

use crate::{
    channels::{AnnotatedFrame, EngineOutputs},
    classifier::{classify, FrameGeometry},
    dispatcher::{DispatchOutcome, Dispatcher},
    overlay::annotate,
    settings::SharedSettings,
};

pub const LOG_READY: &str = "system ready - gesture engine started";
pub const LOG_DETECTOR_FAILED: &str = "hand detector failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl LoopState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Observable loop state shared between the loop thread and its handle.
#[derive(Debug, Clone)]
pub struct StateCell(Arc<AtomicU8>);

impl Default for StateCell {
    fn default() -> Self {
        Self(Arc::new(AtomicU8::new(LoopState::Idle as u8)))
    }
}

impl StateCell {
    pub fn get(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: LoopState) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: LoopState, to: LoopState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Everything the loop talks to, opened on the loop thread.
pub struct DeviceSet {
    pub source: Box<dyn FrameSource>,
    pub detector: Box<dyn LandmarkDetector>,
    pub injector: Box<dyn InputInjector>,
    pub tone: Box<dyn ToneSink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub reason: StopReason,
}

pub struct FrameLoop {
    devices: DeviceSet,
    settings: Arc<SharedSettings>,
    outputs: EngineOutputs,
    dispatcher: Dispatcher,
    detector_failing: bool,
}

impl FrameLoop {
    pub fn new(devices: DeviceSet, settings: Arc<SharedSettings>, outputs: EngineOutputs) -> Self {
        Self {
            devices,
            settings,
            outputs,
            dispatcher: Dispatcher::new(),
            detector_failing: false,
        }
    }

    /// Runs until `stop` is raised or the source fails. The frame source is
    /// released exactly once before returning.
    pub fn run(mut self, stop: &AtomicBool, state: &StateCell) -> LoopSummary {
        let screen = match self.devices.injector.screen_size() {
            Ok(screen) => screen,
            Err(err) => {
                error!("could not query screen size: {err}");
                let reason = StopReason::DeviceOpenFailed(err.to_string());
                return self.finish(state, reason, 0);
            }
        };

        state.set(LoopState::Running);
        info!(
            screen_width = screen.width,
            screen_height = screen.height,
            "gesture loop running"
        );
        self.outputs.events.log(LOG_READY);

        let mut frames = 0u64;
        let reason = loop {
            if stop.load(Ordering::Acquire) {
                break StopReason::Requested;
            }

            let mut frame = match self.devices.source.read_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    warn!("frame read failed, ending loop: {err}");
                    break StopReason::FrameReadFailed(err.to_string());
                }
            };
            image::imageops::flip_horizontal_in_place(&mut frame);

            let gesture = self.process_frame(&mut frame, screen, Instant::now());
            frames += 1;
            self.outputs.frames.publish(AnnotatedFrame {
                image: frame,
                sequence: frames,
                gesture,
            });
        };

        state.transition(LoopState::Running, LoopState::Stopping);
        let release = self.dispatcher.release_on_stop();
        self.apply(release);
        self.finish(state, reason, frames)
    }

    fn process_frame(
        &mut self,
        frame: &mut RgbImage,
        screen: ScreenSize,
        now: Instant,
    ) -> &'static str {
        let settings = self.settings.snapshot();

        let hand = self.detect(frame);

        let geometry = FrameGeometry {
            frame: FrameSize::new(frame.width(), frame.height()),
            screen,
            frame_margin: settings.frame_margin,
        };
        let gesture = classify(hand.as_ref(), &geometry);
        let outcome = self.dispatcher.dispatch(&gesture, &settings, now);
        self.apply(outcome);

        annotate(frame, hand.as_ref(), &gesture, &settings);
        gesture.label()
    }

    /// Detector failures and out-of-frame skeletons count as an empty frame.
    /// Only the first failure of a run of failures is reported.
    fn detect(&mut self, frame: &RgbImage) -> Option<HandLandmarks> {
        match self.devices.detector.detect(frame) {
            Ok(hand) => {
                if std::mem::take(&mut self.detector_failing) {
                    info!("landmark detector recovered");
                }
                hand.filter(|hand| {
                    let plausible = hand.is_plausible();
                    if !plausible {
                        debug!("ignoring hand with out-of-frame landmarks");
                    }
                    plausible
                })
            }
            Err(err) if self.detector_failing => {
                debug!("detector still failing: {err}");
                None
            }
            Err(err) => {
                self.detector_failing = true;
                warn!("detector failed, treating frames as empty: {err}");
                self.outputs.events.log(format!("{LOG_DETECTOR_FAILED}: {err}"));
                None
            }
        }
    }

    fn apply(&mut self, outcome: DispatchOutcome) {
        for action in &outcome.actions {
            if let Err(err) = self.devices.injector.perform(action) {
                warn!(action = action.name(), "input injection failed: {err}");
                self.outputs
                    .events
                    .log(format!("input failed ({}): {err}", action.name()));
            }
        }
        if let Some(tone) = outcome.tone {
            self.devices.tone.play(tone);
        }
        if let Some(message) = outcome.log {
            info!(message, "gesture action");
            self.outputs.events.log(message);
        }
    }

    fn finish(mut self, state: &StateCell, reason: StopReason, frames: u64) -> LoopSummary {
        self.devices.source.release();
        state.set(LoopState::Stopped);
        info!(frames, reason = ?reason, "gesture loop stopped");
        self.outputs.events.log(reason.describe());
        self.outputs.events.stopped(reason.clone());
        LoopSummary { frames, reason }
    }
}

/// Owner-side control of a loop running on its own thread. Dropping the handle
/// stops the loop and waits for it.
pub struct EngineHandle {
    stop: Arc<AtomicBool>,
    state: StateCell,
    join: Option<JoinHandle<LoopSummary>>,
}

impl EngineHandle {
    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.state.transition(LoopState::Running, LoopState::Stopping);
    }

    /// Waits for the loop to end. Returns `None` if it was already joined or panicked.
    pub fn join(&mut self) -> Option<LoopSummary> {
        let join = self.join.take()?;
        match join.join() {
            Ok(summary) => Some(summary),
            Err(_) => {
                error!("gesture loop thread panicked");
                self.state.set(LoopState::Stopped);
                None
            }
        }
    }

    pub fn stop_and_join(&mut self) -> Option<LoopSummary> {
        self.request_stop();
        self.join()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.stop_and_join();
        }
    }
}

/// Starts a loop thread. `open_devices` runs on that thread so non-`Send`
/// device handles never cross threads.
pub fn spawn_engine<F>(
    open_devices: F,
    settings: Arc<SharedSettings>,
    outputs: EngineOutputs,
) -> anyhow::Result<EngineHandle>
where
    F: FnOnce() -> Result<DeviceSet, DeviceError> + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let state = StateCell::default();

    let join = thread::Builder::new()
        .name("gesture-loop".to_string())
        .spawn({
            let stop = Arc::clone(&stop);
            let state = state.clone();
            move || match open_devices() {
                Ok(devices) => FrameLoop::new(devices, settings, outputs).run(&stop, &state),
                Err(err) => {
                    error!("failed to open devices: {err}");
                    let reason = StopReason::DeviceOpenFailed(err.to_string());
                    state.set(LoopState::Stopped);
                    outputs.events.log(reason.describe());
                    outputs.events.stopped(reason.clone());
                    LoopSummary { frames: 0, reason }
                }
            }
        })
        .context("failed to spawn gesture loop thread")?;

    Ok(EngineHandle {
        stop,
        state,
        join: Some(join),
    })
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
