use std::{
    collections::VecDeque,
    sync::{atomic::AtomicUsize, Mutex},
    time::Duration,
};

use device_io::DeviceResult;
use shared::{
    domain::{joint, HandLandmarks, ScreenPoint},
    protocol::{InputAction, MouseButton, NavKey, Tone},
};

use super::*;
use crate::{
    channels::{engine_channels, EngineEvent, EngineReceivers},
    dispatcher::{LOG_PRESS, LOG_STOPPED_WHILE_DRAGGING},
    settings::GestureSettings,
    test_support::HandBuilder,
};

struct ScriptedSource {
    remaining: usize,
    pace: Duration,
    released: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(frames: usize, released: &Arc<AtomicUsize>) -> Self {
        Self {
            remaining: frames,
            pace: Duration::ZERO,
            released: Arc::clone(released),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn read_frame(&mut self) -> DeviceResult<RgbImage> {
        if self.remaining == 0 {
            return Err(DeviceError::Camera("unplugged".to_string()));
        }
        self.remaining -= 1;
        if !self.pace.is_zero() {
            thread::sleep(self.pace);
        }
        Ok(RgbImage::new(640, 480))
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct ScriptedDetector {
    script: VecDeque<DeviceResult<Option<HandLandmarks>>>,
}

impl ScriptedDetector {
    fn hands(hands: impl IntoIterator<Item = Option<HandLandmarks>>) -> Self {
        Self {
            script: hands.into_iter().map(Ok).collect(),
        }
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &RgbImage) -> DeviceResult<Option<HandLandmarks>> {
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Clone, Default)]
struct RecordingInjector {
    actions: Arc<Mutex<Vec<InputAction>>>,
    broken: bool,
    no_screen: bool,
}

impl RecordingInjector {
    fn record(&mut self, action: InputAction) -> DeviceResult<()> {
        if self.broken {
            return Err(DeviceError::Input("permission denied".to_string()));
        }
        self.actions.lock().expect("actions lock").push(action);
        Ok(())
    }

    fn recorded(&self) -> Vec<InputAction> {
        self.actions.lock().expect("actions lock").clone()
    }
}

impl InputInjector for RecordingInjector {
    fn screen_size(&self) -> DeviceResult<ScreenSize> {
        if self.no_screen {
            return Err(DeviceError::Input("no display".to_string()));
        }
        Ok(ScreenSize::new(1920, 1080))
    }

    fn move_to(&mut self, point: ScreenPoint) -> DeviceResult<()> {
        self.record(InputAction::MoveTo(point))
    }

    fn button_down(&mut self, button: MouseButton) -> DeviceResult<()> {
        self.record(InputAction::ButtonDown(button))
    }

    fn button_up(&mut self, button: MouseButton) -> DeviceResult<()> {
        self.record(InputAction::ButtonUp(button))
    }

    fn click(&mut self, button: MouseButton) -> DeviceResult<()> {
        self.record(InputAction::Click(button))
    }

    fn key_press(&mut self, key: NavKey) -> DeviceResult<()> {
        self.record(InputAction::KeyPress(key))
    }
}

#[derive(Clone, Default)]
struct RecordingTone(Arc<Mutex<Vec<Tone>>>);

impl ToneSink for RecordingTone {
    fn play(&self, tone: Tone) {
        self.0.lock().expect("tone lock").push(tone);
    }
}

struct Rig {
    released: Arc<AtomicUsize>,
    injector: RecordingInjector,
    tones: RecordingTone,
}

impl Rig {
    fn new() -> Self {
        Self {
            released: Arc::new(AtomicUsize::new(0)),
            injector: RecordingInjector::default(),
            tones: RecordingTone::default(),
        }
    }

    fn devices(&self, source: ScriptedSource, detector: ScriptedDetector) -> DeviceSet {
        DeviceSet {
            source: Box::new(source),
            detector: Box::new(detector),
            injector: Box::new(self.injector.clone()),
            tone: Box::new(self.tones.clone()),
        }
    }

    /// Endless paced source for spawned loops. Built on the loop thread since
    /// boxed devices are not `Send`.
    fn paced_opener(&self) -> impl FnOnce() -> Result<DeviceSet, DeviceError> + Send + 'static {
        let mut source = ScriptedSource::new(usize::MAX, &self.released);
        source.pace = Duration::from_millis(2);
        let injector = self.injector.clone();
        let tones = self.tones.clone();
        move || {
            Ok(DeviceSet {
                source: Box::new(source),
                detector: Box::new(ScriptedDetector::default()),
                injector: Box::new(injector),
                tone: Box::new(tones),
            })
        }
    }

    fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

fn run_loop(devices: DeviceSet, settings: GestureSettings) -> (LoopSummary, StateCell, EngineReceivers) {
    let (outputs, receivers) = engine_channels();
    let state = StateCell::default();
    let stop = AtomicBool::new(false);
    let summary = FrameLoop::new(devices, Arc::new(SharedSettings::new(settings)), outputs)
        .run(&stop, &state);
    (summary, state, receivers)
}

fn unsmoothed() -> GestureSettings {
    GestureSettings {
        smoothing: 1,
        ..GestureSettings::default()
    }
}

fn drain_events(receivers: &EngineReceivers) -> Vec<EngineEvent> {
    receivers.events.try_iter().collect()
}

fn log_messages(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Log(line) => Some(line.message.clone()),
            EngineEvent::Stopped(_) => None,
        })
        .collect()
}

#[test]
fn source_failure_ends_loop_and_releases_once() {
    let rig = Rig::new();
    let devices = rig.devices(ScriptedSource::new(3, &rig.released), ScriptedDetector::default());

    let (summary, state, receivers) = run_loop(devices, unsmoothed());

    assert_eq!(summary.frames, 3);
    assert!(matches!(summary.reason, StopReason::FrameReadFailed(_)));
    assert_eq!(rig.released(), 1);
    assert_eq!(state.get(), LoopState::Stopped);

    let events = drain_events(&receivers);
    assert_eq!(log_messages(&events).first().map(String::as_str), Some(LOG_READY));
    assert!(matches!(
        events.last(),
        Some(EngineEvent::Stopped(StopReason::FrameReadFailed(_)))
    ));
}

#[test]
fn latest_annotated_frame_is_published() {
    let rig = Rig::new();
    let devices = rig.devices(ScriptedSource::new(4, &rig.released), ScriptedDetector::default());

    let (_, _, receivers) = run_loop(devices, unsmoothed());

    let frame = receivers.frames.try_recv().expect("published frame");
    assert_eq!(frame.sequence, 4);
    assert_eq!(frame.gesture, "no hand");
    assert_eq!(frame.image.dimensions(), (640, 480));
    assert!(receivers.frames.try_recv().is_err());
}

#[test]
fn held_button_is_released_when_the_loop_ends() {
    let rig = Rig::new();
    let pinch = HandBuilder::point().index_pinch(320, 240, 10).build();
    let devices = rig.devices(
        ScriptedSource::new(2, &rig.released),
        ScriptedDetector::hands([Some(pinch.clone()), Some(pinch)]),
    );

    let (_, _, receivers) = run_loop(devices, unsmoothed());

    let actions = rig.injector.recorded();
    let downs = actions
        .iter()
        .filter(|a| **a == InputAction::ButtonDown(MouseButton::Left))
        .count();
    assert_eq!(downs, 1);
    assert_eq!(actions.last(), Some(&InputAction::ButtonUp(MouseButton::Left)));
    assert_eq!(*rig.tones.0.lock().expect("tone lock"), vec![Tone::PRESS]);

    let logs = log_messages(&drain_events(&receivers));
    assert!(logs.iter().any(|line| line == LOG_PRESS));
    assert!(logs.iter().any(|line| line == LOG_STOPPED_WHILE_DRAGGING));
}

#[test]
fn detector_errors_count_as_empty_frames() {
    let rig = Rig::new();
    let detector = ScriptedDetector {
        script: VecDeque::from([
            Err(DeviceError::Detector("model crashed".to_string())),
            Ok(Some(HandBuilder::new().build())),
        ]),
    };
    let devices = rig.devices(ScriptedSource::new(2, &rig.released), detector);

    let (summary, _, _) = run_loop(devices, unsmoothed());

    assert_eq!(summary.frames, 2);
    assert!(rig.injector.recorded().is_empty());
}

#[test]
fn detector_outage_is_reported_once_until_it_recovers() {
    let rig = Rig::new();
    let crash = || Err(DeviceError::Detector("pipe closed".to_string()));
    let detector = ScriptedDetector {
        script: VecDeque::from([crash(), crash(), crash(), Ok(None), crash()]),
    };
    let devices = rig.devices(ScriptedSource::new(5, &rig.released), detector);

    let (summary, _, receivers) = run_loop(devices, unsmoothed());

    assert_eq!(summary.frames, 5);
    let reports: Vec<_> = log_messages(&drain_events(&receivers))
        .into_iter()
        .filter(|line| line.starts_with(LOG_DETECTOR_FAILED))
        .collect();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].contains("pipe closed"));
}

#[test]
fn out_of_frame_skeleton_is_treated_as_no_hand() {
    let rig = Rig::new();
    let wild = HandBuilder::point()
        .raw(joint::INDEX_TIP, 1e12, 0.4)
        .raw(joint::THUMB_TIP, -1e12, 0.4)
        .build();
    let devices = rig.devices(
        ScriptedSource::new(1, &rig.released),
        ScriptedDetector::hands([Some(wild)]),
    );

    let (summary, state, receivers) = run_loop(devices, unsmoothed());

    assert_eq!(summary.frames, 1);
    assert_eq!(state.get(), LoopState::Stopped);
    assert!(rig.injector.recorded().is_empty());
    let frame = receivers.frames.try_recv().expect("published frame");
    assert_eq!(frame.gesture, "no hand");
}

#[test]
fn injection_failures_are_logged_and_the_loop_keeps_going() {
    let mut rig = Rig::new();
    rig.injector.broken = true;
    let hand = HandBuilder::point().index_pinch(320, 240, 90).build();
    let devices = rig.devices(
        ScriptedSource::new(3, &rig.released),
        ScriptedDetector::hands([Some(hand.clone()), Some(hand.clone()), Some(hand)]),
    );

    let (summary, _, receivers) = run_loop(devices, unsmoothed());

    assert_eq!(summary.frames, 3);
    let failures = log_messages(&drain_events(&receivers))
        .into_iter()
        .filter(|line| line.starts_with("input failed (move_to)"))
        .count();
    assert_eq!(failures, 3);
}

#[test]
fn muted_sound_plays_no_tones() {
    let rig = Rig::new();
    let pinch = HandBuilder::point().index_pinch(320, 240, 5).build();
    let devices = rig.devices(
        ScriptedSource::new(1, &rig.released),
        ScriptedDetector::hands([Some(pinch)]),
    );

    run_loop(
        devices,
        GestureSettings {
            sound_enabled: false,
            ..unsmoothed()
        },
    );

    assert!(rig.tones.0.lock().expect("tone lock").is_empty());
    assert!(rig
        .injector
        .recorded()
        .contains(&InputAction::ButtonDown(MouseButton::Left)));
}

#[test]
fn missing_screen_stops_before_reading_frames() {
    let mut rig = Rig::new();
    rig.injector.no_screen = true;
    let devices = rig.devices(ScriptedSource::new(5, &rig.released), ScriptedDetector::default());

    let (summary, state, receivers) = run_loop(devices, unsmoothed());

    assert_eq!(summary.frames, 0);
    assert!(matches!(summary.reason, StopReason::DeviceOpenFailed(_)));
    assert_eq!(rig.released(), 1);
    assert_eq!(state.get(), LoopState::Stopped);
    assert!(receivers.frames.try_recv().is_err());
}

#[test]
fn stop_request_ends_a_spawned_loop() {
    let rig = Rig::new();
    let open = rig.paced_opener();

    let (outputs, receivers) = engine_channels();
    let mut handle = spawn_engine(
        open,
        Arc::new(SharedSettings::default()),
        outputs,
    )
    .expect("spawn engine");

    receivers
        .frames
        .recv_timeout(Duration::from_secs(5))
        .expect("first frame");
    assert_eq!(handle.state(), LoopState::Running);

    let summary = handle.stop_and_join().expect("loop summary");
    assert_eq!(summary.reason, StopReason::Requested);
    assert!(summary.frames >= 1);
    assert_eq!(handle.state(), LoopState::Stopped);
    assert!(handle.is_finished());
    assert_eq!(rig.released(), 1);
    assert!(handle.join().is_none());

    let events = drain_events(&receivers);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::Stopped(StopReason::Requested))
    );
}

#[test]
fn open_failure_is_reported_as_a_stop_event() {
    let (outputs, receivers) = engine_channels();
    let mut handle = spawn_engine(
        || Err(DeviceError::Camera("no camera at index 3".to_string())),
        Arc::new(SharedSettings::default()),
        outputs,
    )
    .expect("spawn engine");

    let summary = handle.join().expect("loop summary");
    assert_eq!(summary.frames, 0);
    assert_eq!(
        summary.reason,
        StopReason::DeviceOpenFailed("camera error: no camera at index 3".to_string())
    );
    assert_eq!(handle.state(), LoopState::Stopped);

    let events = drain_events(&receivers);
    assert!(matches!(
        events.last(),
        Some(EngineEvent::Stopped(StopReason::DeviceOpenFailed(_)))
    ));
}

#[test]
fn dropping_the_handle_stops_the_loop() {
    let rig = Rig::new();
    let open = rig.paced_opener();

    let (outputs, receivers) = engine_channels();
    let handle = spawn_engine(
        open,
        Arc::new(SharedSettings::default()),
        outputs,
    )
    .expect("spawn engine");
    receivers
        .frames
        .recv_timeout(Duration::from_secs(5))
        .expect("first frame");

    drop(handle);
    assert_eq!(rig.released(), 1);
}
