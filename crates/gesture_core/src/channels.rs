//! One-directional loop → UI plumbing. Nothing here blocks the frame loop.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use image::RgbImage;
use shared::{error::StopReason, protocol::LogLine};
use tracing::{debug, warn};

const EVENT_QUEUE_CAPACITY: usize = 256;
const STOPPED_EVENT_GRACE: Duration = Duration::from_millis(100);

/// Camera frame with the gesture overlay drawn in.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub image: RgbImage,
    pub sequence: u64,
    pub gesture: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Log(LogLine),
    Stopped(StopReason),
}

/// Single-slot, latest-wins frame channel. Publishing over an undelivered
/// frame evicts the stale one.
#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<AnnotatedFrame>,
    evict: Receiver<AnnotatedFrame>,
}

impl FrameSender {
    pub fn publish(&self, frame: AnnotatedFrame) {
        match self.tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                let _ = self.evict.try_recv();
                if self.tx.try_send(frame).is_err() {
                    debug!("frame slot contended; dropping frame");
                }
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

pub fn frame_slot() -> (FrameSender, Receiver<AnnotatedFrame>) {
    let (tx, rx) = bounded(1);
    (
        FrameSender {
            tx,
            evict: rx.clone(),
        },
        rx,
    )
}

#[derive(Clone)]
pub struct EventSender {
    tx: Sender<EngineEvent>,
}

impl EventSender {
    /// Queues a log line, dropping it if the UI has fallen behind.
    pub fn log(&self, message: impl Into<String>) {
        let line = LogLine::now(message);
        match self.tx.try_send(EngineEvent::Log(line)) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(EngineEvent::Log(line))) => {
                debug!(message = %line.message, "event queue full; log line dropped");
            }
            Err(TrySendError::Full(_)) => {}
        }
    }

    /// Sent once when a loop ends. Waits briefly for room since this is the
    /// only signal the UI gets about why the loop ended.
    pub fn stopped(&self, reason: StopReason) {
        if let Err(err) = self
            .tx
            .send_timeout(EngineEvent::Stopped(reason), STOPPED_EVENT_GRACE)
        {
            warn!("could not deliver loop stop event: {err}");
        }
    }
}

pub fn event_channel() -> (EventSender, Receiver<EngineEvent>) {
    let (tx, rx) = bounded(EVENT_QUEUE_CAPACITY);
    (EventSender { tx }, rx)
}

/// Sending halves handed to a frame loop.
#[derive(Clone)]
pub struct EngineOutputs {
    pub frames: FrameSender,
    pub events: EventSender,
}

/// Receiving halves kept by the presentation layer.
pub struct EngineReceivers {
    pub frames: Receiver<AnnotatedFrame>,
    pub events: Receiver<EngineEvent>,
}

pub fn engine_channels() -> (EngineOutputs, EngineReceivers) {
    let (frames, frame_rx) = frame_slot();
    let (events, event_rx) = event_channel();
    (
        EngineOutputs { frames, events },
        EngineReceivers {
            frames: frame_rx,
            events: event_rx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u64) -> AnnotatedFrame {
        AnnotatedFrame {
            image: RgbImage::new(2, 2),
            sequence,
            gesture: "idle",
        }
    }

    #[test]
    fn frame_slot_keeps_only_the_latest_frame() {
        let (tx, rx) = frame_slot();
        for sequence in 1..=5 {
            tx.publish(frame(sequence));
        }

        assert_eq!(rx.try_recv().expect("latest frame").sequence, 5);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_event_queue_drops_logs_without_blocking() {
        let (tx, rx) = event_channel();
        for idx in 0..EVENT_QUEUE_CAPACITY + 10 {
            tx.log(format!("line {idx}"));
        }
        assert_eq!(rx.len(), EVENT_QUEUE_CAPACITY);

        match rx.try_recv().expect("first event") {
            EngineEvent::Log(line) => assert_eq!(line.message, "line 0"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn stop_event_is_delivered_when_there_is_room() {
        let (tx, rx) = event_channel();
        tx.stopped(StopReason::Requested);
        assert_eq!(
            rx.try_recv().expect("stop event"),
            EngineEvent::Stopped(StopReason::Requested)
        );
    }
}
