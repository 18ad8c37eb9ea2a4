//! Recorded landmark sessions played back through the regular frame loop.
//!
//! A recording is a JSON-lines file with one [`RecordedFrame`] per camera frame.
//! [`replay_pair`] splits it into a frame source that yields blank frames and a
//! detector that answers with the recorded hands. The loop always reads a frame
//! before detecting, so the two halves stay in lockstep.

use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    thread,
    time::Duration,
};

use image::RgbImage;
use shared::{
    domain::{FrameSize, HandLandmarks},
    protocol::RecordedFrame,
};

use crate::{DeviceError, DeviceResult, FrameSource, LandmarkDetector};

pub fn load_recording(path: &Path) -> DeviceResult<Vec<RecordedFrame>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str::<RecordedFrame>(&line).map_err(|err| {
            DeviceError::Recording {
                line: idx + 1,
                reason: err.to_string(),
            }
        })?;
        frames.push(frame);
    }
    Ok(frames)
}

pub fn replay_pair(frames: Vec<RecordedFrame>, size: FrameSize) -> (ReplayFrames, ReplayDetector) {
    let total = frames.len();
    let hands = frames.into_iter().map(|frame| frame.hand).collect();
    (
        ReplayFrames {
            size,
            total,
            delivered: 0,
            interval: None,
            released: false,
        },
        ReplayDetector { hands },
    )
}

pub struct ReplayFrames {
    size: FrameSize,
    total: usize,
    delivered: usize,
    interval: Option<Duration>,
    released: bool,
}

impl ReplayFrames {
    /// Sleeps `interval` before every frame after the first, approximating a live camera.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn remaining(&self) -> usize {
        self.total - self.delivered
    }
}

impl FrameSource for ReplayFrames {
    fn read_frame(&mut self) -> DeviceResult<RgbImage> {
        if self.released || self.delivered >= self.total {
            return Err(DeviceError::RecordingExhausted(self.delivered));
        }
        if let Some(interval) = self.interval.filter(|_| self.delivered > 0) {
            thread::sleep(interval);
        }
        self.delivered += 1;
        Ok(RgbImage::new(self.size.width, self.size.height))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

pub struct ReplayDetector {
    hands: VecDeque<Option<HandLandmarks>>,
}

impl LandmarkDetector for ReplayDetector {
    fn detect(&mut self, _frame: &RgbImage) -> DeviceResult<Option<HandLandmarks>> {
        Ok(self.hands.pop_front().flatten())
    }
}
