//! Hand landmark detection delegated to an external process.
//!
//! The child process prints `READY` once its model is loaded. For every frame
//! the parent writes three little-endian `u32` values (width, height, channels)
//! followed by the raw RGB bytes, and the child answers with a single JSON
//! line shaped like [`DetectionResponse`].

use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use image::RgbImage;
use shared::{domain::HandLandmarks, protocol::DetectionResponse};
use tracing::{debug, info, warn};

use crate::{DeviceError, DeviceResult, LandmarkDetector};

const READY_SIGNAL: &str = "READY";

/// MediaPipe detector script shipped with this crate.
pub const BUNDLED_DETECTOR_SCRIPT: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/detector/hand_detect.py");
const RGB_CHANNELS: u32 = 3;

/// How to launch the detector process.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorCommand {
    pub program: String,
    pub args: Vec<String>,
    pub min_confidence: f32,
}

impl Default for DetectorCommand {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec![BUNDLED_DETECTOR_SCRIPT.to_string()],
            min_confidence: 0.7,
        }
    }
}

pub struct SubprocessDetector {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    min_confidence: f32,
}

impl SubprocessDetector {
    pub fn spawn(command: &DetectorCommand) -> DeviceResult<Self> {
        info!(program = %command.program, args = ?command.args, "starting landmark detector");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                DeviceError::Detector(format!("failed to start '{}': {err}", command.program))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DeviceError::Detector("detector stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DeviceError::Detector("detector stdout unavailable".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.trim() != READY_SIGNAL {
            let _ = child.kill();
            return Err(DeviceError::Detector(format!(
                "detector did not signal ready, got: {:?}",
                ready.trim()
            )));
        }
        info!("landmark detector ready");

        Ok(Self {
            child,
            stdin,
            stdout,
            min_confidence: command.min_confidence.clamp(0.0, 1.0),
        })
    }
}

impl LandmarkDetector for SubprocessDetector {
    fn detect(&mut self, frame: &RgbImage) -> DeviceResult<Option<HandLandmarks>> {
        self.stdin.write_all(&frame.width().to_le_bytes())?;
        self.stdin.write_all(&frame.height().to_le_bytes())?;
        self.stdin.write_all(&RGB_CHANNELS.to_le_bytes())?;
        self.stdin.write_all(frame.as_raw())?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(DeviceError::Detector("detector closed its output".to_string()));
        }

        let response: DetectionResponse = serde_json::from_str(&line)
            .map_err(|err| DeviceError::Detector(format!("unreadable response: {err}")))?;
        Ok(select_hand(response, self.min_confidence))
    }
}

impl Drop for SubprocessDetector {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Picks the first confident hand with a complete, in-frame skeleton.
pub(crate) fn select_hand(response: DetectionResponse, min_confidence: f32) -> Option<HandLandmarks> {
    if let Some(error) = response.error {
        warn!("detector reported an error: {error}");
        return None;
    }

    response
        .hands
        .into_iter()
        .filter(|hand| hand.score >= min_confidence)
        .find_map(|hand| match HandLandmarks::from_slice(&hand.landmarks) {
            Ok(landmarks) if !landmarks.is_plausible() => {
                warn!("discarding detected hand with out-of-frame landmarks");
                None
            }
            Ok(landmarks) => {
                debug!(handedness = %hand.handedness, score = hand.score, "hand detected");
                Some(landmarks)
            }
            Err(err) => {
                warn!("discarding detected hand: {err}");
                None
            }
        })
}
