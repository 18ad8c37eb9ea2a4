use serde::{Deserialize, Serialize};

use crate::error::GestureError;

/// Number of keypoints in a hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Keypoint indices of the 21-point hand topology.
pub mod joint {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Bones drawn when the skeleton overlay is enabled.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (joint::WRIST, joint::THUMB_CMC),
    (joint::THUMB_CMC, joint::THUMB_MCP),
    (joint::THUMB_MCP, joint::THUMB_IP),
    (joint::THUMB_IP, joint::THUMB_TIP),
    (joint::WRIST, joint::INDEX_MCP),
    (joint::INDEX_MCP, joint::INDEX_PIP),
    (joint::INDEX_PIP, joint::INDEX_DIP),
    (joint::INDEX_DIP, joint::INDEX_TIP),
    (joint::INDEX_MCP, joint::MIDDLE_MCP),
    (joint::MIDDLE_MCP, joint::MIDDLE_PIP),
    (joint::MIDDLE_PIP, joint::MIDDLE_DIP),
    (joint::MIDDLE_DIP, joint::MIDDLE_TIP),
    (joint::MIDDLE_MCP, joint::RING_MCP),
    (joint::RING_MCP, joint::RING_PIP),
    (joint::RING_PIP, joint::RING_DIP),
    (joint::RING_DIP, joint::RING_TIP),
    (joint::RING_MCP, joint::PINKY_MCP),
    (joint::WRIST, joint::PINKY_MCP),
    (joint::PINKY_MCP, joint::PINKY_PIP),
    (joint::PINKY_PIP, joint::PINKY_DIP),
    (joint::PINKY_DIP, joint::PINKY_TIP),
];

macro_rules! size_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub width: u32,
            pub height: u32,
        }

        impl $name {
            pub const fn new(width: u32, height: u32) -> Self {
                Self { width, height }
            }
        }
    };
}

size_newtype!(FrameSize);
size_newtype!(ScreenSize);

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Integer pixel position inside a camera frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: PixelPoint) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        dx.hypot(dy)
    }
}

/// Sub-pixel position on the desktop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How far outside 0.0..=1.0 a detector coordinate may stray before the hand is discarded.
pub const LANDMARK_SLACK: f32 = 0.5;

/// A single keypoint, normalized to the frame (0.0..=1.0). `z` is carried but unused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Finite and within [`LANDMARK_SLACK`] of the frame.
    pub fn is_plausible(self) -> bool {
        let range = -LANDMARK_SLACK..=1.0 + LANDMARK_SLACK;
        range.contains(&self.x) && range.contains(&self.y)
    }

    /// Truncating conversion to frame pixels.
    pub fn to_pixel(self, frame: FrameSize) -> PixelPoint {
        PixelPoint {
            x: (self.x * frame.width as f32) as i32,
            y: (self.y * frame.height as f32) as i32,
        }
    }
}

/// One detected hand. Each frame's set is independent of the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn from_slice(points: &[Landmark]) -> Result<Self, GestureError> {
        let points: [Landmark; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| GestureError::LandmarkCount {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;
        Ok(Self { points })
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn set_point(&mut self, index: usize, landmark: Landmark) {
        self.points[index] = landmark;
    }

    pub fn is_plausible(&self) -> bool {
        self.points.iter().all(|point| point.is_plausible())
    }

    pub fn pixel(&self, index: usize, frame: FrameSize) -> PixelPoint {
        self.points[index].to_pixel(frame)
    }

    pub fn finger_state(&self) -> FingerState {
        FingerState {
            index: self.is_extended(joint::INDEX_TIP, joint::INDEX_PIP),
            middle: self.is_extended(joint::MIDDLE_TIP, joint::MIDDLE_PIP),
            ring: self.is_extended(joint::RING_TIP, joint::RING_PIP),
        }
    }

    // Image y grows downward, so an extended fingertip sits above its PIP joint.
    fn is_extended(&self, tip: usize, pip: usize) -> bool {
        self.points[tip].y < self.points[pip].y
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarks {
    type Error = GestureError;

    fn try_from(value: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_slice(&value)
    }
}

impl From<HandLandmarks> for Vec<Landmark> {
    fn from(value: HandLandmarks) -> Self {
        value.points.to_vec()
    }
}

/// Extension flags of the three fingers that drive classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FingerState {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
}

impl FingerState {
    pub const fn new(index: bool, middle: bool, ring: bool) -> Self {
        Self {
            index,
            middle,
            ring,
        }
    }
}
