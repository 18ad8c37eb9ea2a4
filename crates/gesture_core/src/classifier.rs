//! Memoryless mapping from one hand skeleton to a gesture.

use shared::domain::{joint, FingerState, FrameSize, HandLandmarks, PixelPoint, ScreenPoint, ScreenSize};

use crate::smoothing::map_to_screen;

/// Width in frame pixels of the left and right page-turn zones.
pub const PAGE_ZONE_WIDTH: i32 = 100;

/// Frame and screen dimensions plus the operating-rectangle inset for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub frame: FrameSize,
    pub screen: ScreenSize,
    pub frame_margin: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageZone {
    Previous,
    Next,
    Neutral,
}

impl PageZone {
    pub fn for_x(x: i32, frame_width: u32) -> Self {
        if x < PAGE_ZONE_WIDTH {
            Self::Previous
        } else if x > frame_width as i32 - PAGE_ZONE_WIDTH {
            Self::Next
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Nothing detected in this frame.
    NoHand,
    /// A hand is visible but its fingers match no command.
    Idle,
    /// Index finger only: pointer movement, left press and drag.
    Point {
        tip: PixelPoint,
        thumb: PixelPoint,
        /// Interpolated screen position before smoothing.
        target: ScreenPoint,
        pinch_distance: f32,
    },
    /// Index and middle fingers: right click on middle-thumb pinch.
    TwoFinger {
        tip: PixelPoint,
        thumb: PixelPoint,
        pinch_distance: f32,
    },
    /// Index, middle and ring fingers: page navigation by knuckle position.
    ThreeFinger { knuckle: PixelPoint, zone: PageZone },
}

impl Gesture {
    pub fn hand_visible(&self) -> bool {
        !matches!(self, Self::NoHand)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoHand => "no hand",
            Self::Idle => "idle",
            Self::Point { .. } => "point",
            Self::TwoFinger { .. } => "two finger",
            Self::ThreeFinger {
                zone: PageZone::Previous,
                ..
            } => "three finger (previous zone)",
            Self::ThreeFinger {
                zone: PageZone::Next,
                ..
            } => "three finger (next zone)",
            Self::ThreeFinger { .. } => "three finger",
        }
    }
}

pub fn classify(hand: Option<&HandLandmarks>, geometry: &FrameGeometry) -> Gesture {
    let Some(hand) = hand else {
        return Gesture::NoHand;
    };
    let frame = geometry.frame;
    let thumb = hand.pixel(joint::THUMB_TIP, frame);

    match hand.finger_state() {
        FingerState {
            index: true,
            middle: false,
            ring: false,
        } => {
            let tip = hand.pixel(joint::INDEX_TIP, frame);
            Gesture::Point {
                tip,
                thumb,
                target: map_to_screen(tip, frame, geometry.frame_margin, geometry.screen),
                pinch_distance: tip.distance_to(thumb),
            }
        }
        FingerState {
            index: true,
            middle: true,
            ring: false,
        } => {
            let tip = hand.pixel(joint::MIDDLE_TIP, frame);
            Gesture::TwoFinger {
                tip,
                thumb,
                pinch_distance: tip.distance_to(thumb),
            }
        }
        FingerState {
            index: true,
            middle: true,
            ring: true,
        } => {
            let knuckle = hand.pixel(joint::MIDDLE_MCP, frame);
            Gesture::ThreeFinger {
                knuckle,
                zone: PageZone::for_x(knuckle.x, frame.width),
            }
        }
        _ => Gesture::Idle,
    }
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
