//! Synthetic hand skeletons for tests.
//!
//! PIP joints sit at y = 288 px in a 640x480 frame; extended fingertips at
//! y = 192 px and curled ones at y = 336 px. Tests that move an extended tip
//! must keep it above y = 288 so the finger stays extended.

#![allow(dead_code)]

use shared::domain::{joint, FrameSize, HandLandmarks, Landmark, LANDMARK_COUNT};

pub const FRAME: FrameSize = FrameSize::new(640, 480);

const PIP_Y: f32 = 0.6;
const EXTENDED_TIP_Y: f32 = 0.4;
const CURLED_TIP_Y: f32 = 0.7;

pub struct HandBuilder {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandBuilder {
    /// All fingers curled, every keypoint at the frame centre column.
    pub fn new() -> Self {
        Self {
            points: [Landmark::new(0.5, PIP_Y); LANDMARK_COUNT],
        }
        .fingers(false, false, false)
    }

    pub fn point() -> Self {
        Self::new().fingers(true, false, false)
    }

    pub fn two_finger() -> Self {
        Self::new().fingers(true, true, false)
    }

    pub fn three_finger() -> Self {
        Self::new().fingers(true, true, true)
    }

    pub fn fingers(mut self, index: bool, middle: bool, ring: bool) -> Self {
        for (tip, extended) in [
            (joint::INDEX_TIP, index),
            (joint::MIDDLE_TIP, middle),
            (joint::RING_TIP, ring),
        ] {
            self.points[tip].y = if extended { EXTENDED_TIP_Y } else { CURLED_TIP_Y };
        }
        self
    }

    /// Places `joint` so that it truncates to exactly (`x`, `y`) frame pixels.
    pub fn at_pixel(mut self, joint: usize, x: i32, y: i32) -> Self {
        self.points[joint] = Landmark::new(
            (x as f32 + 0.5) / FRAME.width as f32,
            (y as f32 + 0.5) / FRAME.height as f32,
        );
        self
    }

    /// Index tip at (`x`, `y`) with the thumb tip `distance` pixels to its right.
    pub fn index_pinch(self, x: i32, y: i32, distance: i32) -> Self {
        self.at_pixel(joint::INDEX_TIP, x, y)
            .at_pixel(joint::THUMB_TIP, x + distance, y)
    }

    /// Middle tip at (`x`, `y`) with the thumb tip `distance` pixels to its right.
    pub fn middle_pinch(self, x: i32, y: i32, distance: i32) -> Self {
        self.at_pixel(joint::MIDDLE_TIP, x, y)
            .at_pixel(joint::THUMB_TIP, x + distance, y)
    }

    /// Overrides a keypoint with raw normalized coordinates.
    pub fn raw(mut self, joint: usize, x: f32, y: f32) -> Self {
        self.points[joint] = Landmark::new(x, y);
        self
    }

    pub fn knuckle_x(self, x: i32) -> Self {
        self.at_pixel(joint::MIDDLE_MCP, x, 300)
    }

    pub fn build(self) -> HandLandmarks {
        HandLandmarks::new(self.points)
    }
}
