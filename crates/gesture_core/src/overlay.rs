use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut},
    rect::Rect,
};
use shared::domain::{FrameSize, HandLandmarks, PixelPoint, HAND_CONNECTIONS};

use crate::{
    classifier::{Gesture, PAGE_ZONE_WIDTH},
    settings::GestureSettings,
};

const MARGIN_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const PREVIOUS_ZONE_TINT: Rgb<u8> = Rgb([0, 255, 0]);
const NEXT_ZONE_TINT: Rgb<u8> = Rgb([255, 100, 0]);
const ZONE_ALPHA: f32 = 0.15;
const BONE_COLOR: Rgb<u8> = Rgb([235, 235, 235]);
const JOINT_COLOR: Rgb<u8> = Rgb([230, 40, 40]);
const JOINT_RADIUS: i32 = 4;
const PRESS_MARKER: Rgb<u8> = Rgb([0, 255, 0]);
const RIGHT_CLICK_MARKER: Rgb<u8> = Rgb([255, 0, 0]);
const PINCH_LINE: Rgb<u8> = Rgb([255, 255, 0]);
const MARKER_RADIUS: i32 = 15;

/// Draws the operating rectangle, page zones, skeleton and pinch markers.
pub fn annotate(
    frame: &mut RgbImage,
    hand: Option<&HandLandmarks>,
    gesture: &Gesture,
    settings: &GestureSettings,
) {
    draw_operating_rect(frame, settings.frame_margin);
    tint_page_zones(frame);

    if let (Some(hand), true) = (hand, settings.show_landmarks) {
        draw_skeleton(frame, hand);
    }

    let threshold = settings.click_threshold as f32;
    match *gesture {
        Gesture::Point {
            tip,
            pinch_distance,
            ..
        } if pinch_distance < threshold => {
            draw_filled_circle_mut(frame, (tip.x, tip.y), MARKER_RADIUS, PRESS_MARKER);
        }
        Gesture::TwoFinger {
            tip,
            thumb,
            pinch_distance,
        } => {
            draw_segment(frame, thumb, tip, PINCH_LINE);
            if pinch_distance < threshold {
                draw_filled_circle_mut(frame, (tip.x, tip.y), MARKER_RADIUS, RIGHT_CLICK_MARKER);
            }
        }
        _ => {}
    }
}

fn draw_operating_rect(frame: &mut RgbImage, margin: u32) {
    let (width, height) = frame.dimensions();
    // Two nested outlines give a 2 px border.
    for inset in 0..2u32 {
        let left = margin + inset;
        // Corners (left, left) and (width - left, height - left), both inclusive.
        let Some(w) = width.checked_sub(2 * left).filter(|w| *w > 0) else {
            return;
        };
        let Some(h) = height.checked_sub(2 * left).filter(|h| *h > 0) else {
            return;
        };
        draw_hollow_rect_mut(
            frame,
            Rect::at(left as i32, left as i32).of_size(w + 1, h + 1),
            MARGIN_COLOR,
        );
    }
}

fn tint_page_zones(frame: &mut RgbImage) {
    let width = frame.width() as i32;
    for (x, _, pixel) in frame.enumerate_pixels_mut() {
        let x = x as i32;
        let tint = if x < PAGE_ZONE_WIDTH {
            PREVIOUS_ZONE_TINT
        } else if x >= width - PAGE_ZONE_WIDTH {
            NEXT_ZONE_TINT
        } else {
            continue;
        };
        for (channel, tint) in pixel.0.iter_mut().zip(tint.0) {
            *channel = (*channel as f32 * (1.0 - ZONE_ALPHA) + tint as f32 * ZONE_ALPHA).round() as u8;
        }
    }
}

fn draw_skeleton(frame: &mut RgbImage, hand: &HandLandmarks) {
    let size = FrameSize::new(frame.width(), frame.height());
    for (from, to) in HAND_CONNECTIONS {
        draw_segment(frame, hand.pixel(from, size), hand.pixel(to, size), BONE_COLOR);
    }
    for landmark in hand.points() {
        let p = landmark.to_pixel(size);
        draw_filled_circle_mut(frame, (p.x, p.y), JOINT_RADIUS, JOINT_COLOR);
    }
}

fn draw_segment(frame: &mut RgbImage, from: PixelPoint, to: PixelPoint, color: Rgb<u8>) {
    draw_line_segment_mut(
        frame,
        (from.x as f32, from.y as f32),
        (to.x as f32, to.y as f32),
        color,
    );
}
