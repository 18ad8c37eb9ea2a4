//! Live-tunable gesture parameters shared between the UI and the frame loop.

use std::{
    ops::RangeInclusive,
    sync::atomic::{AtomicBool, AtomicU32, Ordering},
};

use serde::{Deserialize, Serialize};
use shared::error::GestureError;

pub const SMOOTHING_RANGE: RangeInclusive<u32> = 1..=20;
pub const FRAME_MARGIN_RANGE: RangeInclusive<u32> = 0..=200;
pub const CLICK_THRESHOLD_RANGE: RangeInclusive<u32> = 20..=80;

/// Plain snapshot of the tunables, taken once per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Pointer low-pass divisor; 1 disables smoothing.
    pub smoothing: u32,
    /// Inset in frame pixels of the rectangle mapped onto the whole screen.
    pub frame_margin: u32,
    /// Fingertip-to-thumb distance in frame pixels below which a pinch registers.
    pub click_threshold: u32,
    pub sound_enabled: bool,
    pub show_landmarks: bool,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            smoothing: 5,
            frame_margin: 100,
            click_threshold: 40,
            sound_enabled: true,
            show_landmarks: true,
        }
    }
}

impl GestureSettings {
    pub fn validate(&self) -> Result<(), GestureError> {
        check_range("smoothing", self.smoothing, &SMOOTHING_RANGE)?;
        check_range("frame_margin", self.frame_margin, &FRAME_MARGIN_RANGE)?;
        check_range("click_threshold", self.click_threshold, &CLICK_THRESHOLD_RANGE)?;
        Ok(())
    }

    pub fn clamped(self) -> Self {
        Self {
            smoothing: clamp_to(self.smoothing, &SMOOTHING_RANGE),
            frame_margin: clamp_to(self.frame_margin, &FRAME_MARGIN_RANGE),
            click_threshold: clamp_to(self.click_threshold, &CLICK_THRESHOLD_RANGE),
            ..self
        }
    }
}

fn check_range(
    name: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), GestureError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(GestureError::OutOfRange {
            name,
            value: value as i64,
            min: *range.start() as i64,
            max: *range.end() as i64,
        })
    }
}

fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Process-wide settings written by the UI thread and read by the loop thread.
///
/// Every field is an independent atomic scalar; readers may observe a mix of
/// old and new fields across one update, which the loop tolerates.
#[derive(Debug)]
pub struct SharedSettings {
    smoothing: AtomicU32,
    frame_margin: AtomicU32,
    click_threshold: AtomicU32,
    sound_enabled: AtomicBool,
    show_landmarks: AtomicBool,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

impl SharedSettings {
    pub fn new(initial: GestureSettings) -> Self {
        let initial = initial.clamped();
        Self {
            smoothing: AtomicU32::new(initial.smoothing),
            frame_margin: AtomicU32::new(initial.frame_margin),
            click_threshold: AtomicU32::new(initial.click_threshold),
            sound_enabled: AtomicBool::new(initial.sound_enabled),
            show_landmarks: AtomicBool::new(initial.show_landmarks),
        }
    }

    pub fn snapshot(&self) -> GestureSettings {
        GestureSettings {
            smoothing: self.smoothing.load(Ordering::Relaxed),
            frame_margin: self.frame_margin.load(Ordering::Relaxed),
            click_threshold: self.click_threshold.load(Ordering::Relaxed),
            sound_enabled: self.sound_enabled.load(Ordering::Relaxed),
            show_landmarks: self.show_landmarks.load(Ordering::Relaxed),
        }
    }

    pub fn set_smoothing(&self, value: u32) {
        self.smoothing
            .store(clamp_to(value, &SMOOTHING_RANGE), Ordering::Relaxed);
    }

    pub fn set_frame_margin(&self, value: u32) {
        self.frame_margin
            .store(clamp_to(value, &FRAME_MARGIN_RANGE), Ordering::Relaxed);
    }

    pub fn set_click_threshold(&self, value: u32) {
        self.click_threshold
            .store(clamp_to(value, &CLICK_THRESHOLD_RANGE), Ordering::Relaxed);
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.sound_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_show_landmarks(&self, enabled: bool) {
        self.show_landmarks.store(enabled, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn setters_keep_values_inside_declared_ranges() {
        let settings = SharedSettings::default();
        settings.set_smoothing(0);
        settings.set_frame_margin(500);
        settings.set_click_threshold(5);

        let snapshot = settings.snapshot();
        assert_eq!(snapshot.smoothing, 1);
        assert_eq!(snapshot.frame_margin, 200);
        assert_eq!(snapshot.click_threshold, 20);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn validate_names_offending_field() {
        let settings = GestureSettings {
            click_threshold: 81,
            ..GestureSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            GestureError::OutOfRange {
                name: "click_threshold",
                value: 81,
                ..
            }
        ));
    }

    #[test]
    fn writes_from_another_thread_are_visible_to_snapshots() {
        let settings = Arc::new(SharedSettings::default());
        let writer = Arc::clone(&settings);
        thread::spawn(move || {
            writer.set_smoothing(12);
            writer.set_sound_enabled(false);
            writer.set_show_landmarks(false);
        })
        .join()
        .expect("writer thread");

        let snapshot = settings.snapshot();
        assert_eq!(snapshot.smoothing, 12);
        assert!(!snapshot.sound_enabled);
        assert!(!snapshot.show_landmarks);
    }
}
