use shared::domain::{FrameSize, PixelPoint, ScreenPoint, ScreenSize};

/// Linear interpolation of `value` from `from` onto `to`, clamped at both ends.
pub fn interpolate(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (lo, hi) = from;
    if hi <= lo {
        return if value <= lo { to.0 } else { to.1 };
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    to.0 + t * (to.1 - to.0)
}

/// Maps a fingertip inside the margin-inset operating rectangle onto the full screen.
pub fn map_to_screen(
    tip: PixelPoint,
    frame: FrameSize,
    frame_margin: u32,
    screen: ScreenSize,
) -> ScreenPoint {
    let margin = frame_margin as f32;
    ScreenPoint {
        x: interpolate(
            tip.x as f32,
            (margin, frame.width as f32 - margin),
            (0.0, screen.width as f32),
        ),
        y: interpolate(
            tip.y as f32,
            (margin, frame.height as f32 - margin),
            (0.0, screen.height as f32),
        ),
    }
}

/// Exponential low-pass filter over pointer positions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSmoother {
    position: ScreenPoint,
}

impl PointerSmoother {
    pub fn position(&self) -> ScreenPoint {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = ScreenPoint::default();
    }

    /// Moves `1 / factor` of the way toward `target`. A factor of 1 jumps straight there.
    pub fn step(&mut self, target: ScreenPoint, factor: u32) -> ScreenPoint {
        let factor = factor.max(1) as f32;
        self.position.x += (target.x - self.position.x) / factor;
        self.position.y += (target.y - self.position.y) / factor;
        self.position
    }
}
