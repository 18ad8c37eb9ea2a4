use shared::{
    domain::{ScreenPoint, ScreenSize},
    protocol::{MouseButton, NavKey},
};
use tracing::info;

use crate::{DeviceResult, InputInjector};

#[cfg(feature = "input")]
pub use self::enigo_backend::EnigoInjector;

#[cfg(feature = "input")]
mod enigo_backend {
    use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
    use shared::{
        domain::{ScreenPoint, ScreenSize},
        protocol::{MouseButton, NavKey},
    };

    use crate::{DeviceError, DeviceResult, InputInjector};

    /// Injects pointer and keyboard events into the desktop session.
    pub struct EnigoInjector {
        enigo: Enigo,
    }

    impl EnigoInjector {
        pub fn new() -> DeviceResult<Self> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|err| DeviceError::Input(format!("failed to connect: {err}")))?;
            Ok(Self { enigo })
        }
    }

    fn button(button: MouseButton) -> Button {
        match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        }
    }

    fn key(key: NavKey) -> Key {
        match key {
            NavKey::LeftArrow => Key::LeftArrow,
            NavKey::RightArrow => Key::RightArrow,
        }
    }

    fn input_err(err: enigo::InputError) -> DeviceError {
        DeviceError::Input(err.to_string())
    }

    impl InputInjector for EnigoInjector {
        fn screen_size(&self) -> DeviceResult<ScreenSize> {
            let (width, height) = self.enigo.main_display().map_err(input_err)?;
            Ok(ScreenSize::new(width.max(0) as u32, height.max(0) as u32))
        }

        fn move_to(&mut self, point: ScreenPoint) -> DeviceResult<()> {
            self.enigo
                .move_mouse(point.x as i32, point.y as i32, Coordinate::Abs)
                .map_err(input_err)
        }

        fn button_down(&mut self, which: MouseButton) -> DeviceResult<()> {
            self.enigo
                .button(button(which), Direction::Press)
                .map_err(input_err)
        }

        fn button_up(&mut self, which: MouseButton) -> DeviceResult<()> {
            self.enigo
                .button(button(which), Direction::Release)
                .map_err(input_err)
        }

        fn click(&mut self, which: MouseButton) -> DeviceResult<()> {
            self.enigo
                .button(button(which), Direction::Click)
                .map_err(input_err)
        }

        fn key_press(&mut self, which: NavKey) -> DeviceResult<()> {
            self.enigo.key(key(which), Direction::Click).map_err(input_err)
        }
    }
}

/// Dry-run injector: reports every action through `tracing` and touches nothing.
#[derive(Debug, Clone)]
pub struct LoggingInjector {
    screen: ScreenSize,
    performed: u64,
}

impl LoggingInjector {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            performed: 0,
        }
    }

    pub fn performed(&self) -> u64 {
        self.performed
    }
}

impl InputInjector for LoggingInjector {
    fn screen_size(&self) -> DeviceResult<ScreenSize> {
        Ok(self.screen)
    }

    fn move_to(&mut self, point: ScreenPoint) -> DeviceResult<()> {
        self.performed += 1;
        tracing::trace!(x = point.x, y = point.y, "dry-run move");
        Ok(())
    }

    fn button_down(&mut self, button: MouseButton) -> DeviceResult<()> {
        self.performed += 1;
        info!(?button, "dry-run button down");
        Ok(())
    }

    fn button_up(&mut self, button: MouseButton) -> DeviceResult<()> {
        self.performed += 1;
        info!(?button, "dry-run button up");
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> DeviceResult<()> {
        self.performed += 1;
        info!(?button, "dry-run click");
        Ok(())
    }

    fn key_press(&mut self, key: NavKey) -> DeviceResult<()> {
        self.performed += 1;
        info!(?key, "dry-run key press");
        Ok(())
    }
}
