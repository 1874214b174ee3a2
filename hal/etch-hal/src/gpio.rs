//! Push-button input
//!
//! The Explorer16-style buttons pull their line to ground when pressed and
//! rely on a pull-up otherwise.

use embedded_hal::digital::InputPin;

/// Active-low push-button
pub struct Button<P> {
    pin: P,
}

impl<P: InputPin> Button<P> {
    /// Wrap an input pin that reads low while the button is held
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Check if the button is currently held down
    ///
    /// A pin read error counts as "not pressed".
    pub fn is_pressed(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }

    /// Release the underlying pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};

    struct Level(bool);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Error for Broken {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = Broken;
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, Broken> {
            Err(Broken)
        }

        fn is_low(&mut self) -> Result<bool, Broken> {
            Err(Broken)
        }
    }

    #[test]
    fn test_active_low() {
        assert!(Button::new(Level(false)).is_pressed());
        assert!(!Button::new(Level(true)).is_pressed());
    }

    #[test]
    fn test_read_error_is_released() {
        assert!(!Button::new(BrokenPin).is_pressed());
    }
}
