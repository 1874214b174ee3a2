//! Sketchpad application
//!
//! Each step reads the X-Z sensor, moves the terminal cursor, and acts on
//! whichever buttons are held: draw, erase, then clear.

use embedded_hal::digital::InputPin;
use etch_core::config::CursorConfig;
use etch_core::cursor::{Cursor, Position};
use etch_core::i2c::I2cError;
use etch_core::register::RegisterAccess;
use etch_core::terminal::Terminal;
use etch_hal::{Button, UartTx};

use crate::sensor::XzSensor;

/// Button state for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons {
    pub draw: bool,
    pub erase: bool,
    pub clear: bool,
}

impl Buttons {
    /// Sample the three push-buttons
    pub fn read<A: InputPin, B: InputPin, C: InputPin>(
        draw: &mut Button<A>,
        erase: &mut Button<B>,
        clear: &mut Button<C>,
    ) -> Self {
        Self {
            draw: draw.is_pressed(),
            erase: erase.is_pressed(),
            clear: clear.is_pressed(),
        }
    }
}

/// Error from a sketchpad step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SketchError {
    /// Sensor transaction failed
    Bus(I2cError),
    /// Serial port refused output
    Terminal,
}

impl From<I2cError> for SketchError {
    fn from(error: I2cError) -> Self {
        SketchError::Bus(error)
    }
}

/// Cursor drawing on a serial terminal, steered by the X-Z sensor
pub struct Sketchpad<T> {
    sensor: XzSensor,
    cursor: Cursor,
    terminal: Terminal<T>,
}

impl<T: UartTx> Sketchpad<T> {
    pub fn new(sensor: XzSensor, config: CursorConfig, port: T) -> Self {
        Self {
            sensor,
            cursor: Cursor::new(config),
            terminal: Terminal::new(port),
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn terminal(&self) -> &Terminal<T> {
        &self.terminal
    }

    /// Set up the sensor and clear the screen
    pub fn start<B: RegisterAccess>(&mut self, bus: &mut B) -> Result<(), SketchError> {
        self.sensor.init(bus)?;
        self.terminal.clear().map_err(|_| SketchError::Terminal)?;
        info!("sketchpad started");
        Ok(())
    }

    /// Run one sample, returning the sensor reading it used
    pub fn step<B: RegisterAccess>(
        &mut self,
        bus: &mut B,
        buttons: Buttons,
    ) -> Result<Position, SketchError> {
        let sample = self.sensor.read_position(bus)?;
        let (col, row) = self.cursor.update(sample);

        self.render(col, row, buttons)
            .map_err(|_| SketchError::Terminal)?;

        Ok(sample)
    }

    fn render(&mut self, col: u16, row: u16, buttons: Buttons) -> Result<(), T::Error> {
        self.terminal.move_to(col, row)?;
        if buttons.draw {
            self.terminal.draw()?;
        }
        if buttons.erase {
            self.terminal.erase()?;
        }
        if buttons.clear {
            self.terminal.clear()?;
        }
        Ok(())
    }
}
