//! VT100 terminal output
//!
//! The sketchpad draws on a plain serial terminal: a clear-screen sequence
//! plus banner at startup, then a cursor-position sequence every sample
//! and a block or blank character when a button is held.

use core::fmt::Write as _;

use etch_hal::UartTx;
use heapless::String;

/// Erase the display and home the cursor
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Printed after every clear
pub const BANNER: &str = "System initialized!\n\r";

/// Full block in code page 437
pub const DRAW_CHAR: u8 = 0xDB;

pub const ERASE_CHAR: u8 = b' ';

/// Longest cursor-position sequence: `ESC [ 65536 ; 65536 H`
pub const MOVE_SEQUENCE_LEN: usize = 16;

/// Cursor-position sequence for a 0-based cell
///
/// VT100 rows and columns are 1-based, so `(0, 0)` is `ESC[1;1H`.
pub fn move_sequence(col: u16, row: u16) -> String<MOVE_SEQUENCE_LEN> {
    let mut sequence = String::new();
    // Fits by construction: 2 + 5 + 1 + 5 + 1 bytes
    let _ = write!(
        sequence,
        "\x1b[{};{}H",
        u32::from(row) + 1,
        u32::from(col) + 1
    );
    sequence
}

/// Terminal on a serial transmitter
pub struct Terminal<T> {
    port: T,
}

impl<T: UartTx> Terminal<T> {
    pub fn new(port: T) -> Self {
        Self { port }
    }

    /// Clear the screen and print the banner
    pub fn clear(&mut self) -> Result<(), T::Error> {
        self.port.write_str(CLEAR_SCREEN)?;
        self.port.write_str(BANNER)
    }

    pub fn move_to(&mut self, col: u16, row: u16) -> Result<(), T::Error> {
        self.port.write_str(&move_sequence(col, row))
    }

    /// Put a block at the cursor
    pub fn draw(&mut self) -> Result<(), T::Error> {
        self.port.write_blocking(&[DRAW_CHAR])
    }

    /// Blank the cell at the cursor
    pub fn erase(&mut self) -> Result<(), T::Error> {
        self.port.write_blocking(&[ERASE_CHAR])
    }

    pub fn port(&self) -> &T {
        &self.port
    }

    pub fn into_inner(self) -> T {
        self.port
    }
}
