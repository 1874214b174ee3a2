//! Cursor tracking from X-Z sensor readings
//!
//! Each axis moves the cursor one cell per sample when the reading is
//! outside the deadzone around the midpoint and differs from the previous
//! sample. A stick held still therefore moves the cursor once, not on
//! every sample.

use crate::config::CursorConfig;

/// One X-Z sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: u8,
    pub z: u8,
}

/// Cursor position on the terminal, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    config: CursorConfig,
    col: u16,
    row: u16,
    previous: Position,
}

/// Movement of one axis for one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Hold,
    /// Toward column or row 0
    Back,
    Forward,
}

impl Cursor {
    /// Cursor at the configured start cell
    pub fn new(config: CursorConfig) -> Self {
        Self {
            config,
            col: config.start_col,
            row: config.start_row,
            previous: Position::default(),
        }
    }

    pub fn col(&self) -> u16 {
        self.col
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    /// Apply one sample, returning `(col, row)` afterwards
    pub fn update(&mut self, sample: Position) -> (u16, u16) {
        let midpoint = self.config.midpoint;

        // Below the midpoint is left, the midpoint itself is right
        let x = if !self.moves(sample.x, self.previous.x) {
            Step::Hold
        } else if sample.x < midpoint {
            Step::Back
        } else {
            Step::Forward
        };
        self.col = Self::apply(self.col, x, self.config.width);

        // Above the midpoint is up, the midpoint itself is down
        let z = if !self.moves(sample.z, self.previous.z) {
            Step::Hold
        } else if sample.z > midpoint {
            Step::Back
        } else {
            Step::Forward
        };
        self.row = Self::apply(self.row, z, self.config.height);

        self.previous = sample;
        (self.col, self.row)
    }

    /// Reading changed and lies outside the deadzone
    fn moves(&self, reading: u8, previous: u8) -> bool {
        if reading == previous {
            return false;
        }
        let low = self.config.midpoint.saturating_sub(self.config.deadzone);
        let high = self.config.midpoint.saturating_add(self.config.deadzone);
        reading <= low || reading >= high
    }

    fn apply(value: u16, step: Step, max: u16) -> u16 {
        match step {
            Step::Hold => value,
            Step::Back => value.saturating_sub(1),
            Step::Forward => value.saturating_add(1).min(max),
        }
    }
}
