//! Configuration types
//!
//! The firmware reads these from `etch.toml` at build time and bakes the
//! result into the binary, so nothing here is ever parsed on the target.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a write does after the slave NACKs a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NackPolicy {
    /// Send the remaining bytes anyway and report the first NACK at the end
    #[default]
    Continue,
    /// Stop after the first NACK
    Abort,
}

/// I2C bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct BusConfig {
    /// SCL frequency in kHz
    pub speed_khz: u32,
    /// Instruction clock feeding the baud generator, in Hz
    pub core_clock_hz: u32,
    /// Polls of a hardware flag before a wait gives up
    pub poll_limit: u32,
    /// Behaviour after a NACK on the write side
    pub nack_policy: NackPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            speed_khz: 400,
            core_clock_hz: 16_000_000,
            poll_limit: 10_000,
            nack_policy: NackPolicy::Continue,
        }
    }
}

impl BusConfig {
    /// Baud-rate generator reload value
    ///
    /// `core / (khz * 1000) - core / 10_000_000 - 1`, the second term
    /// accounting for the module's pulse gobbler delay. 400 kHz on a 16 MHz
    /// instruction clock gives 38.
    pub fn clock_divisor(&self) -> Result<u16, ConfigError> {
        if self.speed_khz == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        let bus_hz = self
            .speed_khz
            .checked_mul(1000)
            .ok_or(ConfigError::DivisorOutOfRange)?;
        let divisor = (self.core_clock_hz / bus_hz)
            .checked_sub(self.core_clock_hz / 10_000_000)
            .and_then(|d| d.checked_sub(1))
            .ok_or(ConfigError::DivisorOutOfRange)?;
        u16::try_from(divisor).map_err(|_| ConfigError::DivisorOutOfRange)
    }

    /// Check the bus settings, returning the divisor they produce
    pub fn validate(&self) -> Result<u16, ConfigError> {
        if self.poll_limit == 0 {
            return Err(ConfigError::ZeroPollLimit);
        }
        self.clock_divisor()
    }
}

/// Cursor movement configuration
///
/// Sensor readings are 8-bit. A reading inside `midpoint ± deadzone` leaves
/// the cursor where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CursorConfig {
    pub midpoint: u8,
    pub deadzone: u8,
    /// Rightmost column
    pub width: u16,
    /// Bottom row
    pub height: u16,
    pub start_col: u16,
    pub start_row: u16,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            midpoint: 120,
            deadzone: 20,
            width: 184,
            height: 79,
            start_col: 92,
            start_row: 39,
        }
    }
}

impl CursorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadzone > self.midpoint || self.midpoint.checked_add(self.deadzone).is_none() {
            return Err(ConfigError::DeadzoneOutOfRange);
        }
        if self.start_col > self.width || self.start_row > self.height {
            return Err(ConfigError::StartOutsideScreen);
        }
        Ok(())
    }
}

/// Complete sketchpad configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Config {
    pub bus: BusConfig,
    pub cursor: CursorConfig,
    /// Delay between sensor samples in milliseconds
    pub sample_period_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            cursor: CursorConfig::default(),
            sample_period_ms: 100,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bus.validate()?;
        self.cursor.validate()?;
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        Ok(())
    }
}

/// Configuration rejected by `validate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Bus speed of 0 kHz
    ZeroSpeed,
    /// Speed and clock produce a divisor that doesn't fit the generator
    DivisorOutOfRange,
    /// Every wait would time out immediately
    ZeroPollLimit,
    /// Deadzone reaches past either end of the 8-bit reading range
    DeadzoneOutOfRange,
    /// Start position lies outside the drawing area
    StartOutsideScreen,
    ZeroSamplePeriod,
}
