//! X-Z position sensor
//!
//! 8-bit register addresses, one byte per axis. The data-ready pin is
//! configured but not wired to an interrupt; the sketchpad polls instead.

use etch_core::cursor::Position;
use etch_core::i2c::{I2cError, SlaveAddress};
use etch_core::register::{RegisterAccess, RegisterAddress};

pub const DEFAULT_ADDRESS: SlaveAddress = SlaveAddress::new_const(0x20);

/// Register map
pub mod reg {
    pub const STATUS: u8 = 0x00;
    /// Data-ready enable
    pub const DRE: u8 = 0x01;
    /// Data-ready pin configuration
    pub const DRCFG: u8 = 0x02;
    pub const X: u8 = 0x08;
    pub const Z: u8 = 0x0A;
}

/// Assert data-ready when new coordinates are available
pub const DRE_COORDINATES: u8 = 0x02;

/// Data-ready pin enabled, active high
pub const DRCFG_ENABLED_ACTIVE_HIGH: u8 = 0x81;

/// X-Z sensor on an I2C bus
#[derive(Debug, Clone, Copy)]
pub struct XzSensor {
    address: SlaveAddress,
}

impl Default for XzSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl XzSensor {
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
        }
    }

    pub const fn with_address(address: SlaveAddress) -> Self {
        Self { address }
    }

    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    fn write<B: RegisterAccess>(&self, bus: &mut B, reg: u8, value: u8) -> Result<(), I2cError> {
        bus.write_register(self.address, RegisterAddress::Byte(reg), &[value])
    }

    fn read<B: RegisterAccess>(&self, bus: &mut B, reg: u8) -> Result<u8, I2cError> {
        bus.read_register(self.address, RegisterAddress::Byte(reg))
    }

    /// Enable the data-ready output
    pub fn init<B: RegisterAccess>(&self, bus: &mut B) -> Result<(), I2cError> {
        self.write(bus, reg::DRE, DRE_COORDINATES)?;
        self.write(bus, reg::DRCFG, DRCFG_ENABLED_ACTIVE_HIGH)
    }

    pub fn read_x<B: RegisterAccess>(&self, bus: &mut B) -> Result<u8, I2cError> {
        self.read(bus, reg::X)
    }

    pub fn read_z<B: RegisterAccess>(&self, bus: &mut B) -> Result<u8, I2cError> {
        self.read(bus, reg::Z)
    }

    pub fn read_status<B: RegisterAccess>(&self, bus: &mut B) -> Result<u8, I2cError> {
        self.read(bus, reg::STATUS)
    }

    /// X then Z
    pub fn read_position<B: RegisterAccess>(&self, bus: &mut B) -> Result<Position, I2cError> {
        let x = self.read_x(bus)?;
        let z = self.read_z(bus)?;
        Ok(Position { x, z })
    }
}
