//! Register access on top of the transaction layer
//!
//! Most I2C devices expose a register file behind an address pointer: a
//! write sets the pointer and optionally stores data, a following read
//! returns data from the pointer on.

use etch_hal::{I2cPeripheral, UartTx};
use heapless::Vec;

use crate::i2c::{I2cError, I2cMaster, SlaveAddress};

/// Largest register write: a 16-bit register address plus its data
pub const MAX_WRITE_LEN: usize = 16;

/// Register address, one or two bytes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAddress {
    Byte(u8),
    /// Sent high byte first
    Word(u16),
}

impl RegisterAddress {
    /// Bytes that select this register
    pub fn to_bytes(self) -> Vec<u8, 2> {
        let mut bytes = Vec::new();
        match self {
            RegisterAddress::Byte(reg) => {
                let _ = bytes.push(reg);
            }
            RegisterAddress::Word(reg) => {
                let _ = bytes.extend_from_slice(&reg.to_be_bytes());
            }
        }
        bytes
    }
}

impl From<u8> for RegisterAddress {
    fn from(reg: u8) -> Self {
        RegisterAddress::Byte(reg)
    }
}

impl From<u16> for RegisterAddress {
    fn from(reg: u16) -> Self {
        RegisterAddress::Word(reg)
    }
}

/// Register-level device access
pub trait RegisterAccess {
    /// Write `data` starting at `reg` in a single transaction
    fn write_register(
        &mut self,
        device: SlaveAddress,
        reg: RegisterAddress,
        data: &[u8],
    ) -> Result<(), I2cError>;

    /// Read the byte at `reg`
    fn read_register(&mut self, device: SlaveAddress, reg: RegisterAddress) -> Result<u8, I2cError>;

    /// Read `buf.len()` bytes starting at `reg`
    fn read_registers(
        &mut self,
        device: SlaveAddress,
        reg: RegisterAddress,
        buf: &mut [u8],
    ) -> Result<(), I2cError>;
}

impl<P: I2cPeripheral, D: UartTx> RegisterAccess for I2cMaster<P, D> {
    fn write_register(
        &mut self,
        device: SlaveAddress,
        reg: RegisterAddress,
        data: &[u8],
    ) -> Result<(), I2cError> {
        let mut frame: Vec<u8, MAX_WRITE_LEN> = Vec::new();
        frame
            .extend_from_slice(&reg.to_bytes())
            .and_then(|()| frame.extend_from_slice(data))
            .map_err(|()| I2cError::TooLong)?;
        self.write_many(device, &frame)
    }

    fn read_register(&mut self, device: SlaveAddress, reg: RegisterAddress) -> Result<u8, I2cError> {
        self.write_many(device, &reg.to_bytes())?;
        self.read_one(device)
    }

    fn read_registers(
        &mut self,
        device: SlaveAddress,
        reg: RegisterAddress,
        buf: &mut [u8],
    ) -> Result<(), I2cError> {
        if buf.is_empty() {
            return Err(I2cError::EmptyRead);
        }
        self.write_many(device, &reg.to_bytes())?;
        self.read_many(device, buf)
    }
}
