//! PIC24-specific HAL for the etch firmware
//!
//! Register-level drivers for the peripherals the Explorer16 sketchpad
//! uses:
//!
//! - [`i2c::I2c1`] - I2C1 master, implementing [`etch_hal::I2cPeripheral`]
//! - [`uart::Uart2Tx`] - UART2 transmitter, implementing [`etch_hal::UartTx`]
//!
//! # Register access
//!
//! Drivers never touch memory directly. They go through a
//! [`RegisterFile`], which is a behavioural model of the peripheral in host
//! tests. On the chip it is `Mmio`, available with the `mmio` feature; that
//! feature is the only way unsafe code enters this crate.
//!
//! The shipping firmware runs on an RP2040 and bit-bangs its bus, so this
//! crate is a reference back-end for Explorer16 boards and is exercised by
//! its own tests.

#![no_std]
#![cfg_attr(not(feature = "mmio"), deny(unsafe_code))]

pub mod i2c;
pub mod regs;
pub mod uart;

pub use i2c::I2c1;
#[cfg(feature = "mmio")]
pub use regs::Mmio;
pub use regs::RegisterFile;
pub use uart::Uart2Tx;

/// Instruction clock of the Explorer16 board (FOSC / 2)
pub const FCY: u32 = 16_000_000;
