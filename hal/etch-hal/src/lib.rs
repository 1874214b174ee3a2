//! Etch Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the I2C engine and the sketchpad
//! application are written against. Chip-specific crates implement them,
//! so the same transaction code drives a PIC24 I2C module, a pair of
//! bit-banged GPIOs, or the host-side simulator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  etch-core (I2C master, transactions)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  etch-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ etch-hal-     │       │ bitbang       │
//! │    pic24      │       │ (GPIO pins)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cPeripheral`] - Split-phase I2C master peripheral
//! - [`uart::UartTx`] - Serial transmit (terminal and diagnostics)
//! - [`gpio::Button`] - Active-low push-button input

#![no_std]
#![deny(unsafe_code)]

pub mod bitbang;
pub mod gpio;
pub mod i2c;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use bitbang::BitBang;
pub use gpio::Button;
pub use i2c::{Ack, I2cPeripheral};
pub use uart::{SharedTx, UartTx};
